//! Runs compilers over their candidates.
//!
//! A failing candidate is reported and skipped; it never stops the run.

use stubgen_reflect::Class;

use crate::tree::StubTree;
use crate::{CompileError, Compiler, Outcome};

/// One candidate that could not be processed.
#[derive(Debug)]
pub struct Failure {
    pub compiler: String,
    pub class: String,
    pub error: CompileError,
}

/// Summary of a generation run.
#[derive(Debug, Default)]
pub struct Report {
    pub candidates: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub accessors: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An ordered set of compilers sharing one output tree.
#[derive(Default)]
pub struct Pipeline<'a> {
    compilers: Vec<Box<dyn Compiler + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, compiler: impl Compiler + 'a) -> Self {
        self.compilers.push(Box::new(compiler));
        self
    }

    /// Process every candidate of every compiler into `tree`.
    pub fn run(&self, tree: &mut StubTree) -> Report {
        let mut report = Report::default();

        for compiler in &self.compilers {
            let candidates = compiler.gather_candidates();
            log::info!(
                "Compiler '{}' has {} candidates",
                compiler.name(),
                candidates.len()
            );

            for candidate in candidates {
                report.candidates += 1;
                let class = Class::new(compiler.registry(), candidate).display_name();

                match compiler.process(tree, candidate) {
                    Ok(Outcome::Emitted { accessors }) => {
                        log::debug!("Emitted {} accessors for {}", accessors, class);
                        report.emitted += 1;
                        report.accessors += accessors;
                    }
                    Ok(Outcome::Skipped) => {
                        log::debug!("Nothing to emit for {}", class);
                        report.skipped += 1;
                    }
                    Err(error) => {
                        log::error!("Skipping {}: {}", class, error);
                        report.failures.push(Failure {
                            compiler: compiler.name().to_string(),
                            class,
                            error,
                        });
                    }
                }
            }
        }

        report
    }
}
