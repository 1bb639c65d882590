//! Generator introspection compiler.
//!
//! Given a [`ClassRegistry`], the compilers in this crate decide which
//! classes need stubs and emit them into a shared [`StubTree`]. The
//! generator compiler handles classes that declare positional arguments and
//! named options: every member a class adds on top of its nearest built-in
//! base becomes a zero-argument accessor whose return type is inferred from
//! the member's declared type tag.
//!
//! # Example
//!
//! ```ignore
//! use stubgen_compiler::{GeneratorCompiler, GeneratorConfig, Pipeline, StubTree};
//!
//! let graph = stubgen_reflect::load_snapshot("classes.json".as_ref())?;
//! let compiler = GeneratorCompiler::new(&graph, &GeneratorConfig::default())?;
//!
//! let mut tree = StubTree::new();
//! let report = Pipeline::new().with(compiler).run(&mut tree);
//! for class in tree.classes() {
//!     println!("{}", stubgen_compiler::render::render_class(class));
//! }
//! ```

use stubgen_reflect::{ClassId, ClassRegistry};

pub mod config;
pub mod generators;
pub mod infer;
pub mod pipeline;
pub mod render;
pub mod tree;

pub use config::{BuiltinMatcher, GeneratorConfig};
pub use generators::{Contribution, GeneratorCompiler};
pub use pipeline::{Failure, Pipeline, Report};
pub use tree::{ClassNode, Method, StubTree};

/// Errors raised while compiling stubs.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid built-in namespace pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(
        "Class '{class}' has no built-in ancestor; the built-in namespace patterns do not cover its root type"
    )]
    MissingBuiltinAncestor { class: String },

    #[error("Cannot emit a stub for anonymous class {0}")]
    AnonymousClass(String),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// What processing one candidate did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The class contributed members and got this many accessors
    Emitted { accessors: usize },
    /// Nothing was contributed; the tree was left untouched
    Skipped,
}

/// A stub compiler plugin.
///
/// The driver calls [`gather_candidates`](Compiler::gather_candidates) once
/// and then [`process`](Compiler::process) once per candidate. Compilers keep
/// no state between calls; everything they produce goes into the tree.
pub trait Compiler {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// The registry this compiler reads from.
    fn registry(&self) -> &dyn ClassRegistry;

    /// Classes this compiler wants to process, in a deterministic order.
    fn gather_candidates(&self) -> Vec<ClassId>;

    /// Emit stubs for one candidate into `root`.
    fn process(&self, root: &mut StubTree, candidate: ClassId) -> Result<Outcome>;
}
