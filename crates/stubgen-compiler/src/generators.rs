//! Stubs for generator classes.
//!
//! A generator declares positional arguments and named options, and the
//! framework turns each of them into a reader method at runtime. This
//! compiler emits those readers for every user-defined generator.
//!
//! For example, given
//!
//! ```text
//! class ServiceGenerator < Rails::Generators::NamedBase
//!   argument :result_type, type: :string, required: true
//!   class_option :skip_comments, type: :boolean, default: false
//! end
//! ```
//!
//! the emitted stub is
//!
//! ```text
//! class ServiceGenerator
//!   sig { returns(::String) }
//!   def result_type; end
//!
//!   sig { returns(T::Boolean) }
//!   def skip_comments; end
//! end
//! ```
//!
//! Members inherited unchanged from the nearest built-in generator are left
//! out: the framework's own stubs already cover them.

use std::collections::HashSet;

use stubgen_reflect::{Class, ClassId, ClassRegistry};
use stubgen_types::ArgumentSpec;

use crate::config::{BuiltinMatcher, GeneratorConfig};
use crate::infer::type_for;
use crate::tree::StubTree;
use crate::{CompileError, Compiler, Outcome, Result};

/// Members a generator declares beyond its built-in base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution<'r> {
    /// Arguments in the generator's declaration order
    pub arguments: Vec<&'r ArgumentSpec>,
    /// Options in the generator's declaration order
    pub options: Vec<&'r ArgumentSpec>,
}

impl<'r> Contribution<'r> {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty() && self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arguments.len() + self.options.len()
    }

    /// Arguments first, then options.
    pub fn members(&self) -> impl Iterator<Item = &'r ArgumentSpec> + '_ {
        self.arguments.iter().chain(&self.options).copied()
    }
}

/// Compiler for framework generator subclasses.
pub struct GeneratorCompiler<'r> {
    registry: &'r dyn ClassRegistry,
    matcher: BuiltinMatcher,
    root: String,
}

impl<'r> GeneratorCompiler<'r> {
    pub fn new(registry: &'r dyn ClassRegistry, config: &GeneratorConfig) -> Result<Self> {
        let matcher = BuiltinMatcher::new(&config.builtin_patterns)?;
        if !matcher.is_builtin(&config.root) {
            log::warn!(
                "Root type '{}' does not match any built-in pattern; every candidate will fail",
                config.root
            );
        }

        Ok(Self {
            registry,
            matcher,
            root: config.root.clone(),
        })
    }

    fn class(&self, id: ClassId) -> Class<'r, dyn ClassRegistry + 'r> {
        Class::new(self.registry, id)
    }

    /// Named, non-built-in subclasses of the root type, sorted by name.
    pub fn candidates(&self) -> Vec<ClassId> {
        let Some(root) = self.registry.find(&self.root) else {
            log::warn!("Root type '{}' is not loaded; no candidates", self.root);
            return Vec::new();
        };

        let mut candidates: Vec<(&str, ClassId)> = self
            .registry
            .classes()
            .filter_map(|id| {
                let name = self.registry.qualified_name(id)?;
                let eligible = !self.matcher.is_builtin(name) && self.registry.is_subtype(id, root);
                eligible.then_some((name, id))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        log::debug!("Found {} generator candidates", candidates.len());
        candidates.into_iter().map(|(_, id)| id).collect()
    }

    /// The nearest ancestor living in a built-in namespace.
    pub fn base_class_for(&self, candidate: ClassId) -> Result<ClassId> {
        let class = self.class(candidate);
        class
            .nearest_ancestor(|ancestor| ancestor.name().is_some_and(|n| self.matcher.is_builtin(n)))
            .map(|base| base.id())
            .ok_or_else(|| CompileError::MissingBuiltinAncestor {
                class: class.display_name(),
            })
    }

    /// Members `candidate` declares that `base` does not declare identically.
    pub fn contributed_members(&self, candidate: ClassId, base: ClassId) -> Contribution<'r> {
        let class = self.class(candidate);
        let base = self.class(base);

        let base_arguments = base.arguments();
        let arguments = class
            .arguments()
            .iter()
            .filter(|&argument| !base_arguments.contains(argument))
            .collect();

        let base_options = base.options();
        let options = class
            .options()
            .iter()
            .filter(|(name, option)| base_options.get(*name) != Some(*option))
            .map(|(_, option)| option)
            .collect();

        Contribution { arguments, options }
    }

    /// Append one accessor per contributed member.
    ///
    /// Leaves the tree untouched when nothing was contributed.
    pub fn emit(
        &self,
        root: &mut StubTree,
        candidate: ClassId,
        contribution: &Contribution<'_>,
    ) -> Result<Outcome> {
        if contribution.is_empty() {
            return Ok(Outcome::Skipped);
        }

        let class = self.class(candidate);
        let name = class
            .name()
            .ok_or_else(|| CompileError::AnonymousClass(class.display_name()))?;

        let node = root.create_path(name);
        let mut accessors = HashSet::new();
        for member in contribution.members() {
            node.append_accessor(&member.name, type_for(member));
            accessors.insert(member.name.as_str());
        }

        Ok(Outcome::Emitted {
            accessors: accessors.len(),
        })
    }
}

impl Compiler for GeneratorCompiler<'_> {
    fn name(&self) -> &str {
        "generators"
    }

    fn registry(&self) -> &dyn ClassRegistry {
        self.registry
    }

    fn gather_candidates(&self) -> Vec<ClassId> {
        self.candidates()
    }

    fn process(&self, root: &mut StubTree, candidate: ClassId) -> Result<Outcome> {
        let base = self.base_class_for(candidate)?;
        let contribution = self.contributed_members(candidate, base);

        log::debug!(
            "{} contributes {} arguments and {} options over {}",
            self.class(candidate).display_name(),
            contribution.arguments.len(),
            contribution.options.len(),
            self.class(base).display_name(),
        );

        self.emit(root, candidate, &contribution)
    }
}
