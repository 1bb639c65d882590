//! Class registry for stubgen.
//!
//! The compilers never look at a running program directly. They query a
//! [`ClassRegistry`], which answers the handful of reflection questions they
//! need: which classes exist, what they are called, what they inherit from,
//! and which arguments and options they declare.
//!
//! [`ClassGraph`] is the in-memory implementation, built either from a JSON
//! [`ProgramSnapshot`] or programmatically through [`ClassGraph::builder`].
//!
//! # Example
//!
//! ```ignore
//! use stubgen_reflect::{ClassGraph, ClassRegistry};
//!
//! let graph = stubgen_reflect::load_snapshot("classes.json".as_ref())?;
//! for id in graph.classes() {
//!     println!("{:?}", graph.qualified_name(id));
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use stubgen_types::{ArgumentSpec, ProgramSnapshot};

pub mod graph;
pub mod reflection;

pub use graph::{ClassGraph, GraphBuilder};
pub use reflection::Class;

/// Errors that can occur while building a class registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Class id '{0}' is declared more than once")]
    DuplicateClass(String),

    #[error("Class '{class}' names unknown superclass '{superclass}'")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("Inheritance cycle through class '{0}'")]
    InheritanceCycle(String),

    #[error("Class '{class}' declares option '{option}' more than once")]
    DuplicateOption { class: String, option: String },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque handle to a class inside one registry.
///
/// Handles are only meaningful for the registry that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only view of a loaded program's class graph.
pub trait ClassRegistry {
    /// Every class in the program, anonymous ones included.
    fn classes(&self) -> Box<dyn Iterator<Item = ClassId> + '_>;

    /// Qualified name, or `None` for an anonymous class.
    fn qualified_name(&self, class: ClassId) -> Option<&str>;

    /// Inherited ancestors, most-derived first. The class itself is not included.
    fn ancestors(&self, class: ClassId) -> &[ClassId];

    /// Effective positional arguments, in declaration order.
    fn declared_arguments(&self, class: ClassId) -> &[ArgumentSpec];

    /// Effective named options, in declaration order.
    fn declared_options(&self, class: ClassId) -> &IndexMap<String, ArgumentSpec>;

    /// Whether `class` strictly inherits from `of`.
    fn is_subtype(&self, class: ClassId, of: ClassId) -> bool {
        self.ancestors(class).contains(&of)
    }

    /// Look a class up by qualified name.
    fn find(&self, qualified_name: &str) -> Option<ClassId> {
        self.classes()
            .find(|&id| self.qualified_name(id) == Some(qualified_name))
    }
}

/// Load a class graph from a JSON snapshot file.
pub fn load_snapshot(path: &Path) -> Result<ClassGraph> {
    let json = std::fs::read_to_string(path)?;
    let snapshot = ProgramSnapshot::from_json(&json)?;
    log::debug!(
        "Loaded snapshot {} with {} classes",
        path.display(),
        snapshot.classes.len()
    );
    ClassGraph::from_snapshot(snapshot)
}
