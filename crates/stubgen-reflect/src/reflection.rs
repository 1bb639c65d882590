//! Fluent navigation over a class registry.
//!
//! A [`Class`] pairs a [`ClassId`] with the registry it came from, so callers
//! can walk from a class to its ancestors and declared members without
//! threading the registry through every call.
//!
//! # Example
//!
//! ```ignore
//! use stubgen_reflect::{Class, ClassRegistry};
//!
//! let service = Class::named(&graph, "ServiceGenerator").unwrap();
//! for ancestor in service.ancestors() {
//!     println!("{}", ancestor.display_name());
//! }
//! for argument in service.arguments() {
//!     println!("{}: {}", argument.name, argument.tag);
//! }
//! ```

use std::fmt;

use indexmap::IndexMap;
use stubgen_types::ArgumentSpec;

use crate::{ClassId, ClassRegistry};

/// A reflected class with navigation methods.
pub struct Class<'r, R: ClassRegistry + ?Sized> {
    registry: &'r R,
    id: ClassId,
}

impl<'r, R: ClassRegistry + ?Sized> Class<'r, R> {
    pub fn new(registry: &'r R, id: ClassId) -> Self {
        Self { registry, id }
    }

    /// Look a class up by qualified name.
    pub fn named(registry: &'r R, qualified_name: &str) -> Option<Self> {
        registry
            .find(qualified_name)
            .map(|id| Self::new(registry, id))
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Qualified name, or `None` for an anonymous class.
    pub fn name(&self) -> Option<&'r str> {
        self.registry.qualified_name(self.id)
    }

    /// The qualified name, or a placeholder for anonymous classes.
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("<anonymous class #{}>", self.id.index()),
        }
    }

    /// Direct superclass.
    pub fn superclass(&self) -> Option<Self> {
        self.registry
            .ancestors(self.id)
            .first()
            .map(|&id| Self::new(self.registry, id))
    }

    /// Inherited ancestors, most-derived first.
    pub fn ancestors(&self) -> impl Iterator<Item = Class<'r, R>> + use<'r, R> {
        let registry = self.registry;
        registry
            .ancestors(self.id)
            .iter()
            .map(move |&id| Class::new(registry, id))
    }

    /// The first ancestor satisfying `predicate`, walking most-derived first.
    pub fn nearest_ancestor(&self, mut predicate: impl FnMut(&Self) -> bool) -> Option<Self> {
        self.ancestors().find(|ancestor| predicate(ancestor))
    }

    pub fn arguments(&self) -> &'r [ArgumentSpec] {
        self.registry.declared_arguments(self.id)
    }

    pub fn options(&self) -> &'r IndexMap<String, ArgumentSpec> {
        self.registry.declared_options(self.id)
    }

    /// Whether this class strictly inherits from `other`.
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        self.registry.is_subtype(self.id, other.id)
    }
}

impl<R: ClassRegistry + ?Sized> Clone for Class<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ClassRegistry + ?Sized> Copy for Class<'_, R> {}

impl<R: ClassRegistry + ?Sized> PartialEq for Class<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<R: ClassRegistry + ?Sized> fmt::Debug for Class<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
