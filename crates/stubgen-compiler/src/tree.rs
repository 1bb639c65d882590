//! Output tree the compilers emit into.
//!
//! The tree maps qualified class names to class nodes. Paths are flat
//! (`Foo::BarGenerator` is one node) because the tree cannot tell whether an
//! enclosing constant is a class or a module.

use indexmap::IndexMap;
use serde::Serialize;
use stubgen_types::TypeDescriptor;

/// All generated stubs of one generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StubTree {
    classes: IndexMap<String, ClassNode>,
}

impl StubTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the node for `qualified_name`, creating it if needed.
    pub fn create_path(&mut self, qualified_name: &str) -> &mut ClassNode {
        let name = qualified_name.trim_start_matches("::");
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| ClassNode::new(name))
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ClassNode> {
        self.classes.get(qualified_name.trim_start_matches("::"))
    }

    /// Class nodes in creation order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Order class nodes by name, for output that does not depend on which
    /// compiler ran first.
    pub fn sort(&mut self) {
        self.classes.sort_keys();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The generated body of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassNode {
    name: String,
    methods: Vec<Method>,
}

impl ClassNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Declare a zero-parameter accessor.
    ///
    /// Declaring a name twice replaces the earlier declaration in place.
    pub fn append_accessor(&mut self, name: &str, return_type: TypeDescriptor) {
        let method = Method {
            name: name.to_string(),
            return_type,
        };
        match self.methods.iter_mut().find(|m| m.name == name) {
            Some(existing) => *existing = method,
            None => self.methods.push(method),
        }
    }
}

/// A generated zero-parameter accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub return_type: TypeDescriptor,
}
