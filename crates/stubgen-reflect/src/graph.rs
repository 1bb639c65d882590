//! In-memory class registry.

use std::collections::HashMap;

use indexmap::IndexMap;
use indexmap::map::Entry;
use stubgen_types::{ArgumentSpec, ClassRecord, ProgramSnapshot};

use crate::{ClassId, ClassRegistry, Error, Result};

/// A class graph held entirely in memory.
///
/// Ancestor chains are resolved once when the graph is built, so every
/// registry query is a plain lookup.
#[derive(Debug, Clone, Default)]
pub struct ClassGraph {
    nodes: Vec<ClassNode>,
    by_name: HashMap<String, ClassId>,
}

#[derive(Debug, Clone)]
struct ClassNode {
    key: String,
    name: Option<String>,
    superclass: Option<ClassId>,
    ancestors: Vec<ClassId>,
    arguments: Vec<ArgumentSpec>,
    options: IndexMap<String, ArgumentSpec>,
}

/// A class waiting to be linked into a graph.
#[derive(Debug, Clone)]
struct PendingClass {
    key: String,
    name: Option<String>,
    superclass: Option<String>,
    arguments: Vec<ArgumentSpec>,
    options: Vec<ArgumentSpec>,
}

impl From<ClassRecord> for PendingClass {
    fn from(record: ClassRecord) -> Self {
        Self {
            key: record.id,
            name: record.name,
            superclass: record.superclass,
            arguments: record.arguments.into_iter().map(ArgumentSpec::from).collect(),
            options: record.options.into_iter().map(ArgumentSpec::from).collect(),
        }
    }
}

impl ClassGraph {
    /// Build a graph from a snapshot, validating every superclass reference.
    pub fn from_snapshot(snapshot: ProgramSnapshot) -> Result<Self> {
        link(snapshot.classes.into_iter().map(PendingClass::from).collect())
    }

    /// Start assembling a graph by hand.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The snapshot key the class was registered under.
    pub fn key(&self, class: ClassId) -> &str {
        &self.node(class).key
    }

    /// Direct superclass, if any.
    pub fn superclass(&self, class: ClassId) -> Option<ClassId> {
        self.node(class).superclass
    }

    /// # Panics
    ///
    /// Panics if `class` was not produced by this graph.
    fn node(&self, class: ClassId) -> &ClassNode {
        &self.nodes[class.index()]
    }
}

impl ClassRegistry for ClassGraph {
    fn classes(&self) -> Box<dyn Iterator<Item = ClassId> + '_> {
        Box::new((0..self.nodes.len()).map(|i| ClassId(i as u32)))
    }

    fn qualified_name(&self, class: ClassId) -> Option<&str> {
        self.node(class).name.as_deref()
    }

    fn ancestors(&self, class: ClassId) -> &[ClassId] {
        &self.node(class).ancestors
    }

    fn declared_arguments(&self, class: ClassId) -> &[ArgumentSpec] {
        &self.node(class).arguments
    }

    fn declared_options(&self, class: ClassId) -> &IndexMap<String, ArgumentSpec> {
        &self.node(class).options
    }

    fn find(&self, qualified_name: &str) -> Option<ClassId> {
        self.by_name.get(qualified_name).copied()
    }
}

fn link(pending: Vec<PendingClass>) -> Result<ClassGraph> {
    let mut ids: HashMap<String, ClassId> = HashMap::with_capacity(pending.len());
    for (i, class) in pending.iter().enumerate() {
        if ids.insert(class.key.clone(), ClassId(i as u32)).is_some() {
            return Err(Error::DuplicateClass(class.key.clone()));
        }
    }

    let mut nodes = Vec::with_capacity(pending.len());
    let mut by_name = HashMap::new();

    for (i, class) in pending.into_iter().enumerate() {
        let superclass = match &class.superclass {
            Some(key) => Some(*ids.get(key).ok_or_else(|| Error::UnknownSuperclass {
                class: class.key.clone(),
                superclass: key.clone(),
            })?),
            None => None,
        };

        let mut options = IndexMap::with_capacity(class.options.len());
        for option in class.options {
            match options.entry(option.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(Error::DuplicateOption {
                        class: class.key,
                        option: option.name,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(option);
                }
            }
        }

        if let Some(name) = &class.name {
            if by_name.contains_key(name) {
                log::warn!("Class name '{}' is registered more than once, keeping the first", name);
            } else {
                by_name.insert(name.clone(), ClassId(i as u32));
            }
        }

        nodes.push(ClassNode {
            key: class.key,
            name: class.name,
            superclass,
            ancestors: Vec::new(),
            arguments: class.arguments,
            options,
        });
    }

    for i in 0..nodes.len() {
        let mut chain = Vec::new();
        let mut current = nodes[i].superclass;
        while let Some(id) = current {
            if id.index() == i || chain.contains(&id) {
                return Err(Error::InheritanceCycle(nodes[i].key.clone()));
            }
            chain.push(id);
            current = nodes[id.index()].superclass;
        }
        nodes[i].ancestors = chain;
    }

    Ok(ClassGraph { nodes, by_name })
}

/// Programmatic construction of a [`ClassGraph`].
///
/// Member declarations apply to the most recently added class.
///
/// ```ignore
/// let graph = ClassGraph::builder()
///     .class("Rails::Generators::Base", None)
///     .class("ServiceGenerator", Some("Rails::Generators::Base"))
///     .argument(ArgumentSpec::new("result_type", "string").required(true))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pending: Vec<PendingClass>,
    anonymous: usize,
}

impl GraphBuilder {
    /// Add a named class. Its key is its name.
    pub fn class(mut self, name: &str, superclass: Option<&str>) -> Self {
        self.pending.push(PendingClass {
            key: name.to_string(),
            name: Some(name.to_string()),
            superclass: superclass.map(str::to_string),
            arguments: Vec::new(),
            options: Vec::new(),
        });
        self
    }

    /// Add an anonymous class.
    pub fn anonymous(mut self, superclass: Option<&str>) -> Self {
        self.anonymous += 1;
        self.pending.push(PendingClass {
            key: format!("#<Class:{:#x}>", self.anonymous),
            name: None,
            superclass: superclass.map(str::to_string),
            arguments: Vec::new(),
            options: Vec::new(),
        });
        self
    }

    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        if let Some(class) = self.pending.last_mut() {
            class.arguments.push(spec);
        }
        self
    }

    pub fn option(mut self, spec: ArgumentSpec) -> Self {
        if let Some(class) = self.pending.last_mut() {
            class.options.push(spec);
        }
        self
    }

    pub fn build(self) -> Result<ClassGraph> {
        link(self.pending)
    }
}
