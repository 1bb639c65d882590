//! Built-in namespace configuration.

use regex::RegexSet;
use serde::{Deserialize, Serialize};

/// Namespaces whose generators ship with the framework.
pub const DEFAULT_BUILTIN_PATTERN: &str =
    r"^(ActionMailbox|ActionText|ActiveRecord|Rails)::Generators(::|$)";

/// Every generator inherits from this class.
pub const DEFAULT_ROOT: &str = "Rails::Generators::Base";

/// Configuration for [`GeneratorCompiler`](crate::GeneratorCompiler).
///
/// The root type must itself match one of the built-in patterns, otherwise
/// candidates have no built-in base to be diffed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Regular expressions matched against qualified names (no leading `::`)
    pub builtin_patterns: Vec<String>,
    /// Qualified name of the root generator type
    pub root: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            builtin_patterns: vec![DEFAULT_BUILTIN_PATTERN.to_string()],
            root: DEFAULT_ROOT.to_string(),
        }
    }
}

/// Compiled built-in namespace patterns.
#[derive(Debug, Clone)]
pub struct BuiltinMatcher {
    set: RegexSet,
}

impl BuiltinMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            set: RegexSet::new(patterns)?,
        })
    }

    /// Whether `qualified_name` belongs to a framework namespace.
    pub fn is_builtin(&self, qualified_name: &str) -> bool {
        self.set.is_match(qualified_name.trim_start_matches("::"))
    }
}
