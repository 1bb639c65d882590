//! Shared types for stubgen.
//!
//! This crate defines the data model exchanged between the class registry,
//! the generator compiler and the command-line driver: the metadata of a
//! declared argument or option, the inferred output types, and the JSON
//! snapshot format that describes a loaded program's class graph.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Declared Members
// ============================================================================

/// The declared type of an argument or option.
///
/// Only five tags are recognized. Anything else is kept verbatim in
/// [`TypeTag::Other`] so diagnostics can show what was declared. Decoding
/// never fails: `null` is the default `string` tag, and a non-string value
/// becomes `Other` holding its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub enum TypeTag {
    Array,
    Boolean,
    Hash,
    Numeric,
    #[default]
    String,
    Other(String),
}

impl TypeTag {
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Array => "array",
            TypeTag::Boolean => "boolean",
            TypeTag::Hash => "hash",
            TypeTag::Numeric => "numeric",
            TypeTag::String => "string",
            TypeTag::Other(raw) => raw,
        }
    }

    /// Whether this tag is one of the recognized ones.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TypeTag::Other(_))
    }
}

impl From<&str> for TypeTag {
    fn from(raw: &str) -> Self {
        match raw {
            "array" => TypeTag::Array,
            "boolean" => TypeTag::Boolean,
            "hash" => TypeTag::Hash,
            "numeric" => TypeTag::Numeric,
            "string" => TypeTag::String,
            other => TypeTag::Other(other.to_string()),
        }
    }
}

impl From<String> for TypeTag {
    fn from(raw: String) -> Self {
        match TypeTag::from(raw.as_str()) {
            TypeTag::Other(_) => TypeTag::Other(raw),
            known => known,
        }
    }
}

impl From<serde_json::Value> for TypeTag {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(raw) => TypeTag::from(raw),
            serde_json::Value::Null => TypeTag::default(),
            other => TypeTag::Other(other.to_string()),
        }
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared positional argument or named option of a class.
///
/// Equality is structural: two specs are equal when they have the same name,
/// type tag, required flag and default presence. The member diff relies on
/// this to tell an inherited declaration from an overriding one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub tag: TypeTag,
    pub required: bool,
    /// Whether a default value was declared. The value itself never matters.
    pub has_default: bool,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, tag: impl Into<TypeTag>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            required: false,
            has_default: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    /// A member can be absent at runtime unless it is required or defaulted.
    pub fn may_be_absent(&self) -> bool {
        !(self.required || self.has_default)
    }
}

// ============================================================================
// Inferred Types
// ============================================================================

/// The unwrapped shape of an inferred accessor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// `Array<String>`
    ArrayOfStrings,
    Boolean,
    /// `Hash<String, String>`
    HashOfStrings,
    Numeric,
    String,
    Untyped,
}

impl BaseType {
    /// The RBI spelling of this type.
    pub fn rbi(self) -> &'static str {
        match self {
            BaseType::ArrayOfStrings => "T::Array[::String]",
            BaseType::Boolean => "T::Boolean",
            BaseType::HashOfStrings => "T::Hash[::String, ::String]",
            BaseType::Numeric => "::Numeric",
            BaseType::String => "::String",
            BaseType::Untyped => "T.untyped",
        }
    }
}

/// The inferred return type of one generated accessor.
///
/// Nilability is a flag rather than a wrapper so a descriptor can never be
/// nilable twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub base: BaseType,
    pub nilable: bool,
}

impl TypeDescriptor {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            nilable: false,
        }
    }

    pub fn nilable(base: BaseType) -> Self {
        Self {
            base,
            nilable: true,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nilable {
            write!(f, "T.nilable({})", self.base.rbi())
        } else {
            f.write_str(self.base.rbi())
        }
    }
}

// ============================================================================
// Program Snapshots
// ============================================================================

/// A dump of the class graph of a loaded program.
///
/// This is what the registry is built from. Producers list every class they
/// can see, including anonymous ones and framework classes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramSnapshot {
    /// All classes known to the program
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

impl ProgramSnapshot {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One class in a [`ProgramSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Unique key within the snapshot (an object id, or the name)
    pub id: String,
    /// Qualified name, absent for anonymous classes
    #[serde(default)]
    pub name: Option<String>,
    /// Key of the direct superclass
    #[serde(default)]
    pub superclass: Option<String>,
    /// Effective positional arguments, in declaration order
    #[serde(default)]
    pub arguments: Vec<MemberRecord>,
    /// Effective named options, in declaration order
    #[serde(default)]
    pub options: Vec<MemberRecord>,
}

/// A declared member as it appears in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    #[serde(rename = "type", default)]
    pub tag: TypeTag,
    #[serde(default)]
    pub required: bool,
    /// The declared default. `null` and a missing key both mean "no default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl From<MemberRecord> for ArgumentSpec {
    fn from(record: MemberRecord) -> Self {
        ArgumentSpec {
            name: record.name,
            tag: record.tag,
            required: record.required,
            has_default: record.default.is_some(),
        }
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Convert one constant name segment to snake case.
///
/// Runs of capitals stay together, so `HTTPClient` becomes `http_client`.
pub fn underscore(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// Relative path of the stub file for a qualified class name.
///
/// `Foo::BarGenerator` maps to `foo/bar_generator.rbi`.
pub fn stub_path(qualified_name: &str) -> PathBuf {
    let mut path: PathBuf = qualified_name
        .trim_start_matches("::")
        .split("::")
        .map(underscore)
        .collect();
    path.set_extension("rbi");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_decoding() {
        assert_eq!(TypeTag::from("array"), TypeTag::Array);
        assert_eq!(TypeTag::from("boolean"), TypeTag::Boolean);
        assert_eq!(TypeTag::from("hash"), TypeTag::Hash);
        assert_eq!(TypeTag::from("numeric"), TypeTag::Numeric);
        assert_eq!(TypeTag::from("string"), TypeTag::String);
        assert_eq!(TypeTag::from("date"), TypeTag::Other("date".to_string()));
        assert!(!TypeTag::from("String").is_recognized());
    }

    #[test]
    fn test_type_tag_serialization() {
        let json = serde_json::to_string(&TypeTag::Numeric).unwrap();
        assert_eq!(json, "\"numeric\"");

        let parsed: TypeTag = serde_json::from_str("\"symbol\"").unwrap();
        assert_eq!(parsed, TypeTag::Other("symbol".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"symbol\"");
    }

    #[test]
    fn test_descriptor_rendering() {
        assert_eq!(TypeDescriptor::new(BaseType::String).to_string(), "::String");
        assert_eq!(
            TypeDescriptor::nilable(BaseType::HashOfStrings).to_string(),
            "T.nilable(T::Hash[::String, ::String])"
        );
        assert_eq!(
            TypeDescriptor::nilable(BaseType::Untyped).to_string(),
            "T.nilable(T.untyped)"
        );
    }

    #[test]
    fn test_member_record_default_presence() {
        let json = r#"{
            "classes": [{
                "id": "ServiceGenerator",
                "name": "ServiceGenerator",
                "superclass": "Rails::Generators::NamedBase",
                "arguments": [{ "name": "result_type", "type": "string", "required": true }],
                "options": [
                    { "name": "skip_comments", "type": "boolean", "default": false },
                    { "name": "template", "type": "string", "default": null }
                ]
            }]
        }"#;
        let snapshot = ProgramSnapshot::from_json(json).unwrap();
        let record = &snapshot.classes[0];
        assert_eq!(record.superclass.as_deref(), Some("Rails::Generators::NamedBase"));

        let options: Vec<ArgumentSpec> =
            record.options.iter().cloned().map(ArgumentSpec::from).collect();
        assert!(options[0].has_default);
        assert!(!options[1].has_default);

        let argument = ArgumentSpec::from(record.arguments[0].clone());
        assert_eq!(argument, ArgumentSpec::new("result_type", "string").required(true));
    }

    #[test]
    fn test_member_record_missing_type_defaults_to_string() {
        let record: MemberRecord = serde_json::from_str(r#"{ "name": "name" }"#).unwrap();
        let spec = ArgumentSpec::from(record);
        assert_eq!(spec.tag, TypeTag::String);
        assert!(spec.may_be_absent());
    }

    #[test]
    fn test_member_record_odd_type_tags_degrade() {
        let json = r#"{
            "classes": [{
                "id": "ImportGenerator",
                "name": "ImportGenerator",
                "options": [
                    { "name": "source", "type": null },
                    { "name": "batch", "type": 42 },
                    { "name": "columns", "type": ["a", "b"] },
                    { "name": "since", "type": "date" }
                ]
            }]
        }"#;
        let snapshot = ProgramSnapshot::from_json(json).unwrap();
        let tags: Vec<TypeTag> = snapshot.classes[0]
            .options
            .iter()
            .map(|option| option.tag.clone())
            .collect();

        assert_eq!(
            tags,
            vec![
                TypeTag::String,
                TypeTag::Other("42".to_string()),
                TypeTag::Other(r#"["a","b"]"#.to_string()),
                TypeTag::Other("date".to_string()),
            ]
        );
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("ServiceGenerator"), "service_generator");
        assert_eq!(underscore("HTTPClientGenerator"), "http_client_generator");
        assert_eq!(underscore("Api2Generator"), "api2_generator");
        assert_eq!(underscore("lower"), "lower");
    }

    #[test]
    fn test_stub_path() {
        assert_eq!(
            stub_path("Foo::BarGenerator"),
            PathBuf::from("foo").join("bar_generator.rbi")
        );
        assert_eq!(
            stub_path("::ServiceGenerator"),
            PathBuf::from("service_generator.rbi")
        );
    }
}
