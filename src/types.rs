use crate::error::FieldMapError;
use serde_json::{Map, Value};
use std::fmt;

/// One structured unit of data: an ordered mapping of field name to value
pub type Record = Map<String, Value>;

/// Primitive kind of a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

impl Kind {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Kind::Null),
            Value::Bool(_) => Some(Kind::Bool),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some(Kind::Int)
                } else {
                    Some(Kind::Float)
                }
            }
            Value::String(_) => Some(Kind::Str),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inferred structural shape of a field
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A leaf value
    Primitive(Kind),

    /// A nested mapping, fields kept in document order
    Mapping(Vec<(String, TypeDescriptor)>),

    /// A sequence, described by its first element
    Sequence(Box<TypeDescriptor>),

    /// A sequence that had no elements in the representative record
    EmptySequence,

    /// Descent stopped at the configured depth limit
    Truncated,
}

impl TypeDescriptor {
    /// Look up a nested field descriptor by name
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Mapping(fields) => {
                fields.iter().find(|(k, _)| k == name).map(|(_, d)| d)
            }
            _ => None,
        }
    }

    /// JSON form: mappings become objects, everything else its string form
    pub fn to_json(&self) -> Value {
        match self {
            TypeDescriptor::Mapping(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, d)| (k.clone(), d.to_json()))
                    .collect(),
            ),
            other => Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => write!(f, "{}", kind),
            TypeDescriptor::Mapping(fields) => {
                f.write_str("{")?;
                for (idx, (key, desc)) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, desc)?;
                }
                f.write_str("}")
            }
            TypeDescriptor::Sequence(inner) => write!(f, "List[{}]", inner),
            TypeDescriptor::EmptySequence => f.write_str("List[Empty]"),
            TypeDescriptor::Truncated => f.write_str("..."),
        }
    }
}

/// A dotted source path, split into segments once up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, FieldMapError> {
        if raw.is_empty() {
            return Err(FieldMapError::EmptyPath);
        }

        Ok(FieldPath {
            raw: raw.to_string(),
            segments: raw.split('.').map(str::to_string).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Ordered mapping from dotted source path to output field name.
///
/// Source paths are unique: inserting a path that is already present replaces
/// its target without moving it. Target names may repeat; when they do, the
/// entry that comes later wins in the extracted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(FieldPath, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map each name to itself
    pub fn identity<I, S>(names: I) -> Result<Self, FieldMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = FieldMap::new();
        for name in names {
            let name = name.as_ref();
            map.insert(name, name)?;
        }
        Ok(map)
    }

    /// Build from a JSON object of `path -> target` in document order
    pub fn from_json_object(value: &Value) -> Result<Self, FieldMapError> {
        let obj = value.as_object().ok_or(FieldMapError::NotAnObject)?;

        let mut map = FieldMap::new();
        for (path, target) in obj.iter() {
            let target = target
                .as_str()
                .ok_or_else(|| FieldMapError::TargetNotString { path: path.clone() })?;
            map.insert(path, target)?;
        }
        Ok(map)
    }

    /// Parse a `path=target` pair; a bare `path` keeps its own name
    pub fn parse_pair(spec: &str) -> Result<(String, String), FieldMapError> {
        match spec.split_once('=') {
            Some((path, target)) => {
                let (path, target) = (path.trim(), target.trim());
                if target.is_empty() {
                    return Err(FieldMapError::EmptyTarget { path: path.to_string() });
                }
                Ok((path.to_string(), target.to_string()))
            }
            None => {
                let path = spec.trim();
                Ok((path.to_string(), path.to_string()))
            }
        }
    }

    pub fn insert(&mut self, path: &str, target: &str) -> Result<(), FieldMapError> {
        let path = FieldPath::parse(path)?;
        if target.is_empty() {
            return Err(FieldMapError::EmptyTarget { path: path.raw });
        }

        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == path) {
            entry.1 = target.to_string();
        } else {
            self.entries.push((path, target.to_string()));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.entries.iter().map(|(p, t)| (p, t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for the inspection pass
#[derive(Debug, Clone)]
pub struct InspectConfig {
    /// Number of records pulled from the head of the stream
    pub sample_size: usize,

    /// Maximum nesting depth described before giving up with `Truncated`
    pub max_depth: usize,
}

impl Default for InspectConfig {
    fn default() -> Self {
        InspectConfig {
            sample_size: 5,
            max_depth: 32,
        }
    }
}
