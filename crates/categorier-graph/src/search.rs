//! Search criteria over node names and attribute values.

use categorier_core::AttributeValue;
use indexmap::IndexMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Criterion {
    /// Node name starts with the text.
    NamePrefix(String),
    /// A scalar, or any list element, under `key` starts with `prefix`.
    AttributePrefix { key: String, prefix: String },
    /// The node has no attribute `key`.
    AttributeMissing { key: String },
}

/// How several criteria combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Combine {
    #[default]
    All,
    Any,
}

impl Criterion {
    pub fn name_prefix(prefix: impl Into<String>) -> Self {
        Self::NamePrefix(prefix.into())
    }

    pub fn attribute(key: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::AttributePrefix {
            key: key.into(),
            prefix: prefix.into(),
        }
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Self::AttributeMissing { key: key.into() }
    }

    pub fn matches(&self, name: &str, attributes: &IndexMap<String, AttributeValue>) -> bool {
        match self {
            Self::NamePrefix(prefix) => name.starts_with(prefix.as_str()),
            Self::AttributePrefix { key, prefix } => attributes
                .get(key)
                .map(|v| v.values().iter().any(|x| x.starts_with(prefix.as_str())))
                .unwrap_or(false),
            Self::AttributeMissing { key } => !attributes.contains_key(key),
        }
    }
}

/// True when `criteria` accept the node. No criteria accepts everything.
pub fn accepts(
    criteria: &[Criterion],
    combine: Combine,
    name: &str,
    attributes: &IndexMap<String, AttributeValue>,
) -> bool {
    if criteria.is_empty() {
        return true;
    }
    match combine {
        Combine::All => criteria.iter().all(|c| c.matches(name, attributes)),
        Combine::Any => criteria.iter().any(|c| c.matches(name, attributes)),
    }
}
