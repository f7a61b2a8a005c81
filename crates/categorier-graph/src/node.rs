//! A named point in the taxonomy with mirrored edges and attributes.
//!
//! Edge sets are only mutated from inside the crate; the manager owns the
//! mirroring, so a `Node` on its own can never leave half an edge behind.

use categorier_core::{AttributeValue, Direction, Error, NodeRecord, Result, DESCRIPTIONS_KEY};
use indexmap::IndexMap;

use crate::edge_set::{Closure, EdgeLookup, EdgeSet, FinalMembers};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    name: String,
    parents: EdgeSet,
    children: EdgeSet,
    attributes: IndexMap<String, AttributeValue>,
}

/// Picks entries out of an attribute: by exact value or by 1-based position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueSelector {
    Value(String),
    Position(usize),
}

impl ValueSelector {
    /// Numeric tokens select by position, everything else by value.
    pub fn parse(token: &str) -> Self {
        match token.parse::<usize>() {
            Ok(n) => Self::Position(n),
            Err(_) => Self::Value(token.to_string()),
        }
    }

    /// Resolve to a 0-based index into `values`.
    fn resolve(&self, values: &[&str]) -> Result<usize> {
        match self {
            Self::Position(n) if *n >= 1 && *n <= values.len() => Ok(n - 1),
            Self::Position(n) => Err(Error::validation(format!(
                "position {} out of range 1..={}",
                n,
                values.len()
            ))),
            Self::Value(v) => values
                .iter()
                .position(|x| x == v)
                .ok_or_else(|| Error::validation(format!("no value '{}'", v))),
        }
    }
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: EdgeSet::new(Direction::Parents),
            children: EdgeSet::new(Direction::Children),
            attributes: IndexMap::new(),
        }
    }

    pub fn from_record(name: impl Into<String>, record: NodeRecord) -> Self {
        Self {
            name: name.into(),
            parents: EdgeSet::from_names(Direction::Parents, record.parents),
            children: EdgeSet::from_names(Direction::Children, record.children),
            attributes: record.attributes,
        }
    }

    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            parents: self.parents.members().clone(),
            children: self.children.members().clone(),
            attributes: self.attributes.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn parents(&self) -> &EdgeSet {
        &self.parents
    }

    pub fn children(&self) -> &EdgeSet {
        &self.children
    }

    pub fn edges(&self, direction: Direction) -> &EdgeSet {
        match direction {
            Direction::Parents => &self.parents,
            Direction::Children => &self.children,
        }
    }

    pub(crate) fn edges_mut(&mut self, direction: Direction) -> &mut EdgeSet {
        match direction {
            Direction::Parents => &mut self.parents,
            Direction::Children => &mut self.children,
        }
    }

    // ─── closures ───

    pub fn ancestors<'g, L>(&'g self, graph: &'g L) -> Closure<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        self.parents.flatten(graph)
    }

    pub fn descendants<'g, L>(&'g self, graph: &'g L) -> Closure<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        self.children.flatten(graph)
    }

    pub fn final_ancestors<'g, L>(&'g self, graph: &'g L) -> FinalMembers<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        self.parents.final_members(graph)
    }

    pub fn final_descendants<'g, L>(&'g self, graph: &'g L) -> FinalMembers<'g, L>
    where
        L: EdgeLookup + ?Sized,
    {
        self.children.final_members(graph)
    }

    // ─── attributes ───

    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Insert or overwrite; an existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        self.attributes.insert(key.into(), value)
    }

    pub fn unset(&mut self, key: &str) -> Result<AttributeValue> {
        self.attributes
            .shift_remove(key)
            .ok_or_else(|| Error::not_found("attribute", key))
    }

    /// Append `values` to the list under `key`, creating it if absent. A
    /// scalar is promoted to a one-element list first.
    pub fn extend_list<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slot = self
            .attributes
            .entry(key.to_string())
            .or_insert_with(|| AttributeValue::List(Vec::new()));
        let mut items = match std::mem::replace(slot, AttributeValue::List(Vec::new())) {
            AttributeValue::List(items) => items,
            AttributeValue::Scalar(s) => vec![s],
        };
        items.extend(values.into_iter().map(Into::into));
        *slot = AttributeValue::List(items);
    }

    pub fn descriptions(&self) -> &[String] {
        self.attributes
            .get(DESCRIPTIONS_KEY)
            .and_then(AttributeValue::as_list)
            .unwrap_or(&[])
    }

    /// Remove selected entries from `key`. Selectors are resolved against the
    /// value as it stands before any removal. Emptying the value drops the key.
    pub fn remove_values(&mut self, key: &str, selectors: &[ValueSelector]) -> Result<()> {
        let value = self
            .attributes
            .get(key)
            .ok_or_else(|| Error::not_found("attribute", key))?;

        let mut doomed = {
            let values = value.values();
            selectors
                .iter()
                .map(|s| s.resolve(&values))
                .collect::<Result<Vec<usize>>>()?
        };
        doomed.sort_unstable();
        doomed.dedup();

        let remaining: Vec<String> = value
            .values()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| doomed.binary_search(i).is_err())
            .map(|(_, v)| v.to_string())
            .collect();

        if remaining.is_empty() {
            self.attributes.shift_remove(key);
        } else if let Some(slot) = self.attributes.get_mut(key) {
            *slot = AttributeValue::List(remaining);
        }
        Ok(())
    }

    /// Replace one selected entry of `key` in place.
    pub fn change_value(&mut self, key: &str, selector: &ValueSelector, new_value: &str) -> Result<()> {
        let slot = self
            .attributes
            .get_mut(key)
            .ok_or_else(|| Error::not_found("attribute", key))?;
        let index = selector.resolve(&slot.values())?;
        match slot {
            AttributeValue::Scalar(s) => *s = new_value.to_string(),
            AttributeValue::List(items) => items[index] = new_value.to_string(),
        }
        Ok(())
    }

    /// Move the value under `old` to `new`, keeping its position.
    pub fn rename_attribute(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.attributes.contains_key(old) {
            return Err(Error::not_found("attribute", old));
        }
        if self.attributes.contains_key(new) {
            return Err(Error::already_exists(new));
        }
        self.attributes = self
            .attributes
            .drain(..)
            .map(|(k, v)| if k == old { (new.to_string(), v) } else { (k, v) })
            .collect();
        Ok(())
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
