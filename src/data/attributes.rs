//! AttributeStore: per-element key/value bags with mesh-wide defaults.
//!
//! Every mesh element family (vertices, faces, edges) carries an
//! `AttributeStore` that resolves a named attribute against (a) an explicit
//! override set on the element, then (b) an immutable defaults snapshot
//! captured when the store was built, in that priority order. A name with
//! neither an override nor a default resolves to `None` — a deliberate soft
//! schema that permits exploratory attribute usage. [`AttributeStore::try_get`]
//! is the strict variant that turns a missing default into an error.

use crate::mesh_error::MeshHalfedgeError;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Value union for element attributes.
///
/// Covers the quantities CAD-adjacent consumers stash on mesh elements:
/// scalars (`q`, coordinates), flags (`is_fixed`), labels, and small vectors
/// (`px,py,pz` loads, colors).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AttrValue {
    /// A floating-point scalar.
    Number(f64),
    /// A boolean flag.
    Bool(bool),
    /// A short text label.
    Text(String),
    /// A small vector of floats.
    Vector(Vec<f64>),
}

impl AttrValue {
    /// The scalar payload, if this value is a `Number`.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// The flag payload, if this value is a `Bool`.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The text payload, if this value is a `Text`.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The vector payload, if this value is a `Vector`.
    #[inline]
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            AttrValue::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Number(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        AttrValue::Vector(v)
    }
}

/// Per-element attribute storage with two-tier resolution.
///
/// # Invariants
/// - `defaults` is fixed at construction; [`set`](Self::set) only ever
///   touches per-element overrides.
/// - Override bags exist only for elements that have at least one explicit
///   value; [`remove_key`](Self::remove_key) drops the whole bag when its
///   element is deleted.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct AttributeStore<K>
where
    K: Copy + Eq + Hash,
{
    /// Mesh-wide defaults, resolved when an element has no override.
    /// `BTreeMap` keeps name iteration deterministic.
    defaults: BTreeMap<String, AttrValue>,
    /// Explicit per-element overrides.
    overrides: HashMap<K, HashMap<String, AttrValue>>,
}

impl<K> AttributeStore<K>
where
    K: Copy + Eq + Hash,
{
    /// Empty store with no defaults.
    pub fn new() -> Self {
        Self {
            defaults: BTreeMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Store whose defaults snapshot is taken from `defaults`.
    ///
    /// The snapshot is immutable for the life of the store, so two meshes can
    /// never interfere through a shared defaults dictionary.
    pub fn with_defaults<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (S, AttrValue)>,
        S: Into<String>,
    {
        Self {
            defaults: defaults
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
            overrides: HashMap::new(),
        }
    }

    /// The default for `name`, if one was registered at construction.
    #[inline]
    pub fn default_value(&self, name: &str) -> Option<&AttrValue> {
        self.defaults.get(name)
    }

    /// Resolve `name` for element `key`: explicit override first, then the
    /// mesh-wide default, then `None`.
    pub fn get(&self, key: K, name: &str) -> Option<AttrValue> {
        self.overrides
            .get(&key)
            .and_then(|bag| bag.get(name))
            .or_else(|| self.defaults.get(name))
            .cloned()
    }

    /// Strict lookup: like [`get`](Self::get), but a name with neither an
    /// override nor a default is an error instead of `None`.
    pub fn try_get(&self, key: K, name: &str) -> Result<AttrValue, MeshHalfedgeError> {
        self.get(key, name)
            .ok_or_else(|| MeshHalfedgeError::MissingAttributeDefault(name.to_owned()))
    }

    /// Resolve several names for one element, preserving the order of `names`.
    pub fn get_many(&self, key: K, names: &[&str]) -> Vec<Option<AttrValue>> {
        names.iter().map(|name| self.get(key, name)).collect()
    }

    /// Store an explicit override for element `key`. Defaults are untouched.
    pub fn set(&mut self, key: K, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.overrides
            .entry(key)
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Resolve one name across a sequence of elements, one result per key.
    pub fn get_for_keys(&self, keys: &[K], name: &str) -> Vec<Option<AttrValue>> {
        keys.iter().map(|&key| self.get(key, name)).collect()
    }

    /// Store the same override on every element in `keys`.
    pub fn set_for_keys(&mut self, keys: &[K], name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        for &key in keys {
            self.set(key, name, value.clone());
        }
    }

    /// Remove an explicit override, returning it. Subsequent gets fall back
    /// to the default again.
    pub fn unset(&mut self, key: K, name: &str) -> Option<AttrValue> {
        let bag = self.overrides.get_mut(&key)?;
        let removed = bag.remove(name);
        if bag.is_empty() {
            self.overrides.remove(&key);
        }
        removed
    }

    /// Drop every override of element `key`. Called when the element is
    /// deleted from its mesh.
    pub fn remove_key(&mut self, key: K) {
        self.overrides.remove(&key);
    }

    /// True iff `key` carries at least one explicit override.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.overrides.contains_key(&key)
    }

    /// Attribute names visible on `key`: its overrides plus every default,
    /// deduplicated, defaults order first.
    pub fn names_for(&self, key: K) -> Vec<String> {
        let mut names: Vec<String> = self.defaults.keys().cloned().collect();
        if let Some(bag) = self.overrides.get(&key) {
            let mut extra: Vec<&String> = bag.keys().filter(|n| !self.defaults.contains_key(*n)).collect();
            extra.sort();
            names.extend(extra.into_iter().cloned());
        }
        names
    }
}
