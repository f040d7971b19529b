//! Field name lookup table and row storage.
//!
//! A [`Lookup`] assigns every field name a slot index. Binding an expression
//! resolves each property name to a [`LookupKey`] once; evaluation then reads
//! the slot straight out of the [`Row`].

use crate::access::Value;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Resolved accessor for one field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    index: usize,
    name: Arc<str>,
}

impl LookupKey {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered table of field names known to a pipeline
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    keys: Vec<LookupKey>,
    by_name: HashMap<Arc<str>, usize>,
}

impl Lookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup with one key per name, in order
    pub fn with_keys<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lookup = Self::new();
        for name in names {
            lookup.create_key(name.as_ref());
        }
        lookup
    }

    /// Get the key for `name`, adding it if the name is new
    pub fn create_key(&mut self, name: &str) -> LookupKey {
        if let Some(key) = self.get_key(name) {
            return key;
        }
        let key = LookupKey {
            index: self.keys.len(),
            name: Arc::from(name),
        };
        self.by_name.insert(Arc::clone(&key.name), key.index);
        self.keys.push(key.clone());
        key
    }

    /// Resolve `name` to its key, if the pipeline knows about it
    pub fn get_key(&self, name: &str) -> Option<LookupKey> {
        self.by_name.get(name).map(|&index| self.keys[index].clone())
    }

    pub fn keys(&self) -> &[LookupKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Build a row from `(name, value)` pairs; every name must be known
    pub fn row_from<'n, I>(&self, fields: I) -> Result<Row>
    where
        I: IntoIterator<Item = (&'n str, Value<'static>)>,
    {
        let mut row = Row::new();
        for (name, value) in fields {
            let Some(key) = self.get_key(name) else {
                bail!("Field '{}' is not part of the lookup", name);
            };
            row.write_own(&key, value);
        }
        Ok(row)
    }

    /// Render the present fields of `row` as `{name: value, ...}`
    pub fn describe(&self, row: &Row) -> String {
        let mut out = String::from("{");
        let mut first = true;
        for key in &self.keys {
            if let Some(value) = row.get_item(key) {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                let _ = write!(out, "{}: {}", key.name, value);
            }
        }
        out.push('}');
        out
    }
}

/// Sparse per-result field storage, indexed by [`LookupKey`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Option<Value<'static>>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &LookupKey) -> Option<&Value<'static>> {
        self.values.get(key.index).and_then(Option::as_ref)
    }

    /// Store `value` under `key`, taking ownership and releasing any previous value
    pub fn write_own(&mut self, key: &LookupKey, value: Value<'static>) {
        if self.values.len() <= key.index {
            self.values.resize_with(key.index + 1, || None);
        }
        self.values[key.index] = Some(value);
    }

    /// Store a detached copy of `value` under `key`
    pub fn write(&mut self, key: &LookupKey, value: &Value<'_>) {
        self.write_own(key, value.to_static());
    }

    pub fn take(&mut self, key: &LookupKey) -> Option<Value<'static>> {
        self.values.get_mut(key.index).and_then(Option::take)
    }

    /// Release every field
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of fields holding a value
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
