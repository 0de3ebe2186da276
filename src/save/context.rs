//! Save-file tree with a section cursor
//!
//! The save format is a single JSON object of nested sections. Systems
//! never touch the JSON directly: a [`SaveContext`] keeps a cursor into
//! the tree, writers create sections as they descend, and readers fall
//! back to caller-supplied defaults for anything missing. Older files
//! therefore load cleanly after new fields are added.
//!
//! Collections are stored as a `<prefix>-count` key plus one section per
//! element (`<prefix>-0`, `<prefix>-1`, ...), which keeps element order
//! stable across save and load.

use serde_json::{Map, Value};
use std::path::Path;

use crate::core::bignum::BigNumber;
use crate::core::error::{LichError, Result};

/// Anything that can write itself into and restore itself from a save tree
///
/// Implementations assume the cursor already sits on their own section;
/// the owner is responsible for `begin_section`/`end_section` around the
/// call. Saving into the in-memory tree cannot fail; loading fails fast
/// on structurally invalid data (an unknown variant tag, for example) and
/// the whole load is then abandoned.
pub trait Saveable {
    fn save(&self, ctx: &mut SaveContext);
    fn load(&mut self, ctx: &mut SaveContext) -> Result<()>;
}

/// Cursor-based access to one save file's JSON tree
#[derive(Debug, Clone)]
pub struct SaveContext {
    root: Value,
    path: Vec<String>,
}

impl SaveContext {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
            path: Vec::new(),
        }
    }

    /// Moves the cursor down into `name`, creating the section if absent.
    pub fn begin_section(&mut self, name: &str) {
        self.path.push(name.to_string());
        // Touch the node so writes and later reads agree on its existence.
        self.current_object_mut();
    }

    /// Moves the cursor back up one level.
    pub fn end_section(&mut self) {
        self.path.pop();
    }

    /// True if the current section contains a child section `name`.
    pub fn has_section(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Value::Object(_)))
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    // --- writers ---

    pub fn write_string(&mut self, key: &str, value: &str) {
        self.current_object_mut()
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn write_int(&mut self, key: &str, value: i64) {
        self.current_object_mut()
            .insert(key.to_string(), Value::from(value));
    }

    pub fn write_uint(&mut self, key: &str, value: u64) {
        self.current_object_mut()
            .insert(key.to_string(), Value::from(value));
    }

    pub fn write_double(&mut self, key: &str, value: f64) {
        self.current_object_mut()
            .insert(key.to_string(), Value::from(value));
    }

    pub fn write_bool(&mut self, key: &str, value: bool) {
        self.current_object_mut()
            .insert(key.to_string(), Value::Bool(value));
    }

    /// Stores a big number as `<key>-mantissa` + `<key>-exponent`, with a
    /// `<key>-is-zero` companion so exact zero survives the round trip.
    pub fn write_big(&mut self, key: &str, value: &BigNumber) {
        self.write_double(&format!("{}-mantissa", key), value.mantissa());
        self.write_int(&format!("{}-exponent", key), value.exponent());
        self.write_bool(&format!("{}-is-zero", key), value.is_zero());
    }

    // --- readers (missing or mistyped keys yield the default) ---

    pub fn read_string(&self, key: &str, default: &str) -> String {
        self.lookup(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    }

    pub fn read_int(&self, key: &str, default: i64) -> i64 {
        self.lookup(key).and_then(|v| v.as_i64()).unwrap_or(default)
    }

    pub fn read_uint(&self, key: &str, default: u64) -> u64 {
        self.lookup(key).and_then(|v| v.as_u64()).unwrap_or(default)
    }

    pub fn read_double(&self, key: &str, default: f64) -> f64 {
        self.lookup(key).and_then(|v| v.as_f64()).unwrap_or(default)
    }

    pub fn read_bool(&self, key: &str, default: bool) -> bool {
        self.lookup(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    pub fn read_big(&self, key: &str) -> BigNumber {
        if self.read_bool(&format!("{}-is-zero", key), false) {
            return BigNumber::ZERO;
        }
        let mantissa = self.read_double(&format!("{}-mantissa", key), 0.0);
        let exponent = self.read_int(&format!("{}-exponent", key), 0);
        BigNumber::from_parts(mantissa, exponent)
    }

    // --- serialization ---

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)?;
        if !root.is_object() {
            return Err(LichError::Load("save root is not an object".to_string()));
        }
        Ok(Self {
            root,
            path: Vec::new(),
        })
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    // --- cursor internals ---

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut cur = &self.root;
        for segment in &self.path {
            cur = cur.as_object()?.get(segment)?;
        }
        cur.as_object()?.get(key)
    }

    fn current_object_mut(&mut self) -> &mut Map<String, Value> {
        let mut cur = &mut self.root;
        for segment in &self.path {
            cur = force_object(cur)
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        force_object(cur)
    }
}

impl Default for SaveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces any non-object node with an empty object and returns its map.
fn force_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}
