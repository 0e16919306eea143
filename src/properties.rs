use std::collections::HashMap;

/// A typed Tiled custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int` and `object` references.
    I64(i64),
    /// `float`
    F32(f32),
    /// `string`, `file`, `color` and `class`.
    String(String),
}

/// Custom properties attached to a map, layer or tileset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    /// Empty property table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a property.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when no properties are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Boolean property.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property that fits in an `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// Float property.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.values.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// String-like property.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            PropertyValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}
