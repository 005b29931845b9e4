//! Attribute value types.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Declared attribute type, spelled as in USDA (`color3f`, `token`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Double,
    Float2,
    Float3,
    Color3f,
    Normal3f,
    Token,
    String,
    Asset,
}

impl ValueType {
    pub const ALL: [ValueType; 11] = [
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::Double,
        ValueType::Float2,
        ValueType::Float3,
        ValueType::Color3f,
        ValueType::Normal3f,
        ValueType::Token,
        ValueType::String,
        ValueType::Asset,
    ];

    /// USDA keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Float2 => "float2",
            ValueType::Float3 => "float3",
            ValueType::Color3f => "color3f",
            ValueType::Normal3f => "normal3f",
            ValueType::Token => "token",
            ValueType::String => "string",
            ValueType::Asset => "asset",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.keyword() == keyword)
    }

    /// MaterialX node type suffix (`color3f` becomes `color3`).
    pub fn mtlx_name(self) -> String {
        self.keyword().replace("3f", "3")
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A concrete attribute or metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Float2(Vec2),
    Float3(Vec3),
    Token(String),
    String(String),
    Asset(String),
}

impl Value {
    /// Whether this value can be stored in an attribute of type `ty`.
    pub fn fits(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Value::Bool(_), ValueType::Bool)
                | (Value::Int(_), ValueType::Int)
                | (Value::Float(_), ValueType::Float)
                | (Value::Double(_), ValueType::Double)
                | (Value::Float2(_), ValueType::Float2)
                | (
                    Value::Float3(_),
                    ValueType::Float3 | ValueType::Color3f | ValueType::Normal3f
                )
                | (Value::Token(_), ValueType::Token)
                | (Value::String(_), ValueType::String)
                | (Value::Asset(_), ValueType::Asset)
        )
    }

    /// Short variant name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Float2(_) => "float2",
            Value::Float3(_) => "float3",
            Value::Token(_) => "token",
            Value::String(_) => "string",
            Value::Asset(_) => "asset",
        }
    }

    /// Text of token, string and asset values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Token(s) | Value::String(s) | Value::Asset(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Float2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Float3(v)
    }
}
