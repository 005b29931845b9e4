//! USDA (ASCII) reading and writing.
//!
//! Only the subset of the format the layer model holds is read back; see
//! [`parser`] for what is skipped.

pub mod parser;
mod writer;

pub use parser::{parse_usda, ParseError, ParseResult, UsdaParser};
pub use writer::{format_value, write_usda};

use crate::value::ValueType;

/// Layer metadata fields written as bare `key = value` entries. Any other
/// key, or a known key holding a value of another type, goes into
/// `customLayerData`.
const LAYER_FIELDS: &[(&str, ValueType)] = &[
    ("comment", ValueType::String),
    ("defaultPrim", ValueType::Token),
    ("doc", ValueType::String),
    ("endTimeCode", ValueType::Double),
    ("framesPerSecond", ValueType::Double),
    ("kilogramsPerUnit", ValueType::Double),
    ("metersPerUnit", ValueType::Double),
    ("startTimeCode", ValueType::Double),
    ("timeCodesPerSecond", ValueType::Double),
    ("upAxis", ValueType::Token),
];

fn layer_field_type(key: &str) -> Option<ValueType> {
    LAYER_FIELDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, ty)| *ty)
}
