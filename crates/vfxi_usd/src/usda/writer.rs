//! USDA (ASCII) writer.
//!
//! Emits layers in the layout the parser reads back: a `#usda 1.0` header,
//! a layer metadata block, then prim blocks with metadata in parentheses and
//! one property per line.

use std::fmt::Write;

use crate::layer::{AttributeSpec, Layer, PrimSpec};
use crate::path::Path;
use crate::value::Value;

use super::layer_field_type;

const INDENT: &str = "    ";

/// Serialize a layer to USDA text.
pub fn write_usda(layer: &Layer) -> String {
    let mut out = String::from("#usda 1.0\n");

    let mut fields = Vec::new();
    let mut custom = Vec::new();
    for (key, value) in layer.metadata_entries() {
        match layer_field_type(key) {
            Some(ty) if value.fits(ty) => fields.push(format!("{key} = {}", format_value(value))),
            _ => custom.push(format!("{} {key} = {}", value.kind_name(), format_value(value))),
        }
    }

    if !fields.is_empty() || !custom.is_empty() {
        out.push_str("(\n");
        for line in fields {
            let _ = writeln!(out, "{INDENT}{line}");
        }
        if !custom.is_empty() {
            let _ = writeln!(out, "{INDENT}customLayerData = {{");
            for line in custom {
                let _ = writeln!(out, "{INDENT}{INDENT}{line}");
            }
            let _ = writeln!(out, "{INDENT}}}");
        }
        out.push_str(")\n");
    }

    let root = Path::abs_root();
    for name in layer.root_prim_names() {
        if let Ok(path) = root.append_child(name) {
            out.push('\n');
            write_prim(&mut out, layer, &path, 0);
        }
    }

    out
}

fn write_prim(out: &mut String, layer: &Layer, path: &Path, depth: usize) {
    let Some(spec) = layer.spec(path) else {
        return;
    };
    let pad = INDENT.repeat(depth);

    let _ = write!(out, "{pad}{}", spec.specifier.keyword());
    if let Some(type_name) = &spec.type_name {
        let _ = write!(out, " {type_name}");
    }
    let _ = write!(out, " {}", quote(path.name()));

    let metadata = prim_metadata_lines(spec);
    if metadata.is_empty() {
        out.push('\n');
    } else {
        out.push_str(" (\n");
        for line in metadata {
            let _ = writeln!(out, "{pad}{INDENT}{line}");
        }
        let _ = writeln!(out, "{pad})");
    }
    let _ = writeln!(out, "{pad}{{");

    for attr in &spec.attributes {
        write_attribute(out, attr, &pad);
    }

    for (i, child) in spec.children.iter().enumerate() {
        if let Ok(child_path) = path.append_child(child) {
            if i > 0 || !spec.attributes.is_empty() {
                out.push('\n');
            }
            write_prim(out, layer, &child_path, depth + 1);
        }
    }

    let _ = writeln!(out, "{pad}}}");
}

fn prim_metadata_lines(spec: &PrimSpec) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(active) = spec.active {
        lines.push(format!("active = {active}"));
    }

    if !spec.asset_info.is_empty() {
        lines.push("assetInfo = {".to_string());
        for (key, value) in &spec.asset_info {
            lines.push(format!(
                "{INDENT}{} {key} = {}",
                value.kind_name(),
                format_value(value)
            ));
        }
        lines.push("}".to_string());
    }

    if let Some(instanceable) = spec.instanceable {
        lines.push(format!("instanceable = {instanceable}"));
    }

    if let Some(kind) = &spec.kind {
        lines.push(format!("kind = {}", quote(kind)));
    }

    match spec.references.as_slice() {
        [] => {}
        [single] => lines.push(format!("references = <{single}>")),
        many => {
            let targets: Vec<String> = many.iter().map(|p| format!("<{p}>")).collect();
            lines.push(format!("references = [{}]", targets.join(", ")));
        }
    }

    lines
}

fn write_attribute(out: &mut String, attr: &AttributeSpec, pad: &str) {
    let uniform = if attr.uniform { "uniform " } else { "" };
    let decl = format!("{pad}{INDENT}{uniform}{} {}", attr.value_type, attr.name);

    match (&attr.default, attr.connections.is_empty()) {
        (Some(value), _) => {
            let _ = writeln!(out, "{decl} = {}", format_value(value));
        }
        (None, true) => {
            let _ = writeln!(out, "{decl}");
        }
        (None, false) => {}
    }

    match attr.connections.as_slice() {
        [] => {}
        [single] => {
            let _ = writeln!(out, "{decl}.connect = <{single}>");
        }
        many => {
            let targets: Vec<String> = many.iter().map(|p| format!("<{p}>")).collect();
            let _ = writeln!(out, "{decl}.connect = [{}]", targets.join(", "));
        }
    }
}

/// USDA literal for a value.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Float2(v) => format!("({}, {})", v.x, v.y),
        Value::Float3(v) => format!("({}, {}, {})", v.x, v.y, v.z),
        Value::Token(s) | Value::String(s) => quote(s),
        Value::Asset(s) => format!("@{s}@"),
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
