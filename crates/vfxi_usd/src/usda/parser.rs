//! USDA (ASCII) file parser.
//!
//! Line-by-line parsing of USDA text into a [`Layer`]. The parser reads
//! everything the writer emits and skips, with a warning, constructs the
//! layer model does not hold (array attributes, relationships, time samples,
//! unknown value types).
//!
//! # Supported Syntax
//!
//! - `#usda 1.0` header and a `( ... )` layer metadata block; typed
//!   `customLayerData` entries become layer metadata
//! - `def|over|class [Type] "Name" ( metadata ) { ... }`
//! - prim metadata: `kind`, `active`, `instanceable`, `assetInfo = { ... }`,
//!   internal `references = </Path>` / `[</A>, </B>]`
//! - `[uniform] type name [= value]`
//! - `type name.connect = </Prim.property>` / `[<...>, <...>]`

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::layer::{AttributeSpec, Layer, PrimSpec, Specifier};
use crate::path::Path;
use crate::value::{Value, ValueType};

use super::layer_field_type;

/// Errors that can occur during USDA parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing '#usda 1.0' header")]
    MissingHeader,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid number format at line {line}: {text}")]
    InvalidNumber { line: usize, text: String },

    #[error("Unclosed block starting at line {0}")]
    UnclosedBlock(usize),

    #[error("Unsupported at line {line}: {feature}")]
    Unsupported { line: usize, feature: String },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// USDA file parser.
pub struct UsdaParser {
    lines: VecDeque<(usize, String)>,
    current_line: usize,
}

impl UsdaParser {
    /// Create a new parser from file contents.
    pub fn new(content: &str) -> Self {
        let lines: VecDeque<_> = content
            .lines()
            .enumerate()
            .map(|(i, s)| (i + 1, s.to_string()))
            .collect();

        Self {
            lines,
            current_line: 0,
        }
    }

    /// Parse the USDA content into a layer.
    pub fn parse(&mut self) -> ParseResult<Layer> {
        let mut layer = Layer::anonymous();

        self.parse_header()?;
        self.parse_layer_metadata(&mut layer)?;

        let root = Path::abs_root();
        while let Some((line_num, line)) = self.next_line() {
            let trimmed = line.trim();
            if is_prim_header(trimmed) {
                self.parse_prim(&mut layer, &root, trimmed, line_num)?;
            } else {
                return Err(self.error(format!("Expected prim definition, got: {trimmed}")));
            }
        }

        Ok(layer)
    }

    /// Next non-empty, non-comment line.
    fn next_line(&mut self) -> Option<(usize, String)> {
        while let Some((num, line)) = self.lines.pop_front() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.current_line = num;
            return Some((num, line));
        }
        None
    }

    fn push_back(&mut self, line_num: usize, line: String) {
        self.lines.push_front((line_num, line));
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Parse {
            line: self.current_line,
            message: message.into(),
        }
    }

    fn parse_header(&mut self) -> ParseResult<()> {
        let (num, line) = loop {
            match self.lines.pop_front() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some(entry) => break entry,
                None => return Err(ParseError::MissingHeader),
            }
        };
        self.current_line = num;

        let version = line
            .trim()
            .strip_prefix("#usda")
            .ok_or(ParseError::MissingHeader)?
            .trim();
        if version != "1.0" {
            return Err(self.error(format!("Unsupported usda version {version:?}")));
        }
        Ok(())
    }

    /// Parse the optional `( ... )` block after the header.
    fn parse_layer_metadata(&mut self, layer: &mut Layer) -> ParseResult<()> {
        let Some((num, line)) = self.next_line() else {
            return Ok(());
        };
        let trimmed = line.trim();
        if !trimmed.starts_with('(') {
            self.push_back(num, line);
            return Ok(());
        }

        let entries = self.collect_paren_block(trimmed, num)?;
        let mut iter = entries.into_iter();
        while let Some((line_num, entry)) = iter.next() {
            self.current_line = line_num;
            if entry.starts_with('"') {
                layer.set_metadata("doc", Value::String(unquote(&entry, line_num)?));
                continue;
            }
            let Some((key, value)) = entry.split_once('=') else {
                log::warn!("Skipping layer metadata at line {line_num}: {entry}");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "customLayerData" {
                let mut entries = take_dictionary(&mut iter, value).into_iter();
                while let Some((num, entry)) = entries.next() {
                    self.current_line = num;
                    let ty = entry.split_whitespace().next().unwrap_or("");
                    if ValueType::from_keyword(ty).is_none() {
                        log::warn!("Skipping customLayerData entry at line {num}: {entry}");
                        skip_entry_lines(&mut entries, &entry);
                        continue;
                    }
                    let (ty, key, text) = self.parse_typed_entry(&entry)?;
                    if let Some(value) = parse_value(ty, text, num)? {
                        layer.set_metadata(key, value);
                    }
                }
            } else if let Some(ty) = layer_field_type(key) {
                if let Some(value) = parse_value(ty, value, line_num)? {
                    layer.set_metadata(key, value);
                }
            } else if value.starts_with('"') || value.starts_with('\'') {
                layer.set_metadata(key, Value::String(unquote(value, line_num)?));
            } else if let Ok(number) = value.parse::<f64>() {
                layer.set_metadata(key, Value::Double(number));
            } else {
                log::warn!("Skipping layer metadata {key} at line {line_num}");
                skip_entry_lines(&mut iter, value);
            }
        }
        Ok(())
    }

    /// Collect the lines of a parenthesized block whose `(` opens `first`.
    ///
    /// Returns the inner entries and leaves any text after the closing `)`
    /// (such as `{`) as a pushed-back line.
    fn collect_paren_block(&mut self, first: &str, start_line: usize) -> ParseResult<Vec<(usize, String)>> {
        let mut entries = Vec::new();
        let after_open = &first[first.find('(').map(|i| i + 1).unwrap_or(0)..];

        if let Some(close) = find_matching_close(after_open, 1) {
            let inner = after_open[..close].trim();
            if !inner.is_empty() {
                entries.push((start_line, inner.to_string()));
            }
            let rest = after_open[close + 1..].trim();
            if !rest.is_empty() {
                self.push_back(start_line, rest.to_string());
            }
            return Ok(entries);
        }
        let inner = after_open.trim();
        if !inner.is_empty() {
            entries.push((start_line, inner.to_string()));
        }

        let mut depth = 1i32;
        loop {
            let (num, line) = self
                .lines
                .pop_front()
                .ok_or(ParseError::UnclosedBlock(start_line))?;
            self.current_line = num;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(close) = find_matching_close(trimmed, depth) {
                let inner = trimmed[..close].trim();
                if !inner.is_empty() {
                    entries.push((num, inner.to_string()));
                }
                let rest = trimmed[close + 1..].trim();
                if !rest.is_empty() {
                    self.push_back(num, rest.to_string());
                }
                return Ok(entries);
            }
            depth += paren_delta(trimmed);
            entries.push((num, trimmed.to_string()));
        }
    }

    /// Parse a `def`/`over`/`class` block (header already read).
    fn parse_prim(&mut self, layer: &mut Layer, parent: &Path, header: &str, start_line: usize) -> ParseResult<()> {
        let (specifier, type_name, name, rest) = self.parse_prim_header(header)?;
        let path = parent
            .append_child(&name)
            .map_err(|e| self.error(e.to_string()))?;

        let mut spec = PrimSpec::new(specifier, type_name.as_deref());

        let mut rest = rest.trim().to_string();
        if rest.starts_with('(') {
            let entries = self.collect_paren_block(&rest, start_line)?;
            self.apply_prim_metadata(&mut spec, entries)?;
            rest = match self.lines.front() {
                Some((num, line)) if *num == self.current_line || line.trim().starts_with('{') => {
                    let line = line.trim().to_string();
                    self.lines.pop_front();
                    line
                }
                _ => String::new(),
            };
        }

        let created = layer
            .create_spec(&path, spec.clone())
            .map_err(|e| self.error(e.to_string()))?;
        *created = PrimSpec {
            children: std::mem::take(&mut created.children),
            ..spec
        };

        // Opening brace: inline, inline empty body, or on a following line.
        if rest.starts_with('{') {
            if rest[1..].trim() == "}" {
                return Ok(());
            }
            if !rest[1..].trim().is_empty() {
                return Err(self.error("Inline prim bodies are not supported"));
            }
        } else if rest.is_empty() {
            self.expect_opening_brace(start_line)?;
        } else {
            return Err(self.error(format!("Unexpected text after prim header: {rest}")));
        }

        self.parse_prim_body(layer, &path, start_line)
    }

    /// Split `def Type "Name" rest` into its parts.
    fn parse_prim_header<'l>(&self, line: &'l str) -> ParseResult<(Specifier, Option<String>, String, &'l str)> {
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let specifier = Specifier::from_keyword(keyword)
            .ok_or_else(|| self.error(format!("Unknown specifier {keyword:?}")))?;

        let rest = rest.trim_start();
        let (type_name, rest) = if rest.starts_with('"') {
            (None, rest)
        } else {
            let (ty, after) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            (Some(ty.to_string()), after.trim_start())
        };

        let after_quote = rest
            .strip_prefix('"')
            .ok_or_else(|| self.error("Expected quoted prim name"))?;
        let end = after_quote
            .find('"')
            .ok_or_else(|| self.error("Unterminated prim name"))?;

        Ok((
            specifier,
            type_name,
            after_quote[..end].to_string(),
            &after_quote[end + 1..],
        ))
    }

    fn apply_prim_metadata(&mut self, spec: &mut PrimSpec, entries: Vec<(usize, String)>) -> ParseResult<()> {
        let mut iter = entries.into_iter();
        while let Some((line_num, entry)) = iter.next() {
            self.current_line = line_num;
            if entry.starts_with('"') {
                // Documentation string
                continue;
            }
            let Some((key, value)) = entry.split_once('=') else {
                log::warn!("Skipping prim metadata at line {line_num}: {entry}");
                continue;
            };
            let value = value.trim();
            let mut words: Vec<&str> = key.split_whitespace().collect();
            let list_op = if words.len() > 1 { Some(words.remove(0)) } else { None };
            let key = words.first().copied().unwrap_or("");

            match key {
                "kind" => spec.kind = Some(unquote(value, line_num)?),
                "active" => spec.active = Some(self.parse_bool(value)?),
                "instanceable" => spec.instanceable = Some(self.parse_bool(value)?),
                "references" => {
                    if list_op == Some("delete") {
                        log::warn!("Ignoring deleted references at line {line_num}");
                        continue;
                    }
                    if value.contains('@') {
                        return Err(ParseError::Unsupported {
                            line: line_num,
                            feature: "external references".to_string(),
                        });
                    }
                    for target in self.parse_path_list(value)? {
                        if !spec.references.contains(&target) {
                            spec.references.push(target);
                        }
                    }
                }
                "assetInfo" => {
                    for (num, line) in take_dictionary(&mut iter, value) {
                        self.current_line = num;
                        let (ty, key, text) = self.parse_typed_entry(&line)?;
                        if let Some(value) = parse_value(ty, text, num)? {
                            spec.asset_info.insert(key, value);
                        }
                    }
                }
                _ => {
                    log::warn!("Skipping prim metadata {key} at line {line_num}");
                    skip_entry_lines(&mut iter, value);
                }
            }
        }
        Ok(())
    }

    /// `type key = value` inside a dictionary.
    fn parse_typed_entry<'l>(&self, line: &'l str) -> ParseResult<(ValueType, String, &'l str)> {
        let (decl, value) = line
            .split_once('=')
            .ok_or_else(|| self.error(format!("Expected '=' in: {line}")))?;
        let mut words = decl.split_whitespace();
        let ty = words.next().unwrap_or("");
        let key = words.next().unwrap_or("");
        let ty = ValueType::from_keyword(ty)
            .ok_or_else(|| self.error(format!("Unknown dictionary value type {ty:?}")))?;
        Ok((ty, unquote_key(key), value.trim()))
    }

    /// Expect and consume an opening brace.
    fn expect_opening_brace(&mut self, start_line: usize) -> ParseResult<()> {
        match self.next_line() {
            Some((_, line)) if line.trim() == "{" => Ok(()),
            Some(_) => Err(ParseError::Parse {
                line: start_line,
                message: "Expected opening brace".to_string(),
            }),
            None => Err(ParseError::UnclosedBlock(start_line)),
        }
    }

    /// Parse properties and child prims until the closing brace.
    fn parse_prim_body(&mut self, layer: &mut Layer, path: &Path, start_line: usize) -> ParseResult<()> {
        loop {
            let (line_num, line) = self
                .next_line()
                .ok_or(ParseError::UnclosedBlock(start_line))?;
            let trimmed = line.trim();

            if trimmed == "}" {
                return Ok(());
            }

            if is_prim_header(trimmed) {
                self.parse_prim(layer, path, trimmed, line_num)?;
                continue;
            }

            if is_relationship(trimmed) {
                log::warn!("Skipping relationship at line {line_num}");
                self.skip_balanced(trimmed)?;
                continue;
            }

            if let Some(attr) = self.parse_property(trimmed)? {
                let spec = layer
                    .spec_mut(path)
                    .ok_or_else(|| self.error(format!("Missing spec for {path}")))?;
                merge_attribute(spec, attr);
            }
        }
    }

    /// Parse one attribute line. Unsupported attributes yield `None`.
    fn parse_property(&mut self, line: &str) -> ParseResult<Option<AttributeSpec>> {
        let (decl, value_text) = match line.split_once('=') {
            Some((decl, value)) => (decl.trim(), Some(value.trim())),
            None => (line, None),
        };

        let mut uniform = false;
        let mut words = Vec::new();
        for word in decl.split_whitespace() {
            match word {
                "uniform" => uniform = true,
                "custom" | "varying" => {}
                _ => words.push(word),
            }
        }
        let [type_word, name] = words.as_slice() else {
            return Err(self.error(format!("Malformed property: {line}")));
        };

        let skip = |parser: &mut Self, reason: &str| -> ParseResult<Option<AttributeSpec>> {
            log::warn!("Skipping {reason} at line {}: {name}", parser.current_line);
            if let Some(value) = value_text {
                parser.skip_balanced(value)?;
            }
            Ok(None)
        };

        if type_word.ends_with("[]") {
            return skip(self, "array attribute");
        }
        let Some(value_type) = ValueType::from_keyword(type_word) else {
            return skip(self, "attribute of unsupported type");
        };
        if name.ends_with(".timeSamples") {
            return skip(self, "time samples");
        }

        let (attr_name, is_connection) = match name.strip_suffix(".connect") {
            Some(base) => (base, true),
            None => (*name, false),
        };
        if !crate::path::is_property_name(attr_name) {
            return Err(self.error(format!("Invalid property name {attr_name:?}")));
        }

        let mut attr = AttributeSpec::new(attr_name, value_type);
        attr.uniform = uniform;

        if let Some(value) = value_text {
            let end = value_extent(value);
            let literal = &value[..end];
            let trailing = value[end..].trim();

            if is_connection {
                attr.connections = self.parse_path_list(literal)?;
            } else {
                attr.default = parse_value(value_type, literal, self.current_line)?;
            }

            if trailing.starts_with('(') {
                // Attribute metadata is not kept.
                self.skip_balanced(trailing)?;
            }
        }

        Ok(Some(attr))
    }

    /// `<path>` or `[<a>, <b>]`.
    fn parse_path_list(&self, text: &str) -> ParseResult<Vec<Path>> {
        let mut paths = Vec::new();
        let mut rest = text;
        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let end = after
                .find('>')
                .ok_or_else(|| self.error(format!("Unterminated path in: {text}")))?;
            let path = Path::parse(&after[..end]).map_err(|e| self.error(e.to_string()))?;
            paths.push(path);
            rest = &after[end + 1..];
        }
        if paths.is_empty() && text.trim() != "None" && text.trim() != "[]" {
            return Err(self.error(format!("Expected path list, got: {text}")));
        }
        Ok(paths)
    }

    fn parse_bool(&self, text: &str) -> ParseResult<bool> {
        parse_bool(text).ok_or_else(|| self.error(format!("Expected bool, got {text:?}")))
    }

    /// Consume lines until brackets opened in `first` are balanced.
    fn skip_balanced(&mut self, first: &str) -> ParseResult<()> {
        let start_line = self.current_line;
        let mut depth = bracket_delta(first);
        while depth > 0 {
            let (num, line) = self
                .lines
                .pop_front()
                .ok_or(ParseError::UnclosedBlock(start_line))?;
            self.current_line = num;
            depth += bracket_delta(&line);
        }
        Ok(())
    }
}

/// Parse a USDA string into a layer.
pub fn parse_usda(content: &str) -> ParseResult<Layer> {
    let mut parser = UsdaParser::new(content);
    parser.parse()
}

/// True if the property declared on `line` is a relationship.
fn is_relationship(line: &str) -> bool {
    let decl = line.split_once('=').map_or(line, |(decl, _)| decl);
    decl.split_whitespace()
        .find(|word| !matches!(*word, "custom" | "uniform" | "varying" | "prepend" | "append" | "delete"))
        == Some("rel")
}

fn is_prim_header(line: &str) -> bool {
    ["def ", "over ", "class "]
        .iter()
        .any(|kw| line.starts_with(kw))
}

/// Later declarations of the same attribute (value line then connect line)
/// fill in the earlier one.
fn merge_attribute(spec: &mut PrimSpec, attr: AttributeSpec) {
    match spec.attribute_mut(&attr.name) {
        Some(existing) => {
            existing.uniform |= attr.uniform;
            if attr.default.is_some() {
                existing.default = attr.default;
            }
            if !attr.connections.is_empty() {
                existing.connections = attr.connections;
            }
        }
        None => spec.attributes.push(attr),
    }
}

/// Parse a literal of the declared type. `None` is a blocked value.
fn parse_value(ty: ValueType, text: &str, line: usize) -> ParseResult<Option<Value>> {
    let text = text.trim();
    if text == "None" {
        return Ok(None);
    }
    let number_error = || ParseError::InvalidNumber {
        line,
        text: text.to_string(),
    };

    let value = match ty {
        ValueType::Bool => Value::Bool(parse_bool(text).ok_or_else(number_error)?),
        ValueType::Int => Value::Int(text.parse().map_err(|_| number_error())?),
        ValueType::Float => Value::Float(text.parse().map_err(|_| number_error())?),
        ValueType::Double => Value::Double(text.parse().map_err(|_| number_error())?),
        ValueType::Float2 => {
            let c = parse_tuple(text, 2, line)?;
            Value::Float2(Vec2::new(c[0], c[1]))
        }
        ValueType::Float3 | ValueType::Color3f | ValueType::Normal3f => {
            let c = parse_tuple(text, 3, line)?;
            Value::Float3(Vec3::new(c[0], c[1], c[2]))
        }
        ValueType::Token => Value::Token(unquote(text, line)?),
        ValueType::String => Value::String(unquote(text, line)?),
        ValueType::Asset => {
            let inner = text
                .strip_prefix('@')
                .and_then(|t| t.strip_suffix('@'))
                .ok_or_else(|| ParseError::Parse {
                    line,
                    message: format!("Expected @asset@, got {text}"),
                })?;
            Value::Asset(inner.to_string())
        }
    };
    Ok(Some(value))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse `(a, b, ...)` with exactly `count` float components.
fn parse_tuple(text: &str, count: usize, line: usize) -> ParseResult<Vec<f32>> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| ParseError::Parse {
            line,
            message: format!("Expected tuple, got {text}"),
        })?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != count {
        return Err(ParseError::Parse {
            line,
            message: format!("Expected {count} components, got {}", parts.len()),
        });
    }

    parts
        .iter()
        .map(|p| {
            p.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
                line,
                text: p.to_string(),
            })
        })
        .collect()
}

/// Strip quotes and resolve escapes.
fn unquote(text: &str, line: usize) -> ParseResult<String> {
    let text = text.trim();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'');
    let (Some(quote), true) = (quote, text.len() >= 2) else {
        return Err(ParseError::Parse {
            line,
            message: format!("Expected quoted string, got {text}"),
        });
    };
    let inner = text
        .strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .ok_or_else(|| ParseError::Parse {
            line,
            message: format!("Unterminated string {text}"),
        })?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Dictionary keys may be bare or quoted.
fn unquote_key(key: &str) -> String {
    key.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Length of the leading value literal in `text`.
fn value_extent(text: &str) -> usize {
    let mut chars = text.char_indices();
    let Some((_, first)) = chars.next() else {
        return 0;
    };
    match first {
        '"' | '\'' | '@' => {
            let mut escaped = false;
            for (i, c) in chars {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == first {
                    return i + 1;
                }
            }
            text.len()
        }
        '(' | '[' | '<' => {
            let mut depth = 0i32;
            let mut in_string = false;
            for (i, c) in text.char_indices() {
                match c {
                    '"' => in_string = !in_string,
                    '(' | '[' | '<' if !in_string => depth += 1,
                    ')' | ']' | '>' if !in_string => {
                        depth -= 1;
                        if depth == 0 {
                            return i + 1;
                        }
                    }
                    _ => {}
                }
            }
            text.len()
        }
        _ => text.find(char::is_whitespace).unwrap_or(text.len()),
    }
}

/// Net change in `(`/`)` nesting outside strings.
fn paren_delta(line: &str) -> i32 {
    delta(line, &['('], &[')'])
}

/// Net change in any bracket nesting outside strings.
fn bracket_delta(line: &str) -> i32 {
    delta(line, &['(', '[', '{'], &[')', ']', '}'])
}

fn delta(line: &str, open: &[char], close: &[char]) -> i32 {
    let mut depth = 0;
    let mut in_string = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if in_string && c == '\\' {
            chars.next();
        } else if c == '"' {
            in_string = !in_string;
        } else if !in_string && open.contains(&c) {
            depth += 1;
        } else if !in_string && close.contains(&c) {
            depth -= 1;
        }
    }
    depth
}

/// Byte index of the `)` that brings `depth` open parens to zero.
fn find_matching_close(text: &str, mut depth: i32) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Lines of a `{ ... }` dictionary opened by `value`, consumed from `iter`.
fn take_dictionary<I>(iter: &mut I, value: &str) -> Vec<(usize, String)>
where
    I: Iterator<Item = (usize, String)>,
{
    let mut lines = Vec::new();
    let opened = value.trim_start_matches('{').trim();
    if value.trim() == "{}" {
        return lines;
    }
    if !opened.is_empty() && opened != "}" {
        lines.push((0, opened.trim_end_matches('}').trim().to_string()));
        if opened.ends_with('}') {
            return lines;
        }
    }
    let mut depth = 1;
    for (num, line) in iter.by_ref() {
        depth += delta(&line, &['{'], &['}']);
        if depth <= 0 {
            break;
        }
        lines.push((num, line));
    }
    lines
}

/// Skip continuation lines of a metadata entry whose value opened brackets.
fn skip_entry_lines<I>(iter: &mut I, value: &str)
where
    I: Iterator<Item = (usize, String)>,
{
    let mut depth = bracket_delta(value);
    while depth > 0 {
        match iter.next() {
            Some((_, line)) => depth += bracket_delta(&line),
            None => break,
        }
    }
}
