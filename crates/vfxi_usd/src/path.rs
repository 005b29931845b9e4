//! Scene description paths.
//!
//! A [`Path`] addresses either a prim (`/World/Geo`) or a property on a prim
//! (`/World/Looks/Mat/Shader.inputs:roughness`). Only absolute paths are
//! supported; `/` is the pseudo-root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building or parsing paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid path {path:?}: {reason}")]
    Invalid { path: String, reason: &'static str },

    #[error("Invalid prim name {0:?}")]
    InvalidPrimName(String),

    #[error("Invalid property name {0:?}")]
    InvalidPropertyName(String),

    #[error("Cannot append to property path {0}")]
    NotAPrimPath(String),
}

/// An absolute prim or property path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(String);

impl Path {
    /// The pseudo-root path `/`.
    pub fn abs_root() -> Self {
        Path("/".to_string())
    }

    /// Parse and validate a path string.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let invalid = |reason| PathError::Invalid {
            path: text.to_string(),
            reason,
        };

        if text == "/" {
            return Ok(Self::abs_root());
        }
        let body = text.strip_prefix('/').ok_or_else(|| invalid("must be absolute"))?;
        if body.is_empty() {
            return Err(invalid("empty"));
        }

        let (prim_part, property) = match body.split_once('.') {
            Some((prim, prop)) => (prim, Some(prop)),
            None => (body, None),
        };

        if prim_part.is_empty() {
            return Err(invalid("property on pseudo-root"));
        }
        for component in prim_part.split('/') {
            if !is_identifier(component) {
                return Err(invalid("bad prim name component"));
            }
        }
        if let Some(prop) = property {
            if !is_property_name(prop) {
                return Err(invalid("bad property name"));
            }
        }

        Ok(Path(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn is_property_path(&self) -> bool {
        self.0.contains('.')
    }

    pub fn is_prim_path(&self) -> bool {
        !self.is_root() && !self.is_property_path()
    }

    /// The final element: prim name or property name. Empty for `/`.
    pub fn name(&self) -> &str {
        if let Some((_, prop)) = self.0.split_once('.') {
            return prop;
        }
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The owning prim path of a property path, or `self` for prim paths.
    pub fn prim_path(&self) -> Path {
        match self.0.split_once('.') {
            Some((prim, _)) => Path(prim.to_string()),
            None => self.clone(),
        }
    }

    /// The parent path. Properties report their prim; `/` has no parent.
    pub fn parent(&self) -> Option<Path> {
        if self.is_root() {
            return None;
        }
        if self.is_property_path() {
            return Some(self.prim_path());
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::abs_root()),
            Some(idx) => Some(Path(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Prim name components from the root down.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        let prim = match self.0.split_once('.') {
            Some((prim, _)) => prim,
            None => self.0.as_str(),
        };
        prim.split('/').filter(|c| !c.is_empty())
    }

    /// Number of prim components (`/` is 0, `/A/B` is 2).
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    pub fn append_child(&self, name: &str) -> Result<Path, PathError> {
        if self.is_property_path() {
            return Err(PathError::NotAPrimPath(self.0.clone()));
        }
        if !is_identifier(name) {
            return Err(PathError::InvalidPrimName(name.to_string()));
        }
        if self.is_root() {
            Ok(Path(format!("/{name}")))
        } else {
            Ok(Path(format!("{}/{name}", self.0)))
        }
    }

    pub fn append_property(&self, name: &str) -> Result<Path, PathError> {
        if !self.is_prim_path() {
            return Err(PathError::NotAPrimPath(self.0.clone()));
        }
        if !is_property_name(name) {
            return Err(PathError::InvalidPropertyName(name.to_string()));
        }
        Ok(Path(format!("{}.{name}", self.0)))
    }

    /// True if `prefix` is this path or one of its prim ancestors.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        if prefix.is_root() {
            return true;
        }
        if self.0 == prefix.0 {
            return true;
        }
        match self.0.strip_prefix(prefix.0.as_str()) {
            Some(rest) => rest.starts_with('/') || rest.starts_with('.'),
            None => false,
        }
    }

    /// Re-root this path from `old` to `new`. `None` if `old` is not a prefix.
    pub fn replace_prefix(&self, old: &Path, new: &Path) -> Option<Path> {
        if !self.has_prefix(old) {
            return None;
        }
        if old.is_root() {
            return Some(if new.is_root() {
                self.clone()
            } else if self.is_root() {
                new.clone()
            } else {
                Path(format!("{}{}", new.0, self.0))
            });
        }
        let rest = &self.0[old.0.len()..];
        if new.is_root() {
            if rest.is_empty() {
                return Some(Self::abs_root());
            }
            if rest.starts_with('.') {
                return None;
            }
            return Some(Path(rest.to_string()));
        }
        Some(Path(format!("{}{rest}", new.0)))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Path::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.0
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Namespaced identifier such as `outputs:mtlx:surface`.
pub fn is_property_name(name: &str) -> bool {
    !name.is_empty() && name.split(':').all(is_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prim_and_property_paths() {
        let prim = Path::parse("/World/Geo").unwrap();
        assert!(prim.is_prim_path());
        assert_eq!(prim.name(), "Geo");
        assert_eq!(prim.depth(), 2);

        let prop = Path::parse("/World/Mat/Shader.outputs:mtlx:surface").unwrap();
        assert!(prop.is_property_path());
        assert_eq!(prop.name(), "outputs:mtlx:surface");
        assert_eq!(prop.prim_path().as_str(), "/World/Mat/Shader");
        assert_eq!(prop.parent().unwrap().as_str(), "/World/Mat/Shader");
    }

    #[test]
    fn test_reject_malformed_paths() {
        assert!(Path::parse("World").is_err());
        assert!(Path::parse("/World//Geo").is_err());
        assert!(Path::parse("/1abc").is_err());
        assert!(Path::parse("/.inputs:x").is_err());
        assert!(Path::parse("/A.inputs::x").is_err());
        assert!(Path::parse("").is_err());
    }

    #[test]
    fn test_append_and_parent() {
        let root = Path::abs_root();
        let a = root.append_child("A").unwrap();
        let b = a.append_child("B").unwrap();
        assert_eq!(b.as_str(), "/A/B");
        assert_eq!(b.parent().unwrap(), a);
        assert_eq!(a.parent().unwrap(), root);
        assert!(root.parent().is_none());

        let prop = b.append_property("inputs:file").unwrap();
        assert_eq!(prop.as_str(), "/A/B.inputs:file");
        assert!(prop.append_child("C").is_err());
        assert!(root.append_property("x").is_err());
        assert!(a.append_child("bad name").is_err());
    }

    #[test]
    fn test_prefix_handling() {
        let proto = Path::parse("/Proto").unwrap();
        let inst = Path::parse("/World/Inst").unwrap();
        let child = Path::parse("/Proto/Geo/Mesh").unwrap();

        assert!(child.has_prefix(&proto));
        assert!(!Path::parse("/ProtoX").unwrap().has_prefix(&proto));
        assert_eq!(
            child.replace_prefix(&proto, &inst).unwrap().as_str(),
            "/World/Inst/Geo/Mesh"
        );
        assert_eq!(proto.replace_prefix(&proto, &inst).unwrap(), inst);
        assert!(inst.replace_prefix(&proto, &inst).is_none());
    }
}
