//! Layer storage: prim specs keyed by path plus layer metadata.
//!
//! A [`Layer`] holds exactly what is authored; composition (internal
//! references, instancing) happens in [`crate::stage::Stage`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path as FsPath, PathBuf};

use crate::error::{StageError, StageResult};
use crate::path::Path;
use crate::usda;
use crate::value::{Value, ValueType};

/// How a prim spec contributes to the composed prim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Specifier {
    /// Concrete definition.
    #[default]
    Def,
    /// Opinions only; does not define the prim by itself.
    Over,
    /// Abstract definition, skipped by the default predicate.
    Class,
}

impl Specifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Specifier::Def => "def",
            Specifier::Over => "over",
            Specifier::Class => "class",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "def" => Some(Specifier::Def),
            "over" => Some(Specifier::Over),
            "class" => Some(Specifier::Class),
            _ => None,
        }
    }
}

/// An authored attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSpec {
    /// Namespaced property name, e.g. `inputs:diffuseColor`
    pub name: String,

    /// Declared type
    pub value_type: ValueType,

    /// `uniform` variability (e.g. `info:id`)
    pub uniform: bool,

    /// Default value, if authored
    pub default: Option<Value>,

    /// Connection targets (property paths)
    pub connections: Vec<Path>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            uniform: false,
            default: None,
            connections: Vec::new(),
        }
    }
}

/// An authored prim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimSpec {
    pub specifier: Specifier,

    /// Schema type name (`Xform`, `Shader`, ...). `None` for untyped prims.
    pub type_name: Option<String>,

    /// `kind` metadata (`component`, `assembly`, ...)
    pub kind: Option<String>,

    /// `active` metadata
    pub active: Option<bool>,

    /// `instanceable` metadata
    pub instanceable: Option<bool>,

    /// Internal references to other prims in the same layer
    pub references: Vec<Path>,

    /// `assetInfo` dictionary
    pub asset_info: BTreeMap<String, Value>,

    /// Attributes in authoring order
    pub attributes: Vec<AttributeSpec>,

    /// Child prim names in authoring order
    pub children: Vec<String>,
}

impl PrimSpec {
    pub fn new(specifier: Specifier, type_name: Option<&str>) -> Self {
        Self {
            specifier,
            type_name: type_name.filter(|t| !t.is_empty()).map(str::to_string),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeSpec> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }
}

/// A single USDA layer.
#[derive(Clone, Debug)]
pub struct Layer {
    identifier: Option<PathBuf>,
    metadata: BTreeMap<String, Value>,
    specs: HashMap<Path, PrimSpec>,
}

impl Default for Layer {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Layer {
    /// An in-memory layer with no file behind it.
    pub fn anonymous() -> Self {
        let mut specs = HashMap::new();
        specs.insert(Path::abs_root(), PrimSpec::new(Specifier::Def, None));
        Self {
            identifier: None,
            metadata: BTreeMap::new(),
            specs,
        }
    }

    /// Create an empty layer and write it to `path` immediately.
    pub fn create_new<P: AsRef<FsPath>>(path: P) -> StageResult<Self> {
        let mut layer = Self::anonymous();
        layer.identifier = Some(path.as_ref().to_path_buf());
        layer.save()?;
        Ok(layer)
    }

    /// Read a `.usda` layer from disk.
    pub fn open<P: AsRef<FsPath>>(path: P) -> StageResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut layer = usda::parse_usda(&content)?;
        layer.identifier = Some(path.to_path_buf());
        log::debug!("Opened layer {} ({} prims)", path.display(), layer.prim_count());
        Ok(layer)
    }

    /// Parse an anonymous layer from USDA text.
    pub fn from_usda(content: &str) -> StageResult<Self> {
        Ok(usda::parse_usda(content)?)
    }

    pub fn identifier(&self) -> Option<&FsPath> {
        self.identifier.as_deref()
    }

    /// Serialize to USDA text.
    pub fn to_usda(&self) -> String {
        usda::write_usda(self)
    }

    /// Write the layer back to its identifier.
    pub fn save(&self) -> StageResult<()> {
        let path = self.identifier.as_ref().ok_or(StageError::AnonymousLayer)?;
        self.export(path)?;
        log::info!("Saved layer {}", path.display());
        Ok(())
    }

    /// Write the layer to an arbitrary file.
    pub fn export<P: AsRef<FsPath>>(&self, path: P) -> StageResult<()> {
        std::fs::write(path, self.to_usda())?;
        Ok(())
    }

    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn metadata_entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.metadata.iter()
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn spec(&self, path: &Path) -> Option<&PrimSpec> {
        self.specs.get(path)
    }

    pub fn spec_mut(&mut self, path: &Path) -> Option<&mut PrimSpec> {
        self.specs.get_mut(path)
    }

    pub fn has_spec(&self, path: &Path) -> bool {
        self.specs.contains_key(path)
    }

    /// Root prim names in authoring order.
    ///
    /// The pseudo-root spec is created with the layer and `remove_spec`
    /// only accepts prim paths, so it is always present.
    pub fn root_prim_names(&self) -> &[String] {
        self.specs
            .get(&Path::abs_root())
            .map(|root| root.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of prim specs, not counting the pseudo-root.
    pub fn prim_count(&self) -> usize {
        self.specs.len().saturating_sub(1)
    }

    /// Add a new spec under an existing parent spec.
    ///
    /// Returns the existing spec untouched if one is already present.
    pub fn create_spec(&mut self, path: &Path, spec: PrimSpec) -> StageResult<&mut PrimSpec> {
        if !path.is_prim_path() {
            return Err(StageError::InvalidPrimPath(path.clone()));
        }
        let parent = path
            .parent()
            .ok_or_else(|| StageError::InvalidPrimPath(path.clone()))?;

        if !self.specs.contains_key(path) {
            let parent_spec = self
                .specs
                .get_mut(&parent)
                .ok_or_else(|| StageError::NoParent(path.clone()))?;
            parent_spec.children.push(path.name().to_string());
            self.specs.insert(path.clone(), spec);
        }

        self.specs
            .get_mut(path)
            .ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }

    /// Remove a spec and all specs beneath it.
    pub fn remove_spec(&mut self, path: &Path) -> bool {
        if !path.is_prim_path() || !self.specs.contains_key(path) {
            return false;
        }
        if let Some(parent) = path.parent().and_then(|p| self.specs.get_mut(&p)) {
            parent.children.retain(|c| c != path.name());
        }
        self.specs.retain(|p, _| !p.has_prefix(path));
        true
    }

    /// All spec paths in namespace order (depth-first, authored child order).
    pub fn prim_paths(&self) -> Vec<Path> {
        let mut out = Vec::with_capacity(self.specs.len());
        let mut stack = vec![Path::abs_root()];
        while let Some(path) = stack.pop() {
            if let Some(spec) = self.specs.get(&path) {
                for child in spec.children.iter().rev() {
                    if let Ok(child_path) = path.append_child(child) {
                        stack.push(child_path);
                    }
                }
            }
            if !path.is_root() {
                out.push(path);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_create_spec_requires_parent() {
        let mut layer = Layer::anonymous();
        assert!(matches!(
            layer.create_spec(&p("/A/B"), PrimSpec::default()),
            Err(StageError::NoParent(_))
        ));
        layer.create_spec(&p("/A"), PrimSpec::new(Specifier::Def, Some("Xform"))).unwrap();
        layer.create_spec(&p("/A/B"), PrimSpec::default()).unwrap();
        assert_eq!(layer.prim_count(), 2);
        assert_eq!(layer.spec(&p("/A")).unwrap().children, vec!["B".to_string()]);
    }

    #[test]
    fn test_create_spec_is_idempotent() {
        let mut layer = Layer::anonymous();
        layer.create_spec(&p("/A"), PrimSpec::new(Specifier::Def, Some("Xform"))).unwrap();
        layer.create_spec(&p("/A"), PrimSpec::new(Specifier::Over, None)).unwrap();
        assert_eq!(layer.root_prim_names(), ["A".to_string()]);
        assert_eq!(layer.spec(&p("/A")).unwrap().specifier, Specifier::Def);
    }

    #[test]
    fn test_prim_paths_namespace_order() {
        let mut layer = Layer::anonymous();
        for path in ["/B", "/A", "/B/Z", "/B/Y", "/A/X"] {
            layer.create_spec(&p(path), PrimSpec::default()).unwrap();
        }
        let order: Vec<String> = layer.prim_paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(order, vec!["/B", "/B/Z", "/B/Y", "/A", "/A/X"]);
    }

    #[test]
    fn test_remove_spec_drops_subtree() {
        let mut layer = Layer::anonymous();
        for path in ["/A", "/A/B", "/A/B/C", "/AB"] {
            layer.create_spec(&p(path), PrimSpec::default()).unwrap();
        }
        assert!(layer.remove_spec(&p("/A/B")));
        assert!(!layer.has_spec(&p("/A/B/C")));
        assert!(layer.has_spec(&p("/AB")));
        assert!(layer.spec(&p("/A")).unwrap().children.is_empty());
    }

    #[test]
    fn test_pseudo_root_cannot_be_removed() {
        let mut layer = Layer::anonymous();
        layer.create_spec(&p("/A"), PrimSpec::default()).unwrap();

        assert!(!layer.remove_spec(&Path::abs_root()));
        assert_eq!(layer.root_prim_names(), ["A".to_string()]);
        assert!(layer.remove_spec(&p("/A")));
        assert!(layer.root_prim_names().is_empty());
        assert_eq!(layer.prim_count(), 0);
    }

    #[test]
    fn test_save_requires_identifier() {
        let layer = Layer::anonymous();
        assert!(matches!(layer.save(), Err(StageError::AnonymousLayer)));
    }

    #[test]
    fn test_create_save_open() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("layer.usda");

        let mut layer = Layer::create_new(&file).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "#usda 1.0\n");

        layer.set_metadata("upAxis", Value::Token("Y".into()));
        layer
            .create_spec(&p("/World"), PrimSpec::new(Specifier::Def, Some("Xform")))
            .unwrap();
        layer.save().unwrap();

        let reopened = Layer::open(&file).unwrap();
        assert_eq!(reopened.identifier(), Some(file.as_path()));
        assert_eq!(reopened.metadata("upAxis"), Some(&Value::Token("Y".into())));
        assert_eq!(
            reopened.spec(&p("/World")).unwrap().type_name.as_deref(),
            Some("Xform")
        );
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Layer::open(dir.path().join("missing.usda")),
            Err(StageError::Io(_))
        ));
    }
}
