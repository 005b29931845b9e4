//! The stage: a composed view over a single root layer.
//!
//! Composition is limited to internal references. A prim that references
//! `/Proto` sees `/Proto`'s opinions and children beneath its own path, with
//! local opinions stronger. Prims marked `instanceable` ignore local opinions
//! on their descendants, which are then instance proxies.

use std::collections::HashSet;
use std::path::Path as FsPath;

use crate::error::{StageError, StageResult};
use crate::layer::{AttributeSpec, Layer, PrimSpec, Specifier};
use crate::path::Path;
use crate::predicate::{PrimFlags, PrimPredicate};
use crate::prim::{Prim, Source};
use crate::value::{Value, ValueType};

/// A USD stage backed by one root layer.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    layer: Layer,
}

impl Stage {
    /// A stage over a fresh anonymous layer.
    pub fn create_in_memory() -> Self {
        Self::from_layer(Layer::anonymous())
    }

    /// Create a new `.usda` file and a stage over it.
    pub fn create_new<P: AsRef<FsPath>>(path: P) -> StageResult<Self> {
        Ok(Self::from_layer(Layer::create_new(path)?))
    }

    /// Open an existing `.usda` file.
    pub fn open<P: AsRef<FsPath>>(path: P) -> StageResult<Self> {
        Ok(Self::from_layer(Layer::open(path)?))
    }

    pub fn from_layer(layer: Layer) -> Self {
        Self { layer }
    }

    pub fn root_layer(&self) -> &Layer {
        &self.layer
    }

    pub fn root_layer_mut(&mut self) -> &mut Layer {
        &mut self.layer
    }

    pub fn into_root_layer(self) -> Layer {
        self.layer
    }

    pub fn save(&self) -> StageResult<()> {
        self.layer.save()
    }

    pub fn export_to_string(&self) -> String {
        self.layer.to_usda()
    }

    // ---- stage metadata ----

    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.layer.metadata(key)
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.layer.set_metadata(key, value.into());
    }

    pub fn start_time_code(&self) -> Option<f64> {
        self.metadata("startTimeCode").and_then(Value::as_f64)
    }

    pub fn end_time_code(&self) -> Option<f64> {
        self.metadata("endTimeCode").and_then(Value::as_f64)
    }

    pub fn set_start_time_code(&mut self, time: f64) {
        self.set_metadata("startTimeCode", time);
    }

    pub fn set_end_time_code(&mut self, time: f64) {
        self.set_metadata("endTimeCode", time);
    }

    pub fn set_default_prim(&mut self, name: &str) {
        self.set_metadata("defaultPrim", Value::Token(name.to_string()));
    }

    pub fn default_prim(&self) -> Option<Prim<'_>> {
        let name = self.metadata("defaultPrim")?.as_str()?;
        let path = Path::abs_root().append_child(name).ok()?;
        self.get_prim(&path)
    }

    // ---- prim access ----

    pub fn pseudo_root(&self) -> Prim<'_> {
        let root = Path::abs_root();
        Prim::new(self, root.clone(), vec![Source::local(root)], PrimFlags::root())
    }

    /// Look up a composed prim. Instance proxies are returned too.
    pub fn get_prim(&self, path: &Path) -> Option<Prim<'_>> {
        if path.is_property_path() {
            return None;
        }
        let mut prim = self.pseudo_root();
        for name in path.components() {
            prim = prim.child(name)?;
        }
        Some(prim)
    }

    /// Pre-order traversal with the default predicate.
    pub fn traverse(&self) -> Vec<Prim<'_>> {
        self.traverse_with(PrimPredicate::default_predicate())
    }

    /// Pre-order traversal. Subtrees of rejected prims are pruned.
    pub fn traverse_with(&self, predicate: PrimPredicate) -> Vec<Prim<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<Prim<'_>> = self.pseudo_root().filtered_children(predicate);
        stack.reverse();
        while let Some(prim) = stack.pop() {
            let mut children = prim.filtered_children(predicate);
            children.reverse();
            stack.extend(children);
            out.push(prim);
        }
        out
    }

    // ---- prim authoring ----

    /// Define a prim of `type_name` (empty for untyped), defining missing or
    /// undefined ancestors as untyped `def` prims. Existing prims are kept
    /// and retyped when `type_name` is non-empty.
    pub fn define_prim(&mut self, path: &Path, type_name: &str) -> StageResult<Prim<'_>> {
        self.check_editable(path)?;

        for ancestor in ancestors_top_down(path) {
            self.ensure_spec(&ancestor, Specifier::Def)?;
        }
        let defined = self.get_prim(path).map(|p| p.is_defined()).unwrap_or(false);
        let spec = self.ensure_spec_raw(path, Specifier::Def)?;
        if !defined && spec.specifier == Specifier::Over {
            spec.specifier = Specifier::Def;
        }
        if !type_name.is_empty() {
            spec.type_name = Some(type_name.to_string());
        }

        log::debug!("Defined {} {}", if type_name.is_empty() { "<untyped>" } else { type_name }, path);
        self.get_prim(path).ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }

    /// Author an `over` for `path` (and any ancestors without specs).
    pub fn override_prim(&mut self, path: &Path) -> StageResult<Prim<'_>> {
        self.check_editable(path)?;
        for ancestor in ancestors_top_down(path) {
            self.ensure_spec_raw(&ancestor, Specifier::Over)?;
        }
        self.ensure_spec_raw(path, Specifier::Over)?;
        self.get_prim(path).ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }

    /// Author a `class` prim at `path`.
    pub fn create_class_prim(&mut self, path: &Path) -> StageResult<Prim<'_>> {
        self.check_editable(path)?;
        for ancestor in ancestors_top_down(path) {
            self.ensure_spec(&ancestor, Specifier::Def)?;
        }
        self.ensure_spec_raw(path, Specifier::Class)?.specifier = Specifier::Class;
        self.get_prim(path).ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }

    /// Remove the local spec at `path` and everything authored beneath it.
    pub fn remove_prim(&mut self, path: &Path) -> bool {
        self.layer.remove_spec(path)
    }

    pub fn set_kind(&mut self, path: &Path, kind: &str) -> StageResult<()> {
        self.edit_spec(path)?.kind = Some(kind.to_string());
        Ok(())
    }

    pub fn set_active(&mut self, path: &Path, active: bool) -> StageResult<()> {
        self.edit_spec(path)?.active = Some(active);
        Ok(())
    }

    pub fn set_instanceable(&mut self, path: &Path, instanceable: bool) -> StageResult<()> {
        self.edit_spec(path)?.instanceable = Some(instanceable);
        Ok(())
    }

    /// Add an internal reference from `path` to the prim at `target`.
    pub fn add_reference(&mut self, path: &Path, target: &Path) -> StageResult<()> {
        if !target.is_prim_path() {
            return Err(StageError::InvalidPrimPath(target.clone()));
        }
        let spec = self.edit_spec(path)?;
        if !spec.references.contains(target) {
            spec.references.push(target.clone());
        }
        Ok(())
    }

    pub fn set_asset_info(&mut self, path: &Path, key: &str, value: Value) -> StageResult<()> {
        self.edit_spec(path)?.asset_info.insert(key.to_string(), value);
        Ok(())
    }

    // ---- attribute authoring ----

    /// Declare an attribute on a prim and return its property path.
    ///
    /// Re-declaring with the same type is a no-op.
    pub fn create_attribute(
        &mut self,
        prim_path: &Path,
        name: &str,
        value_type: ValueType,
        uniform: bool,
    ) -> StageResult<Path> {
        let attr_path = prim_path.append_property(name)?;

        if let Some(existing) = self.attribute(&attr_path) {
            if existing.value_type != value_type {
                return Err(StageError::TypeConflict {
                    attribute: attr_path,
                    existing: existing.value_type,
                    requested: value_type,
                });
            }
        }

        let spec = self.edit_spec(prim_path)?;
        if spec.attribute(name).is_none() {
            let mut attr = AttributeSpec::new(name, value_type);
            attr.uniform = uniform;
            spec.attributes.push(attr);
        }
        Ok(attr_path)
    }

    /// Composed attribute at a property path.
    pub fn attribute(&self, attr_path: &Path) -> Option<AttributeSpec> {
        if !attr_path.is_property_path() {
            return None;
        }
        self.get_prim(&attr_path.prim_path())?
            .attribute(attr_path.name())
    }

    /// Set an attribute's default value. The value must fit the declared type.
    pub fn set_attribute(&mut self, attr_path: &Path, value: Value) -> StageResult<()> {
        let local = self.localize_attribute(attr_path)?;
        if !value.fits(local.value_type) {
            return Err(StageError::TypeMismatch {
                attribute: attr_path.clone(),
                expected: local.value_type,
                found: value.kind_name(),
            });
        }
        local.default = Some(value);
        Ok(())
    }

    /// Replace an attribute's connections with a single source property.
    pub fn connect_attribute(&mut self, attr_path: &Path, source: &Path) -> StageResult<()> {
        if !source.is_property_path() {
            return Err(StageError::NotAPropertyPath(source.clone()));
        }
        let local = self.localize_attribute(attr_path)?;
        local.connections = vec![source.clone()];
        Ok(())
    }

    /// Remove all connections authored on an attribute.
    pub fn disconnect_attribute(&mut self, attr_path: &Path) -> StageResult<()> {
        self.localize_attribute(attr_path)?.connections.clear();
        Ok(())
    }

    // ---- composition ----

    /// Resolve one child of an already-resolved prim.
    pub(crate) fn resolve_child<'a>(
        &'a self,
        parent_path: &Path,
        parent_sources: &[Source],
        parent_flags: &PrimFlags,
        name: &str,
    ) -> Option<Prim<'a>> {
        let path = parent_path.append_child(name).ok()?;
        let mut sources = Vec::new();
        let mut visited = HashSet::new();

        for source in parent_sources {
            // Local opinions beneath an instance are ignored.
            if parent_flags.instance && source.is_local() {
                continue;
            }
            if let Some(candidate) = source.child(name) {
                self.collect_sources(candidate, &mut sources, &mut visited);
            }
        }
        if sources.is_empty() {
            return None;
        }

        let flags = self.compose_flags(&sources, parent_flags);
        Some(Prim::new(self, path, sources, flags))
    }

    /// Push `source` and everything it references, strongest first.
    ///
    /// References to the referencing prim, one of its ancestors, or the site
    /// of an enclosing arc are cycles and contribute nothing.
    fn collect_sources(&self, source: Source, out: &mut Vec<Source>, visited: &mut HashSet<Path>) {
        if !visited.insert(source.path.clone()) {
            return;
        }
        let Some(spec) = self.layer.spec(&source.path) else {
            return;
        };

        let mut referenced = Vec::new();
        for target in &spec.references {
            if !target.is_prim_path() {
                continue;
            }
            if source.is_ancestral(target) {
                log::debug!("Ignoring cyclic reference {} -> {}", source.path, target);
                continue;
            }
            referenced.push(source.through(target));
        }

        out.push(source);
        for next in referenced {
            self.collect_sources(next, out, visited);
        }
    }

    fn compose_flags(&self, sources: &[Source], parent: &PrimFlags) -> PrimFlags {
        let specs: Vec<&PrimSpec> = sources
            .iter()
            .filter_map(|s| self.layer.spec(&s.path))
            .collect();

        let specifier = specs
            .iter()
            .map(|s| s.specifier)
            .find(|s| *s != Specifier::Over)
            .unwrap_or(Specifier::Over);
        let active = specs.iter().find_map(|s| s.active).unwrap_or(true);
        let instanceable = specs.iter().find_map(|s| s.instanceable).unwrap_or(false);
        let has_arc = specs.iter().any(|s| !s.references.is_empty());

        PrimFlags {
            active: parent.active && active,
            loaded: true,
            defined: parent.defined && specifier != Specifier::Over,
            is_abstract: parent.is_abstract || specifier == Specifier::Class,
            instance: instanceable && has_arc,
            instance_proxy: parent.instance || parent.instance_proxy,
        }
    }

    // ---- edit helpers ----

    /// Authoring beneath an instance (on an instance proxy) is an error.
    fn check_editable(&self, path: &Path) -> StageResult<()> {
        if !path.is_prim_path() {
            return Err(StageError::InvalidPrimPath(path.clone()));
        }
        let mut prim = self.pseudo_root();
        for name in path.components() {
            if prim.is_instance() || prim.is_instance_proxy() {
                return Err(StageError::InstanceProxyEdit(path.clone()));
            }
            match prim.child(name) {
                Some(child) => prim = child,
                None => break,
            }
        }
        if prim.path() == path && prim.is_instance_proxy() {
            return Err(StageError::InstanceProxyEdit(path.clone()));
        }
        Ok(())
    }

    /// Make sure an ancestor has a spec and is defined.
    fn ensure_spec(&mut self, path: &Path, specifier: Specifier) -> StageResult<()> {
        let composed = self.get_prim(path).map(|p| p.is_defined());
        match composed {
            Some(true) => {
                self.ensure_spec_raw(path, Specifier::Over)?;
            }
            Some(false) => {
                let spec = self.ensure_spec_raw(path, specifier)?;
                if spec.specifier == Specifier::Over {
                    spec.specifier = specifier;
                }
            }
            None => {
                self.ensure_spec_raw(path, specifier)?;
            }
        }
        Ok(())
    }

    fn ensure_spec_raw(&mut self, path: &Path, specifier: Specifier) -> StageResult<&mut PrimSpec> {
        self.layer.create_spec(path, PrimSpec::new(specifier, None))
    }

    /// Local spec for an existing composed prim, authoring `over`s as needed.
    fn edit_spec(&mut self, path: &Path) -> StageResult<&mut PrimSpec> {
        self.check_editable(path)?;
        if !self.layer.has_spec(path) {
            if self.get_prim(path).is_none() {
                return Err(StageError::PrimNotFound(path.clone()));
            }
            for ancestor in ancestors_top_down(path) {
                self.ensure_spec_raw(&ancestor, Specifier::Over)?;
            }
        }
        self.ensure_spec_raw(path, Specifier::Over)
    }

    /// Local attribute spec, copying the declaration from a weaker source
    /// when it only exists through composition.
    fn localize_attribute(&mut self, attr_path: &Path) -> StageResult<&mut AttributeSpec> {
        if !attr_path.is_property_path() {
            return Err(StageError::NotAPropertyPath(attr_path.clone()));
        }
        let composed = self
            .attribute(attr_path)
            .ok_or_else(|| StageError::AttributeNotFound(attr_path.clone()))?;
        let name = attr_path.name().to_string();

        let spec = self.edit_spec(&attr_path.prim_path())?;
        if spec.attribute(&name).is_none() {
            let mut attr = AttributeSpec::new(name.clone(), composed.value_type);
            attr.uniform = composed.uniform;
            spec.attributes.push(attr);
        }
        spec.attribute_mut(&name)
            .ok_or_else(|| StageError::AttributeNotFound(attr_path.clone()))
    }
}

/// Strict prim ancestors of `path`, outermost first.
fn ancestors_top_down(path: &Path) -> Vec<Path> {
    let mut out = Vec::new();
    let mut current = path.parent();
    while let Some(p) = current {
        if p.is_root() {
            break;
        }
        current = p.parent();
        out.push(p);
    }
    out.reverse();
    out
}
