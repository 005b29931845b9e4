//! Composed prim handles.

use std::collections::{BTreeMap, HashSet};

use crate::layer::{AttributeSpec, PrimSpec, Specifier};
use crate::path::Path;
use crate::predicate::{PrimFlags, PrimPredicate};
use crate::stage::Stage;
use crate::value::Value;

/// A reference authored on the spec at `site`, pulling in `target`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceArc {
    pub site: Path,
    pub target: Path,
}

/// A spec contributing to a composed prim.
///
/// `arcs` lists the references that brought the spec in, outermost first.
/// Local specs have no arcs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub path: Path,
    pub arcs: Vec<ReferenceArc>,
}

impl Source {
    pub fn local(path: Path) -> Self {
        Self { path, arcs: Vec::new() }
    }

    pub fn is_local(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The same arcs one namespace level down.
    pub(crate) fn child(&self, name: &str) -> Option<Self> {
        Some(Self {
            path: self.path.append_child(name).ok()?,
            arcs: self.arcs.clone(),
        })
    }

    /// Source for `target`, referenced from this spec.
    pub(crate) fn through(&self, target: &Path) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.push(ReferenceArc {
            site: self.path.clone(),
            target: target.clone(),
        });
        Self {
            path: target.clone(),
            arcs,
        }
    }

    /// True if referencing `target` from here would nest the referencing
    /// namespace inside itself.
    pub(crate) fn is_ancestral(&self, target: &Path) -> bool {
        self.path.has_prefix(target) || self.arcs.iter().any(|arc| arc.site.has_prefix(target))
    }

    /// Map a path authored in this spec's layer namespace into the composed
    /// namespace. Paths outside the innermost arc's target are returned
    /// unchanged.
    pub fn map_to_namespace(&self, path: &Path) -> Path {
        let mut mapped = path.clone();
        for arc in self.arcs.iter().rev() {
            match mapped.replace_prefix(&arc.target, &arc.site) {
                Some(next) => mapped = next,
                None => return path.clone(),
            }
        }
        mapped
    }
}

/// A read-only handle on a composed prim.
///
/// Holds the specs contributing to the prim, strongest first.
#[derive(Clone, Debug)]
pub struct Prim<'a> {
    stage: &'a Stage,
    path: Path,
    sources: Vec<Source>,
    flags: PrimFlags,
}

impl<'a> Prim<'a> {
    pub(crate) fn new(stage: &'a Stage, path: Path, sources: Vec<Source>, flags: PrimFlags) -> Self {
        Self {
            stage,
            path,
            sources,
            flags,
        }
    }

    pub fn stage(&self) -> &'a Stage {
        self.stage
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn is_pseudo_root(&self) -> bool {
        self.path.is_root()
    }

    /// Contributing specs, strongest first.
    fn specs(&self) -> impl Iterator<Item = &'a PrimSpec> + '_ {
        let layer = self.stage.root_layer();
        self.sources.iter().filter_map(move |s| layer.spec(&s.path))
    }

    /// Specs contributing to this prim, strongest first.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn specifier(&self) -> Specifier {
        self.specs()
            .map(|s| s.specifier)
            .find(|s| *s != Specifier::Over)
            .unwrap_or(Specifier::Over)
    }

    /// Schema type name, empty for untyped prims.
    pub fn type_name(&self) -> &'a str {
        self.specs()
            .find_map(|s| s.type_name.as_deref())
            .unwrap_or("")
    }

    pub fn kind(&self) -> Option<&'a str> {
        self.specs().find_map(|s| s.kind.as_deref())
    }

    /// Composed `assetInfo`, strongest value per key.
    pub fn asset_info(&self) -> BTreeMap<String, Value> {
        let mut info = BTreeMap::new();
        for spec in self.specs() {
            for (key, value) in &spec.asset_info {
                info.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        info
    }

    /// Scalar prim metadata by USD field name.
    pub fn metadata(&self, key: &str) -> Option<Value> {
        match key {
            "kind" => self.kind().map(|k| Value::Token(k.to_string())),
            "typeName" => {
                let type_name = self.type_name();
                (!type_name.is_empty()).then(|| Value::Token(type_name.to_string()))
            }
            "specifier" => Some(Value::Token(self.specifier().keyword().to_string())),
            "active" => self.specs().find_map(|s| s.active).map(Value::Bool),
            "instanceable" => self.specs().find_map(|s| s.instanceable).map(Value::Bool),
            _ => None,
        }
    }

    pub fn flags(&self) -> PrimFlags {
        self.flags
    }

    pub fn is_active(&self) -> bool {
        self.flags.active
    }

    pub fn is_loaded(&self) -> bool {
        self.flags.loaded
    }

    pub fn is_defined(&self) -> bool {
        self.flags.defined
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.is_abstract
    }

    pub fn is_instance(&self) -> bool {
        self.flags.instance
    }

    pub fn is_instance_proxy(&self) -> bool {
        self.flags.instance_proxy
    }

    pub fn parent(&self) -> Option<Prim<'a>> {
        self.stage.get_prim(&self.path.parent()?)
    }

    /// Composed child names, strongest source's order first.
    pub fn child_names(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (source, spec) in self.sources.iter().zip(self.specs_aligned()) {
            if self.flags.instance && source.is_local() {
                continue;
            }
            let Some(spec) = spec else { continue };
            for name in &spec.children {
                if seen.insert(name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    fn specs_aligned(&self) -> impl Iterator<Item = Option<&'a PrimSpec>> + '_ {
        let layer = self.stage.root_layer();
        self.sources.iter().map(move |s| layer.spec(&s.path))
    }

    /// Named child regardless of predicates.
    pub fn child(&self, name: &str) -> Option<Prim<'a>> {
        self.stage
            .resolve_child(&self.path, &self.sources, &self.flags, name)
    }

    /// Children accepted by the default predicate.
    pub fn children(&self) -> Vec<Prim<'a>> {
        self.filtered_children(PrimPredicate::default_predicate())
    }

    /// Every child, including inactive, undefined and abstract ones.
    pub fn all_children(&self) -> Vec<Prim<'a>> {
        self.filtered_children(PrimPredicate::all_prims())
    }

    /// Children accepted by `predicate`. Children of an instance proxy are
    /// always traversed as proxies.
    pub fn filtered_children(&self, predicate: PrimPredicate) -> Vec<Prim<'a>> {
        let predicate = if self.flags.instance_proxy {
            predicate.traverse_instance_proxies()
        } else {
            predicate
        };

        self.child_names()
            .into_iter()
            .filter_map(|name| self.child(name))
            .filter(|child| predicate.accepts(&child.flags))
            .collect()
    }

    /// Composed attribute names in authoring order.
    pub fn attribute_names(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for spec in self.specs() {
            for attr in &spec.attributes {
                if seen.insert(attr.name.as_str()) {
                    names.push(attr.name.as_str());
                }
            }
        }
        names
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.specs().any(|s| s.attribute(name).is_some())
    }

    /// Composed attribute. Connections authored across a reference are
    /// mapped into this prim's namespace.
    pub fn attribute(&self, name: &str) -> Option<AttributeSpec> {
        let mut composed: Option<AttributeSpec> = None;

        for (source, spec) in self.sources.iter().zip(self.specs_aligned()) {
            let Some(attr) = spec.and_then(|s| s.attribute(name)) else {
                continue;
            };
            let connections: Vec<Path> = attr
                .connections
                .iter()
                .map(|target| source.map_to_namespace(target))
                .collect();

            match composed.as_mut() {
                None => {
                    let mut strongest = attr.clone();
                    strongest.connections = connections;
                    composed = Some(strongest);
                }
                Some(existing) => {
                    if existing.default.is_none() {
                        existing.default = attr.default.clone();
                    }
                    if existing.connections.is_empty() {
                        existing.connections = connections;
                    }
                }
            }
        }

        composed
    }

    pub fn attribute_value(&self, name: &str) -> Option<Value> {
        self.attribute(name)?.default
    }

    pub fn connections(&self, name: &str) -> Vec<Path> {
        self.attribute(name)
            .map(|a| a.connections)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_child_names_union_across_reference() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/Proto/A"), "").unwrap();
        stage.define_prim(&p("/Proto/B"), "").unwrap();
        stage.define_prim(&p("/Ref/C"), "").unwrap();
        stage.define_prim(&p("/Ref/A"), "Xform").unwrap();
        stage.add_reference(&p("/Ref"), &p("/Proto")).unwrap();

        let prim = stage.get_prim(&p("/Ref")).unwrap();
        assert_eq!(prim.child_names(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_metadata_lookup() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/Asset"), "Xform").unwrap();
        stage.set_kind(&p("/Asset"), "component").unwrap();

        let prim = stage.get_prim(&p("/Asset")).unwrap();
        assert_eq!(prim.metadata("kind"), Some(Value::Token("component".into())));
        assert_eq!(prim.metadata("typeName"), Some(Value::Token("Xform".into())));
        assert_eq!(prim.metadata("specifier"), Some(Value::Token("def".into())));
        assert_eq!(prim.metadata("active"), None);
        assert_eq!(prim.metadata("nonsense"), None);
    }

    #[test]
    fn test_connections_follow_reference() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/Proto/Mat"), "Material").unwrap();
        stage.define_prim(&p("/Proto/Mat/Surface"), "Shader").unwrap();
        let out = stage
            .create_attribute(&p("/Proto/Mat/Surface"), "outputs:surface", ValueType::Token, false)
            .unwrap();
        let mat_out = stage
            .create_attribute(&p("/Proto/Mat"), "outputs:surface", ValueType::Token, false)
            .unwrap();
        stage.connect_attribute(&mat_out, &out).unwrap();

        stage.define_prim(&p("/World/Looks"), "Scope").unwrap();
        stage.add_reference(&p("/World/Looks"), &p("/Proto")).unwrap();

        let mat = stage.get_prim(&p("/World/Looks/Mat")).unwrap();
        assert_eq!(
            mat.connections("outputs:surface"),
            vec![p("/World/Looks/Mat/Surface.outputs:surface")]
        );
    }

    #[test]
    fn test_connections_outside_reference_target_unchanged() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/A/Shader"), "Shader").unwrap();
        let inner = stage
            .create_attribute(&p("/A/Shader"), "outputs:rgb", ValueType::Color3f, false)
            .unwrap();
        let tint = stage
            .create_attribute(&p("/A"), "inputs:tint", ValueType::Color3f, false)
            .unwrap();
        stage.connect_attribute(&tint, &inner).unwrap();
        let mask = stage
            .create_attribute(&p("/A"), "inputs:mask", ValueType::Float, false)
            .unwrap();
        stage.connect_attribute(&mask, &p("/Other.outputs:r")).unwrap();

        stage.define_prim(&p("/Z/A"), "").unwrap();
        stage.add_reference(&p("/Z/A"), &p("/A")).unwrap();

        let prim = stage.get_prim(&p("/Z/A")).unwrap();
        assert_eq!(prim.connections("inputs:tint"), vec![p("/Z/A/Shader.outputs:rgb")]);
        assert_eq!(prim.connections("inputs:mask"), vec![p("/Other.outputs:r")]);
    }

    #[test]
    fn test_connections_map_through_nested_references() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/Lib/Mat/Surface"), "Shader").unwrap();
        let out = stage
            .create_attribute(&p("/Lib/Mat/Surface"), "outputs:surface", ValueType::Token, false)
            .unwrap();
        let mat_out = stage
            .create_attribute(&p("/Lib/Mat"), "outputs:surface", ValueType::Token, false)
            .unwrap();
        stage.connect_attribute(&mat_out, &out).unwrap();

        stage.define_prim(&p("/Proto/Look"), "Material").unwrap();
        stage.add_reference(&p("/Proto/Look"), &p("/Lib/Mat")).unwrap();
        stage.define_prim(&p("/World/Asset"), "Xform").unwrap();
        stage.add_reference(&p("/World/Asset"), &p("/Proto")).unwrap();

        let look = stage.get_prim(&p("/World/Asset/Look")).unwrap();
        let arcs: Vec<usize> = look.sources().iter().map(|s| s.arcs.len()).collect();
        assert_eq!(arcs, vec![1, 2]);
        assert_eq!(
            look.connections("outputs:surface"),
            vec![p("/World/Asset/Look/Surface.outputs:surface")]
        );
    }

    #[test]
    fn test_weaker_default_fills_in() {
        let mut stage = Stage::create_in_memory();
        stage.define_prim(&p("/Proto"), "Shader").unwrap();
        let attr = stage
            .create_attribute(&p("/Proto"), "inputs:roughness", ValueType::Float, false)
            .unwrap();
        stage.set_attribute(&attr, Value::Float(0.2)).unwrap();

        stage.define_prim(&p("/Ref"), "").unwrap();
        stage.add_reference(&p("/Ref"), &p("/Proto")).unwrap();
        assert_eq!(
            stage.get_prim(&p("/Ref")).unwrap().attribute_value("inputs:roughness"),
            Some(Value::Float(0.2))
        );

        stage
            .set_attribute(&p("/Ref.inputs:roughness"), Value::Float(0.7))
            .unwrap();
        assert_eq!(
            stage.get_prim(&p("/Ref")).unwrap().attribute_value("inputs:roughness"),
            Some(Value::Float(0.7))
        );
        assert_eq!(
            stage.get_prim(&p("/Proto")).unwrap().attribute_value("inputs:roughness"),
            Some(Value::Float(0.2))
        );
    }
}
