//! Component asset roots.

use serde::{Deserialize, Serialize};
use vfxi_usd::{ModelApi, Path, Stage, StageResult, Xform};

pub const COMPONENT_KIND: &str = "component";

/// Asset info written on the root. Empty fields are not authored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetInfo {
    pub name: String,
    pub identifier: String,
    pub version: String,
}

impl AssetInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Define an `Xform` at `path` with `kind = "component"` and asset info.
pub fn build_asset_root(stage: &mut Stage, path: &Path, info: &AssetInfo) -> StageResult<Xform> {
    let root = Xform::define(stage, path)?;
    let model = ModelApi::new(path);
    model.set_kind(stage, COMPONENT_KIND)?;

    if !info.name.is_empty() {
        model.set_asset_name(stage, &info.name)?;
    }
    if !info.identifier.is_empty() {
        model.set_asset_identifier(stage, &info.identifier)?;
    }
    if !info.version.is_empty() {
        model.set_asset_version(stage, &info.version)?;
    }

    log::debug!("Built asset root {path}");
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfxi_usd::Value;

    #[test]
    fn test_asset_root_kind_and_info() {
        let mut stage = Stage::create_in_memory();
        let path = Path::parse("/teapot").unwrap();
        let info = AssetInfo {
            name: "teapot".into(),
            identifier: "./teapot.usda".into(),
            version: String::new(),
        };

        build_asset_root(&mut stage, &path, &info).unwrap();

        let prim = stage.get_prim(&path).unwrap();
        assert_eq!(prim.type_name(), "Xform");
        assert_eq!(prim.kind(), Some("component"));

        let asset_info = prim.asset_info();
        assert_eq!(asset_info["name"], Value::String("teapot".into()));
        assert_eq!(asset_info["identifier"], Value::Asset("./teapot.usda".into()));
        assert!(!asset_info.contains_key("version"));
    }

    #[test]
    fn test_asset_root_without_info() {
        let mut stage = Stage::create_in_memory();
        let path = Path::parse("/bare").unwrap();
        build_asset_root(&mut stage, &path, &AssetInfo::default()).unwrap();

        let prim = stage.get_prim(&path).unwrap();
        assert_eq!(prim.kind(), Some("component"));
        assert!(prim.asset_info().is_empty());
    }
}
