//! Model API: kind and asset info on a prim.

use crate::error::StageResult;
use crate::path::Path;
use crate::stage::Stage;
use crate::value::Value;

/// Authoring helper for model-level metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelApi {
    path: Path,
}

impl ModelApi {
    pub fn new(path: &Path) -> Self {
        Self { path: path.clone() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_kind(&self, stage: &mut Stage, kind: &str) -> StageResult<()> {
        stage.set_kind(&self.path, kind)
    }

    pub fn kind(&self, stage: &Stage) -> Option<String> {
        stage.get_prim(&self.path)?.kind().map(str::to_string)
    }

    /// `assetInfo["name"]`
    pub fn set_asset_name(&self, stage: &mut Stage, name: &str) -> StageResult<()> {
        stage.set_asset_info(&self.path, "name", Value::String(name.to_string()))
    }

    /// `assetInfo["identifier"]`, stored as an asset path.
    pub fn set_asset_identifier(&self, stage: &mut Stage, identifier: &str) -> StageResult<()> {
        stage.set_asset_info(&self.path, "identifier", Value::Asset(identifier.to_string()))
    }

    /// `assetInfo["version"]`
    pub fn set_asset_version(&self, stage: &mut Stage, version: &str) -> StageResult<()> {
        stage.set_asset_info(&self.path, "version", Value::String(version.to_string()))
    }

    pub fn asset_name(&self, stage: &Stage) -> Option<String> {
        self.asset_info_string(stage, "name")
    }

    pub fn asset_identifier(&self, stage: &Stage) -> Option<String> {
        self.asset_info_string(stage, "identifier")
    }

    pub fn asset_version(&self, stage: &Stage) -> Option<String> {
        self.asset_info_string(stage, "version")
    }

    fn asset_info_string(&self, stage: &Stage, key: &str) -> Option<String> {
        let info = stage.get_prim(&self.path)?.asset_info();
        info.get(key)?.as_str().map(str::to_string)
    }
}
