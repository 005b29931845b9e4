//! Material libraries.

use vfxi_usd::{Material, Path, Scope, Stage, StageResult};

/// Define a `Scope` to hold an asset's materials.
pub fn build_material_scope(stage: &mut Stage, path: &Path) -> StageResult<Scope> {
    Scope::define(stage, path)
}

/// Define a `Material` named `name` under `scope`.
pub fn build_material(stage: &mut Stage, scope: &Path, name: &str) -> StageResult<Material> {
    let path = scope.append_child(name)?;
    Material::define(stage, &path)
}
