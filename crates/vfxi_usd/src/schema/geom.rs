//! `UsdGeom` grouping prims.

use crate::error::StageResult;
use crate::path::Path;
use crate::stage::Stage;

/// Transformable grouping prim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xform {
    path: Path,
}

impl Xform {
    pub const TYPE_NAME: &'static str = "Xform";

    /// Define (or retype) an `Xform` at `path`.
    pub fn define(stage: &mut Stage, path: &Path) -> StageResult<Self> {
        stage.define_prim(path, Self::TYPE_NAME)?;
        Ok(Self { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Non-transformable grouping prim, used for material libraries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    path: Path,
}

impl Scope {
    pub const TYPE_NAME: &'static str = "Scope";

    pub fn define(stage: &mut Stage, path: &Path) -> StageResult<Self> {
        stage.define_prim(path, Self::TYPE_NAME)?;
        Ok(Self { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_xform_and_scope() {
        let mut stage = Stage::create_in_memory();
        let root = Xform::define(&mut stage, &Path::parse("/Asset").unwrap()).unwrap();
        let mtl = Scope::define(&mut stage, &Path::parse("/Asset/mtl").unwrap()).unwrap();

        assert_eq!(root.path().as_str(), "/Asset");
        assert_eq!(stage.get_prim(root.path()).unwrap().type_name(), "Xform");
        assert_eq!(stage.get_prim(mtl.path()).unwrap().type_name(), "Scope");
    }
}
