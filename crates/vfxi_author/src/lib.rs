//! VFXI Author - helpers for building USD assets.
//!
//! This crate provides:
//!
//! - **Stage sessions**: [`make_stage`] opens or creates a `.usda` file,
//!   applies [`StageSettings`] and always saves when the edit ends
//! - **Asset structure**: component asset roots and material scopes
//! - **Shading networks**: `UsdPreviewSurface` and MaterialX
//!   `standard_surface` shaders with optional texture nodes
//! - **Search**: [`find_type_or_kind`] over a composed prim tree
//!
//! # Example
//!
//! ```ignore
//! use rand::{rngs::StdRng, SeedableRng};
//! use vfxi_author::*;
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! make_stage("teapot.usda", &StageSettings::default(), |stage| {
//!     let root = build_asset_root(stage, &"/teapot".parse()?, &AssetInfo::named("teapot"))?;
//!     let scope = build_material_scope(stage, &root.path().append_child("mtl")?)?;
//!     let material = build_material(stage, scope.path(), "clay")?;
//!     build_preview_shader(stage, &material, "preview", &TextureAssignments::new(), &mut rng)?;
//!     Ok::<_, vfxi_usd::StageError>(())
//! })?;
//! ```

pub mod asset;
pub mod material;
pub mod mtlx;
pub mod preview;
pub mod search;
pub mod session;

// Re-export commonly used types
pub use asset::{build_asset_root, AssetInfo, COMPONENT_KIND};
pub use material::{build_material, build_material_scope};
pub use mtlx::{add_mtlx_image, build_mtlx_standard_surface};
pub use preview::{
    add_readprimvar_shader, add_readtexture_shader, build_preview_shader, ChannelKind,
    TextureAssignments,
};
pub use search::{find_in_stage, find_type_or_kind};
pub use session::{make_stage, SettingsError, StageSettings};
