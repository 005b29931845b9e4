//! VFXI USD - a small in-process USD stage for asset authoring.
//!
//! This crate provides:
//!
//! - **Layers**: `.usda` read/write for prims, attributes, connections and
//!   the prim metadata asset authoring needs
//! - **Stage**: composition over internal references with instancing,
//!   instance proxies and traversal predicates
//! - **Schemas**: typed handles for `Xform`, `Scope`, `Material`, `Shader`
//!   and the model API
//!
//! # Example
//!
//! ```ignore
//! use vfxi_usd::{Path, Stage};
//!
//! let mut stage = Stage::open("asset.usda")?;
//! for prim in stage.traverse() {
//!     println!("{} {}", prim.type_name(), prim.path());
//! }
//! ```

pub mod error;
pub mod layer;
pub mod path;
pub mod predicate;
pub mod prim;
pub mod schema;
pub mod stage;
pub mod usda;
pub mod value;

// Re-export commonly used types
pub use error::{StageError, StageResult};
pub use layer::{AttributeSpec, Layer, PrimSpec, Specifier};
pub use path::{Path, PathError};
pub use predicate::{PrimFlags, PrimPredicate};
pub use prim::{Prim, ReferenceArc, Source};
pub use schema::{Input, Material, ModelApi, Output, Scope, Shader, Xform};
pub use stage::Stage;
pub use value::{Value, ValueType};
