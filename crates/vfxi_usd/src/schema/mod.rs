//! Typed schema handles.
//!
//! Each handle is a path plus the knowledge of which prim type and which
//! properties it authors. Handles do not borrow the stage; every call takes
//! the stage explicitly.

mod geom;
mod model;
mod shade;

pub use geom::{Scope, Xform};
pub use model::ModelApi;
pub use shade::{Input, Material, Output, Shader};
