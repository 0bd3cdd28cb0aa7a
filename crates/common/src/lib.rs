//! Shared data model: identities, groups, instances, materials.
//!
//! # Invariants
//! - Identities are caller-supplied and only ever compared, never interpreted.
//! - Mesh handles are grouping keys; nothing here dereferences them.

mod instance;
mod material;
mod types;

pub use instance::{BatchedInstance, Billboard, BillboardedInstance, SingleInstance};
pub use material::{Material, OpaqueMaterial, ShaderIdentity};
pub use types::{Group, GroupError, IdPool, InstanceId, MaterialId, MeshHandle, ShaderId};

pub fn crate_info() -> &'static str {
    "lumen-common v0.1.0"
}
