//! Opaque scene scheduling.
//!
//! Collects the opaque instances visible in a frame and replays them into a
//! consumer in an order that keeps shader, material, and mesh switches to a
//! minimum.
//!
//! # Invariants
//! - An instance is visible at most once per frame, across all kinds and groups.
//! - Traversal order depends only on insertion order, never on hashing.
//! - Executing a scene does not change it.

mod consumer;
mod opaques;

pub use consumer::OpaquesConsumer;
pub use opaques::{SceneError, SceneOpaques};

pub fn crate_info() -> &'static str {
    "lumen-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
