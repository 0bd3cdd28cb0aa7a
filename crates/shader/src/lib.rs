//! Shader usage protocol.
//!
//! A shader is driven through a fixed sequence of steps: activate, receive
//! the values it needs, validate, draw, deactivate. Which steps apply and in
//! which order depends on the kind of pass. [`ProtocolVerifier`] wraps any
//! [`UsableShader`] and rejects calls made out of order.
//!
//! # Invariants
//! - A rejected call is never forwarded to the wrapped shader.
//! - A rejected call leaves the verifier in the state it was in.
//! - Deactivation is accepted from every state.

mod protocol;
mod usable;
mod verifier;

pub use protocol::{Rule, ShaderKind, State, Step};
pub use usable::{
    GeometryBufferUnits, InstanceValues, ProjectiveValues, ShaderValidationError, TextureUnit,
    UsableShader, ViewValues,
};
pub use verifier::{ProtocolVerifier, VerifierError};

pub fn crate_info() -> &'static str {
    "lumen-shader v0.1.0"
}
