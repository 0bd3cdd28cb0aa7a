use glam::{Mat4, UVec2};
use lumen_common::{ShaderId, ShaderIdentity};
use serde::{Deserialize, Serialize};

/// Per-view values: camera matrices and viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewValues {
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: UVec2,
}

impl Default for ViewValues {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewport: UVec2::ONE,
        }
    }
}

/// Per-instance values. Also used for light volume transforms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceValues {
    pub model: Mat4,
}

/// View and projection of a projective light's frustum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectiveValues {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for ProjectiveValues {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// A bound texture unit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureUnit(pub u32);

/// Texture units the geometry buffer is bound to for a lighting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometryBufferUnits {
    pub albedo: TextureUnit,
    pub normal: TextureUnit,
    pub specular: TextureUnit,
    pub depth: TextureUnit,
}

/// Raised by a shader's own [`UsableShader::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{shader} failed validation: {message}")]
pub struct ShaderValidationError {
    pub shader: ShaderId,
    pub message: String,
}

/// A shader program a back end can drive.
///
/// Implementations forward each call to the graphics API. The order calls
/// arrive in is not checked here; wrap the shader in a
/// [`ProtocolVerifier`](crate::ProtocolVerifier) for that. Steps that only
/// some kinds of shader take default to doing nothing.
#[allow(unused_variables)]
pub trait UsableShader: ShaderIdentity {
    /// Material parameter block this shader reads.
    type Parameters;

    /// Human readable name, for logs.
    fn label(&self) -> &str;

    fn activate(&mut self);

    fn receive_view_values(&mut self, values: &ViewValues) {}

    fn receive_material_values(&mut self, parameters: &Self::Parameters);

    fn receive_instance_values(&mut self, values: &InstanceValues) {}

    fn receive_geometry_buffer(&mut self, units: &GeometryBufferUnits) {}

    fn receive_volume_transform(&mut self, values: &InstanceValues) {}

    fn receive_projective_values(&mut self, values: &ProjectiveValues) {}

    fn receive_shadow_map(&mut self, unit: TextureUnit) {}

    /// Check that every uniform the program needs has been supplied.
    fn validate(&mut self) -> Result<(), ShaderValidationError>;

    fn deactivate(&mut self);
}
