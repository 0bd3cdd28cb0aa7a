use lumen_common::{Material, ShaderId, ShaderIdentity};
use lumen_shader::{
    GeometryBufferUnits, InstanceValues, ProjectiveValues, ShaderValidationError, TextureUnit,
    UsableShader, ViewValues,
};
use serde::{Deserialize, Serialize};

/// A call forwarded to a [`RecordingShader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShaderCall {
    Activate,
    ViewValues(ViewValues),
    MaterialValues([f32; 4]),
    InstanceValues(InstanceValues),
    GeometryBuffer(GeometryBufferUnits),
    VolumeTransform(InstanceValues),
    ProjectiveValues(ProjectiveValues),
    ShadowMap(TextureUnit),
    Validate,
    Deactivate,
}

/// A shader that records every call it receives.
#[derive(Debug, Clone)]
pub struct RecordingShader {
    id: ShaderId,
    label: String,
    calls: Vec<ShaderCall>,
    validation_failure: Option<String>,
}

/// Material type used with [`RecordingShader`] in scene tests.
pub type TestMaterial = Material<RecordingShader, [f32; 4]>;

impl RecordingShader {
    pub fn new(id: ShaderId) -> Self {
        Self {
            id,
            label: format!("recording-{}", id.0),
            calls: Vec::new(),
            validation_failure: None,
        }
    }

    /// Make every call to `validate` fail with `message`.
    pub fn failing_validation(mut self, message: impl Into<String>) -> Self {
        self.validation_failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> &[ShaderCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&ShaderCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl ShaderIdentity for RecordingShader {
    fn shader_id(&self) -> ShaderId {
        self.id
    }
}

impl UsableShader for RecordingShader {
    type Parameters = [f32; 4];

    fn label(&self) -> &str {
        &self.label
    }

    fn activate(&mut self) {
        self.calls.push(ShaderCall::Activate);
    }

    fn receive_view_values(&mut self, values: &ViewValues) {
        self.calls.push(ShaderCall::ViewValues(*values));
    }

    fn receive_material_values(&mut self, parameters: &[f32; 4]) {
        self.calls.push(ShaderCall::MaterialValues(*parameters));
    }

    fn receive_instance_values(&mut self, values: &InstanceValues) {
        self.calls.push(ShaderCall::InstanceValues(*values));
    }

    fn receive_geometry_buffer(&mut self, units: &GeometryBufferUnits) {
        self.calls.push(ShaderCall::GeometryBuffer(*units));
    }

    fn receive_volume_transform(&mut self, values: &InstanceValues) {
        self.calls.push(ShaderCall::VolumeTransform(*values));
    }

    fn receive_projective_values(&mut self, values: &ProjectiveValues) {
        self.calls.push(ShaderCall::ProjectiveValues(*values));
    }

    fn receive_shadow_map(&mut self, unit: TextureUnit) {
        self.calls.push(ShaderCall::ShadowMap(unit));
    }

    fn validate(&mut self) -> Result<(), ShaderValidationError> {
        self.calls.push(ShaderCall::Validate);
        match &self.validation_failure {
            Some(message) => Err(ShaderValidationError {
                shader: self.id,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn deactivate(&mut self) {
        self.calls.push(ShaderCall::Deactivate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut s = RecordingShader::new(ShaderId(3));
        s.activate();
        s.receive_shadow_map(TextureUnit(2));
        s.deactivate();
        assert_eq!(
            s.calls(),
            &[
                ShaderCall::Activate,
                ShaderCall::ShadowMap(TextureUnit(2)),
                ShaderCall::Deactivate
            ]
        );
        assert_eq!(s.label(), "recording-3");
    }

    #[test]
    fn configured_failure() {
        let mut s = RecordingShader::new(ShaderId(1)).failing_validation("no albedo");
        let err = s.validate().unwrap_err();
        assert_eq!(err.message, "no albedo");
        assert_eq!(s.count(|c| *c == ShaderCall::Validate), 1);
    }
}
