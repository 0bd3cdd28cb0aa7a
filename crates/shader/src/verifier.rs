use lumen_common::{ShaderId, ShaderIdentity};

use crate::protocol::{ShaderKind, State, Step};
use crate::usable::{
    GeometryBufferUnits, InstanceValues, ProjectiveValues, ShaderValidationError, TextureUnit,
    UsableShader, ViewValues,
};

/// Errors raised by a [`ProtocolVerifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifierError {
    /// A step was attempted from a state its rule does not allow. An empty
    /// `expected` means the shader kind never takes this step.
    #[error("{shader}: {step} requires state in {expected:?}, but state is {actual:?}")]
    ProtocolViolation {
        shader: ShaderId,
        step: Step,
        expected: Vec<State>,
        actual: State,
    },
    #[error(transparent)]
    Validation(#[from] ShaderValidationError),
}

/// Wraps a shader and checks that every call arrives in a legal order for
/// its [`ShaderKind`].
///
/// The check happens before the call is forwarded, so the wrapped shader
/// never sees an illegal call. A rejected step leaves the state unchanged.
#[derive(Debug)]
pub struct ProtocolVerifier<S> {
    shader: S,
    kind: ShaderKind,
    state: State,
}

impl<S: UsableShader> ProtocolVerifier<S> {
    pub fn new(shader: S, kind: ShaderKind) -> Self {
        Self {
            shader,
            kind,
            state: State::Deactivated,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn shader(&self) -> &S {
        &self.shader
    }

    pub fn shader_mut(&mut self) -> &mut S {
        &mut self.shader
    }

    pub fn into_inner(self) -> S {
        self.shader
    }

    pub fn activate(&mut self) -> Result<(), VerifierError> {
        let next = self.check(Step::Activate)?;
        self.shader.activate();
        self.commit(Step::Activate, next);
        Ok(())
    }

    pub fn receive_view_values(&mut self, values: &ViewValues) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveViewValues)?;
        self.shader.receive_view_values(values);
        self.commit(Step::ReceiveViewValues, next);
        Ok(())
    }

    pub fn receive_material_values(
        &mut self,
        parameters: &S::Parameters,
    ) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveMaterialValues)?;
        self.shader.receive_material_values(parameters);
        self.commit(Step::ReceiveMaterialValues, next);
        Ok(())
    }

    pub fn receive_instance_values(
        &mut self,
        values: &InstanceValues,
    ) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveInstanceValues)?;
        self.shader.receive_instance_values(values);
        self.commit(Step::ReceiveInstanceValues, next);
        Ok(())
    }

    pub fn receive_geometry_buffer(
        &mut self,
        units: &GeometryBufferUnits,
    ) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveGeometryBuffer)?;
        self.shader.receive_geometry_buffer(units);
        self.commit(Step::ReceiveGeometryBuffer, next);
        Ok(())
    }

    pub fn receive_volume_transform(
        &mut self,
        values: &InstanceValues,
    ) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveVolumeTransform)?;
        self.shader.receive_volume_transform(values);
        self.commit(Step::ReceiveVolumeTransform, next);
        Ok(())
    }

    pub fn receive_projective_values(
        &mut self,
        values: &ProjectiveValues,
    ) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveProjectiveValues)?;
        self.shader.receive_projective_values(values);
        self.commit(Step::ReceiveProjectiveValues, next);
        Ok(())
    }

    pub fn receive_shadow_map(&mut self, unit: TextureUnit) -> Result<(), VerifierError> {
        let next = self.check(Step::ReceiveShadowMap)?;
        self.shader.receive_shadow_map(unit);
        self.commit(Step::ReceiveShadowMap, next);
        Ok(())
    }

    /// Check the protocol, then run the shader's own validation. If the
    /// shader rejects, the state does not advance.
    pub fn validate(&mut self) -> Result<(), VerifierError> {
        let next = self.check(Step::Validate)?;
        if let Err(e) = self.shader.validate() {
            tracing::debug!(shader = %e.shader, label = self.shader.label(), "shader validation failed: {}", e.message);
            return Err(e.into());
        }
        self.commit(Step::Validate, next);
        Ok(())
    }

    /// Always legal, from every state.
    pub fn deactivate(&mut self) -> Result<(), VerifierError> {
        let next = self.check(Step::Deactivate)?;
        self.shader.deactivate();
        self.commit(Step::Deactivate, next);
        Ok(())
    }

    /// The state `step` would move to, or the violation it would raise.
    fn check(&self, step: Step) -> Result<State, VerifierError> {
        match self.kind.rule(step) {
            Some(rule) if rule.from.contains(&self.state) => Ok(rule.target(self.state)),
            rule => {
                let expected = rule.map(|r| r.from.to_vec()).unwrap_or_default();
                let shader = self.shader.shader_id();
                tracing::error!(
                    %shader,
                    label = self.shader.label(),
                    kind = ?self.kind,
                    %step,
                    actual = ?self.state,
                    ?expected,
                    "shader protocol violation"
                );
                Err(VerifierError::ProtocolViolation {
                    shader,
                    step,
                    expected,
                    actual: self.state,
                })
            }
        }
    }

    fn commit(&mut self, step: Step, next: State) {
        tracing::trace!(
            shader = %self.shader.shader_id(),
            %step,
            from = ?self.state,
            to = ?next,
            "shader step"
        );
        self.state = next;
    }
}

impl<S: UsableShader> ShaderIdentity for ProtocolVerifier<S> {
    fn shader_id(&self) -> ShaderId {
        self.shader.shader_id()
    }
}
