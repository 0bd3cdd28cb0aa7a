use std::sync::Arc;

use crate::types::{MaterialId, ShaderId};

/// Anything that can be identified as a shader.
pub trait ShaderIdentity {
    fn shader_id(&self) -> ShaderId;
}

impl<T: ShaderIdentity + ?Sized> ShaderIdentity for Arc<T> {
    fn shader_id(&self) -> ShaderId {
        (**self).shader_id()
    }
}

/// A material that can be scheduled for opaque rendering.
pub trait OpaqueMaterial {
    type Shader: ShaderIdentity;

    fn material_id(&self) -> MaterialId;

    fn shader(&self) -> &Self::Shader;
}

/// A shader paired with the parameter values it is drawn with.
#[derive(Debug)]
pub struct Material<S, P> {
    id: MaterialId,
    shader: Arc<S>,
    parameters: P,
}

impl<S: ShaderIdentity, P> Material<S, P> {
    pub fn new(id: MaterialId, shader: Arc<S>, parameters: P) -> Self {
        Self {
            id,
            shader,
            parameters,
        }
    }

    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    pub fn shader_arc(&self) -> &Arc<S> {
        &self.shader
    }
}

impl<S: ShaderIdentity, P> OpaqueMaterial for Material<S, P> {
    type Shader = S;

    fn material_id(&self) -> MaterialId {
        self.id
    }

    fn shader(&self) -> &S {
        &self.shader
    }
}
