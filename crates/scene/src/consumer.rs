use lumen_common::{BatchedInstance, BillboardedInstance, Group, OpaqueMaterial, SingleInstance};

/// Receiver of a scheduled opaque scene.
///
/// [`SceneOpaques::execute`](crate::SceneOpaques::execute) calls these in
/// the one legal order, so implementations never need to validate nesting.
/// Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait OpaquesConsumer<M: OpaqueMaterial> {
    /// Called once before anything else.
    fn on_start(&mut self) {}

    /// Called once per visible batch, before any group is traversed.
    fn on_instance_batched_update(&mut self, instance: &BatchedInstance) {}

    /// Called once per visible billboard set, before any group is traversed.
    fn on_instance_billboarded_update(&mut self, instance: &BillboardedInstance) {}

    fn on_start_group(&mut self, group: Group) {}

    fn on_instance_batched_shader_start(&mut self, shader: &M::Shader) {}

    fn on_instance_batched_material_start(&mut self, material: &M) {}

    fn on_instance_batched(&mut self, material: &M, instance: &BatchedInstance) {}

    fn on_instance_batched_material_finish(&mut self, material: &M) {}

    fn on_instance_batched_shader_finish(&mut self, shader: &M::Shader) {}

    fn on_instance_billboarded_shader_start(&mut self, shader: &M::Shader) {}

    fn on_instance_billboarded_material_start(&mut self, material: &M) {}

    fn on_instance_billboarded(&mut self, material: &M, instance: &BillboardedInstance) {}

    fn on_instance_billboarded_material_finish(&mut self, material: &M) {}

    fn on_instance_billboarded_shader_finish(&mut self, shader: &M::Shader) {}

    fn on_instance_single_shader_start(&mut self, shader: &M::Shader) {}

    fn on_instance_single_material_start(&mut self, material: &M) {}

    /// Called when the mesh changes. `instance` is the first instance drawn
    /// with the new mesh.
    fn on_instance_single_array_start(&mut self, instance: &SingleInstance) {}

    fn on_instance_single(&mut self, material: &M, instance: &SingleInstance) {}

    fn on_instance_single_material_finish(&mut self, material: &M) {}

    fn on_instance_single_shader_finish(&mut self, shader: &M::Shader) {}

    fn on_finish_group(&mut self, group: Group) {}

    /// Called once after everything else.
    fn on_finish(&mut self) {}
}
