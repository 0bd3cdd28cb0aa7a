use lumen_common::{
    BatchedInstance, BillboardedInstance, Group, InstanceId, MaterialId, MeshHandle,
    OpaqueMaterial, ShaderId, ShaderIdentity, SingleInstance,
};
use lumen_scene::OpaquesConsumer;
use serde::{Deserialize, Serialize};

/// One consumer callback, reduced to the identities it carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConsumerEvent {
    Start,
    BatchedUpdate { instance: InstanceId },
    BillboardedUpdate { instance: InstanceId },
    StartGroup { group: Group },
    BatchedShaderStart { shader: ShaderId },
    BatchedMaterialStart { material: MaterialId },
    Batched { material: MaterialId, instance: InstanceId },
    BatchedMaterialFinish { material: MaterialId },
    BatchedShaderFinish { shader: ShaderId },
    BillboardedShaderStart { shader: ShaderId },
    BillboardedMaterialStart { material: MaterialId },
    Billboarded { material: MaterialId, instance: InstanceId },
    BillboardedMaterialFinish { material: MaterialId },
    BillboardedShaderFinish { shader: ShaderId },
    SingleShaderStart { shader: ShaderId },
    SingleMaterialStart { material: MaterialId },
    SingleArrayStart { mesh: MeshHandle, instance: InstanceId },
    Single { material: MaterialId, instance: InstanceId },
    SingleMaterialFinish { material: MaterialId },
    SingleShaderFinish { shader: ShaderId },
    FinishGroup { group: Group },
    Finish,
}

/// Consumer that records every callback it receives.
///
/// Set [`acknowledging`](Self::acknowledging) to clear update flags on
/// batches and billboards the way a back end would after uploading them.
#[derive(Debug, Default)]
pub struct RecordingConsumer {
    events: Vec<ConsumerEvent>,
    acknowledge_updates: bool,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acknowledging() -> Self {
        Self {
            events: Vec::new(),
            acknowledge_updates: true,
        }
    }

    pub fn events(&self) -> &[ConsumerEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<ConsumerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }

    /// Instance ids of every single draw, in order.
    pub fn singles(&self) -> Vec<InstanceId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsumerEvent::Single { instance, .. } => Some(*instance),
                _ => None,
            })
            .collect()
    }

    /// Groups visited, in order.
    pub fn groups(&self) -> Vec<Group> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsumerEvent::StartGroup { group } => Some(*group),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, event: &ConsumerEvent) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    pub fn count(&self, pred: impl Fn(&ConsumerEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl<M: OpaqueMaterial> OpaquesConsumer<M> for RecordingConsumer {
    fn on_start(&mut self) {
        self.events.push(ConsumerEvent::Start);
    }

    fn on_instance_batched_update(&mut self, instance: &BatchedInstance) {
        self.events.push(ConsumerEvent::BatchedUpdate {
            instance: instance.id(),
        });
        if self.acknowledge_updates {
            instance.mark_updated();
        }
    }

    fn on_instance_billboarded_update(&mut self, instance: &BillboardedInstance) {
        self.events.push(ConsumerEvent::BillboardedUpdate {
            instance: instance.id(),
        });
        if self.acknowledge_updates {
            instance.mark_updated();
        }
    }

    fn on_start_group(&mut self, group: Group) {
        self.events.push(ConsumerEvent::StartGroup { group });
    }

    fn on_instance_batched_shader_start(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::BatchedShaderStart {
            shader: shader.shader_id(),
        });
    }

    fn on_instance_batched_material_start(&mut self, material: &M) {
        self.events.push(ConsumerEvent::BatchedMaterialStart {
            material: material.material_id(),
        });
    }

    fn on_instance_batched(&mut self, material: &M, instance: &BatchedInstance) {
        self.events.push(ConsumerEvent::Batched {
            material: material.material_id(),
            instance: instance.id(),
        });
    }

    fn on_instance_batched_material_finish(&mut self, material: &M) {
        self.events.push(ConsumerEvent::BatchedMaterialFinish {
            material: material.material_id(),
        });
    }

    fn on_instance_batched_shader_finish(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::BatchedShaderFinish {
            shader: shader.shader_id(),
        });
    }

    fn on_instance_billboarded_shader_start(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::BillboardedShaderStart {
            shader: shader.shader_id(),
        });
    }

    fn on_instance_billboarded_material_start(&mut self, material: &M) {
        self.events.push(ConsumerEvent::BillboardedMaterialStart {
            material: material.material_id(),
        });
    }

    fn on_instance_billboarded(&mut self, material: &M, instance: &BillboardedInstance) {
        self.events.push(ConsumerEvent::Billboarded {
            material: material.material_id(),
            instance: instance.id(),
        });
    }

    fn on_instance_billboarded_material_finish(&mut self, material: &M) {
        self.events.push(ConsumerEvent::BillboardedMaterialFinish {
            material: material.material_id(),
        });
    }

    fn on_instance_billboarded_shader_finish(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::BillboardedShaderFinish {
            shader: shader.shader_id(),
        });
    }

    fn on_instance_single_shader_start(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::SingleShaderStart {
            shader: shader.shader_id(),
        });
    }

    fn on_instance_single_material_start(&mut self, material: &M) {
        self.events.push(ConsumerEvent::SingleMaterialStart {
            material: material.material_id(),
        });
    }

    fn on_instance_single_array_start(&mut self, instance: &SingleInstance) {
        self.events.push(ConsumerEvent::SingleArrayStart {
            mesh: instance.mesh,
            instance: instance.id,
        });
    }

    fn on_instance_single(&mut self, material: &M, instance: &SingleInstance) {
        self.events.push(ConsumerEvent::Single {
            material: material.material_id(),
            instance: instance.id,
        });
    }

    fn on_instance_single_material_finish(&mut self, material: &M) {
        self.events.push(ConsumerEvent::SingleMaterialFinish {
            material: material.material_id(),
        });
    }

    fn on_instance_single_shader_finish(&mut self, shader: &M::Shader) {
        self.events.push(ConsumerEvent::SingleShaderFinish {
            shader: shader.shader_id(),
        });
    }

    fn on_finish_group(&mut self, group: Group) {
        self.events.push(ConsumerEvent::FinishGroup { group });
    }

    fn on_finish(&mut self) {
        self.events.push(ConsumerEvent::Finish);
    }
}
