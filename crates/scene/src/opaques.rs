use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use lumen_common::{
    BatchedInstance, BillboardedInstance, Group, InstanceId, MaterialId, MeshHandle,
    OpaqueMaterial, ShaderId, ShaderIdentity, SingleInstance,
};

use crate::consumer::OpaquesConsumer;

/// Errors from scene registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("{instance} is already visible in {group}")]
    InstanceAlreadyVisible { instance: InstanceId, group: Group },
}

/// The instances drawn with one material.
struct MaterialBatch<M, L> {
    material: Arc<M>,
    instances: L,
}

struct ShaderBatch<M, L> {
    materials: Vec<MaterialBatch<M, L>>,
    material_index: HashMap<MaterialId, usize>,
}

/// One instance kind within one group, bucketed by shader then material.
///
/// Shaders and materials are kept in the order they were first seen so
/// that traversal is a pure function of the insertion sequence.
struct Bucket<M, L> {
    shaders: Vec<ShaderBatch<M, L>>,
    shader_index: HashMap<ShaderId, usize>,
}

impl<M, L> Default for Bucket<M, L> {
    fn default() -> Self {
        Self {
            shaders: Vec::new(),
            shader_index: HashMap::new(),
        }
    }
}

impl<M: OpaqueMaterial, L: Default> Bucket<M, L> {
    fn instances_for(&mut self, material: &Arc<M>) -> &mut L {
        let shader_id = material.shader().shader_id();
        let s = match self.shader_index.get(&shader_id) {
            Some(&s) => s,
            None => {
                self.shaders.push(ShaderBatch {
                    materials: Vec::new(),
                    material_index: HashMap::new(),
                });
                let s = self.shaders.len() - 1;
                self.shader_index.insert(shader_id, s);
                s
            }
        };

        let shader = &mut self.shaders[s];
        let material_id = material.material_id();
        let m = match shader.material_index.get(&material_id) {
            Some(&m) => m,
            None => {
                shader.materials.push(MaterialBatch {
                    material: Arc::clone(material),
                    instances: L::default(),
                });
                let m = shader.materials.len() - 1;
                shader.material_index.insert(material_id, m);
                m
            }
        };

        &mut shader.materials[m].instances
    }

    fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

/// Single instances of one material, segmented by mesh in first-seen order.
#[derive(Default)]
struct MeshRuns {
    runs: Vec<Vec<Arc<SingleInstance>>>,
    index: HashMap<MeshHandle, usize>,
}

impl MeshRuns {
    fn push(&mut self, instance: Arc<SingleInstance>) {
        match self.index.get(&instance.mesh) {
            Some(&r) => self.runs[r].push(instance),
            None => {
                self.index.insert(instance.mesh, self.runs.len());
                self.runs.push(vec![instance]);
            }
        }
    }
}

struct GroupEntry<M> {
    batched: Bucket<M, Vec<Arc<BatchedInstance>>>,
    billboarded: Bucket<M, Vec<Arc<BillboardedInstance>>>,
    singles: Bucket<M, MeshRuns>,
}

impl<M> Default for GroupEntry<M> {
    fn default() -> Self {
        Self {
            batched: Bucket::default(),
            billboarded: Bucket::default(),
            singles: Bucket::default(),
        }
    }
}

/// The set of opaque instances visible in the current frame.
///
/// Instances are registered with a material and a group, then replayed into
/// an [`OpaquesConsumer`] ordered group → shader → material → mesh, which is
/// the order that minimises expensive state changes in a back end.
///
/// # Invariants
/// - An instance id is visible at most once until [`reset`](Self::reset).
/// - [`execute`](Self::execute) does not mutate the scene and is
///   deterministic for a given insertion sequence.
pub struct SceneOpaques<M> {
    groups: BTreeMap<Group, GroupEntry<M>>,
    visible: HashMap<InstanceId, Group>,
    batches: Vec<Arc<BatchedInstance>>,
    billboards: Vec<Arc<BillboardedInstance>>,
}

impl<M> Default for SceneOpaques<M> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            visible: HashMap::new(),
            batches: Vec::new(),
            billboards: Vec::new(),
        }
    }
}

impl<M> fmt::Debug for SceneOpaques<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneOpaques")
            .field("count", &self.visible.len())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("batches", &self.batches.len())
            .field("billboards", &self.billboards.len())
            .finish()
    }
}

impl<M: OpaqueMaterial> SceneOpaques<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered (instance, material) pairs across all groups.
    pub fn count(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Groups that currently hold at least one instance, ascending.
    pub fn groups(&self) -> impl Iterator<Item = Group> + '_ {
        self.groups.keys().copied()
    }

    /// Forget every instance, material, and group.
    pub fn reset(&mut self) {
        self.groups.clear();
        self.visible.clear();
        self.batches.clear();
        self.billboards.clear();
        tracing::trace!("opaques reset");
    }

    pub fn add_single(
        &mut self,
        instance: Arc<SingleInstance>,
        material: Arc<M>,
    ) -> Result<(), SceneError> {
        self.add_single_in_group(instance, material, Group::DEFAULT)
    }

    pub fn add_single_in_group(
        &mut self,
        instance: Arc<SingleInstance>,
        material: Arc<M>,
        group: Group,
    ) -> Result<(), SceneError> {
        self.mark_visible(instance.id, group)?;
        trace_add("single", instance.id, group, material.as_ref());
        self.groups
            .entry(group)
            .or_default()
            .singles
            .instances_for(&material)
            .push(instance);
        Ok(())
    }

    pub fn add_batched(
        &mut self,
        instance: Arc<BatchedInstance>,
        material: Arc<M>,
    ) -> Result<(), SceneError> {
        self.add_batched_in_group(instance, material, Group::DEFAULT)
    }

    /// Register a batch. The batch is also queued for the update pass that
    /// precedes group traversal.
    pub fn add_batched_in_group(
        &mut self,
        instance: Arc<BatchedInstance>,
        material: Arc<M>,
        group: Group,
    ) -> Result<(), SceneError> {
        self.mark_visible(instance.id(), group)?;
        trace_add("batched", instance.id(), group, material.as_ref());
        self.batches.push(Arc::clone(&instance));
        self.groups
            .entry(group)
            .or_default()
            .batched
            .instances_for(&material)
            .push(instance);
        Ok(())
    }

    pub fn add_billboarded(
        &mut self,
        instance: Arc<BillboardedInstance>,
        material: Arc<M>,
    ) -> Result<(), SceneError> {
        self.add_billboarded_in_group(instance, material, Group::DEFAULT)
    }

    pub fn add_billboarded_in_group(
        &mut self,
        instance: Arc<BillboardedInstance>,
        material: Arc<M>,
        group: Group,
    ) -> Result<(), SceneError> {
        self.mark_visible(instance.id(), group)?;
        trace_add("billboarded", instance.id(), group, material.as_ref());
        self.billboards.push(Arc::clone(&instance));
        self.groups
            .entry(group)
            .or_default()
            .billboarded
            .instances_for(&material)
            .push(instance);
        Ok(())
    }

    /// Replay the scene into `consumer`.
    ///
    /// Update passes for every batch and billboard set come first, then each
    /// group in ascending order: batched, billboarded, then single instances.
    pub fn execute<C>(&self, consumer: &mut C)
    where
        C: OpaquesConsumer<M> + ?Sized,
    {
        let _span = tracing::debug_span!("opaques_execute", count = self.count()).entered();

        consumer.on_start();

        for batch in &self.batches {
            consumer.on_instance_batched_update(batch);
        }
        for billboards in &self.billboards {
            consumer.on_instance_billboarded_update(billboards);
        }

        for (&group, entry) in &self.groups {
            consumer.on_start_group(group);
            if !entry.batched.is_empty() {
                execute_batched(&entry.batched, consumer);
            }
            if !entry.billboarded.is_empty() {
                execute_billboarded(&entry.billboarded, consumer);
            }
            if !entry.singles.is_empty() {
                execute_singles(&entry.singles, consumer);
            }
            consumer.on_finish_group(group);
        }

        consumer.on_finish();
    }

    fn mark_visible(&mut self, instance: InstanceId, group: Group) -> Result<(), SceneError> {
        if let Some(&existing) = self.visible.get(&instance) {
            return Err(SceneError::InstanceAlreadyVisible {
                instance,
                group: existing,
            });
        }
        self.visible.insert(instance, group);
        Ok(())
    }
}

fn trace_add<M: OpaqueMaterial>(kind: &str, instance: InstanceId, group: Group, material: &M) {
    tracing::trace!(
        kind,
        instance = instance.0,
        group = group.get(),
        material = material.material_id().0,
        shader = material.shader().shader_id().0,
        "opaque add"
    );
}

fn execute_batched<M, C>(bucket: &Bucket<M, Vec<Arc<BatchedInstance>>>, consumer: &mut C)
where
    M: OpaqueMaterial,
    C: OpaquesConsumer<M> + ?Sized,
{
    for shader_batch in &bucket.shaders {
        let Some(first) = shader_batch.materials.first() else {
            continue;
        };
        let shader = first.material.shader();
        consumer.on_instance_batched_shader_start(shader);
        for batch in &shader_batch.materials {
            let material = batch.material.as_ref();
            consumer.on_instance_batched_material_start(material);
            for instance in &batch.instances {
                consumer.on_instance_batched(material, instance);
            }
            consumer.on_instance_batched_material_finish(material);
        }
        consumer.on_instance_batched_shader_finish(shader);
    }
}

fn execute_billboarded<M, C>(bucket: &Bucket<M, Vec<Arc<BillboardedInstance>>>, consumer: &mut C)
where
    M: OpaqueMaterial,
    C: OpaquesConsumer<M> + ?Sized,
{
    for shader_batch in &bucket.shaders {
        let Some(first) = shader_batch.materials.first() else {
            continue;
        };
        let shader = first.material.shader();
        consumer.on_instance_billboarded_shader_start(shader);
        for batch in &shader_batch.materials {
            let material = batch.material.as_ref();
            consumer.on_instance_billboarded_material_start(material);
            for instance in &batch.instances {
                consumer.on_instance_billboarded(material, instance);
            }
            consumer.on_instance_billboarded_material_finish(material);
        }
        consumer.on_instance_billboarded_shader_finish(shader);
    }
}

fn execute_singles<M, C>(bucket: &Bucket<M, MeshRuns>, consumer: &mut C)
where
    M: OpaqueMaterial,
    C: OpaquesConsumer<M> + ?Sized,
{
    for shader_batch in &bucket.shaders {
        let Some(first) = shader_batch.materials.first() else {
            continue;
        };
        let shader = first.material.shader();
        consumer.on_instance_single_shader_start(shader);
        for batch in &shader_batch.materials {
            let material = batch.material.as_ref();
            consumer.on_instance_single_material_start(material);
            // One array bind per mesh.
            for run in &batch.instances.runs {
                let Some(head) = run.first() else {
                    continue;
                };
                consumer.on_instance_single_array_start(head);
                for instance in run {
                    consumer.on_instance_single(material, instance);
                }
            }
            consumer.on_instance_single_material_finish(material);
        }
        consumer.on_instance_single_shader_finish(shader);
    }
}
