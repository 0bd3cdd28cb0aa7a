use glam::{Mat4, Vec3};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::{InstanceId, MeshHandle};

/// A single renderable: one mesh, one transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleInstance {
    pub id: InstanceId,
    pub mesh: MeshHandle,
    pub transform: Mat4,
}

impl SingleInstance {
    pub fn new(id: InstanceId, mesh: MeshHandle, transform: Mat4) -> Self {
        Self {
            id,
            mesh,
            transform,
        }
    }
}

/// Many logical instances of one mesh drawn with one draw call.
///
/// Members live in slots of a growable transform buffer. Free slots are
/// reused lowest-first; when every slot is taken the buffer doubles. Any
/// mutation raises the update flag, which the back end clears after it has
/// uploaded the buffer.
#[derive(Debug)]
pub struct BatchedInstance {
    id: InstanceId,
    mesh: MeshHandle,
    slots: Vec<Option<Mat4>>,
    free: BTreeSet<usize>,
    update_required: AtomicBool,
}

impl BatchedInstance {
    pub fn new(id: InstanceId, mesh: MeshHandle, initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        Self {
            id,
            mesh,
            slots: vec![None; capacity],
            free: (0..capacity).collect(),
            update_required: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Number of slots in the transform buffer.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Enable a member with the given transform, returning its slot.
    pub fn enable(&mut self, transform: Mat4) -> usize {
        let slot = match self.free.pop_first() {
            Some(slot) => slot,
            None => self.grow(),
        };
        self.slots[slot] = Some(transform);
        self.mark_dirty();
        slot
    }

    /// Replace the transform of an enabled member. Returns false if the slot
    /// is not enabled.
    pub fn set(&mut self, slot: usize, transform: Mat4) -> bool {
        match self.slots.get_mut(slot) {
            Some(Some(t)) => {
                *t = transform;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Disable a member. Returns false if the slot was not enabled.
    pub fn disable(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry @ Some(_)) => {
                *entry = None;
                self.free.insert(slot);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub fn disable_all(&mut self) {
        for slot in 0..self.slots.len() {
            self.slots[slot] = None;
            self.free.insert(slot);
        }
        self.mark_dirty();
    }

    /// Enabled members in slot order.
    pub fn transforms(&self) -> impl Iterator<Item = (usize, &Mat4)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, t)| t.as_ref().map(|t| (slot, t)))
    }

    /// The full buffer contents ready for upload. Disabled slots are zero
    /// matrices, which collapse to nothing when drawn.
    pub fn packed_transforms(&self) -> Vec<Mat4> {
        self.slots.iter().map(|t| t.unwrap_or(Mat4::ZERO)).collect()
    }

    pub fn update_required(&self) -> bool {
        self.update_required.load(Ordering::Relaxed)
    }

    /// Clear the update flag once the buffer has been uploaded.
    pub fn mark_updated(&self) {
        self.update_required.store(false, Ordering::Relaxed);
    }

    fn mark_dirty(&self) {
        self.update_required.store(true, Ordering::Relaxed);
    }

    fn grow(&mut self) -> usize {
        let old = self.slots.len();
        let new = old * 2;
        tracing::trace!(instance = self.id.0, old, new, "growing batch");
        self.slots.resize(new, None);
        self.free.extend(old + 1..new);
        old
    }
}

/// A camera-facing sprite within a billboarded instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    pub position: Vec3,
    pub scale: f32,
    pub rotation: f32,
}

/// A set of billboards sharing one mesh, drawn with one draw call.
#[derive(Debug)]
pub struct BillboardedInstance {
    id: InstanceId,
    mesh: MeshHandle,
    billboards: Vec<Billboard>,
    update_required: AtomicBool,
}

impl BillboardedInstance {
    pub fn new(id: InstanceId, mesh: MeshHandle) -> Self {
        Self {
            id,
            mesh,
            billboards: Vec::new(),
            update_required: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn push(&mut self, billboard: Billboard) {
        self.billboards.push(billboard);
        self.update_required.store(true, Ordering::Relaxed);
    }

    pub fn clear(&mut self) {
        self.billboards.clear();
        self.update_required.store(true, Ordering::Relaxed);
    }

    pub fn billboards(&self) -> &[Billboard] {
        &self.billboards
    }

    pub fn len(&self) -> usize {
        self.billboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.billboards.is_empty()
    }

    pub fn update_required(&self) -> bool {
        self.update_required.load(Ordering::Relaxed)
    }

    pub fn mark_updated(&self) {
        self.update_required.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(capacity: usize) -> BatchedInstance {
        BatchedInstance::new(InstanceId(1), MeshHandle(7), capacity)
    }

    #[test]
    fn batch_fills_lowest_free_slot() {
        let mut b = batch(4);
        assert_eq!(b.enable(Mat4::IDENTITY), 0);
        assert_eq!(b.enable(Mat4::IDENTITY), 1);
        assert!(b.disable(0));
        assert_eq!(b.enable(Mat4::IDENTITY), 0);
        assert_eq!(b.enabled_count(), 2);
    }

    #[test]
    fn batch_grows_by_doubling_when_full() {
        let mut b = batch(2);
        b.enable(Mat4::IDENTITY);
        b.enable(Mat4::IDENTITY);
        assert_eq!(b.enable(Mat4::IDENTITY), 2);
        assert_eq!(b.capacity(), 4);
        assert_eq!(b.enable(Mat4::IDENTITY), 3);
        assert_eq!(b.enabled_count(), 4);
    }

    #[test]
    fn batch_zero_capacity_is_clamped() {
        let b = batch(0);
        assert_eq!(b.capacity(), 1);
    }

    #[test]
    fn batch_update_flag_tracks_mutation() {
        let mut b = batch(2);
        assert!(b.update_required());
        b.mark_updated();
        assert!(!b.update_required());

        let slot = b.enable(Mat4::IDENTITY);
        assert!(b.update_required());
        b.mark_updated();

        assert!(b.set(slot, Mat4::from_translation(Vec3::X)));
        assert!(b.update_required());
        b.mark_updated();

        assert!(!b.set(1, Mat4::IDENTITY));
        assert!(!b.disable(1));
        assert!(!b.update_required());
    }

    #[test]
    fn batch_packed_transforms_zero_disabled_slots() {
        let mut b = batch(3);
        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        b.enable(Mat4::IDENTITY);
        b.enable(t);
        b.disable(0);

        let packed = b.packed_transforms();
        assert_eq!(packed.len(), 3);
        assert_eq!(packed[0], Mat4::ZERO);
        assert_eq!(packed[1], t);

        let enabled: Vec<usize> = b.transforms().map(|(slot, _)| slot).collect();
        assert_eq!(enabled, vec![1]);
    }

    #[test]
    fn batch_disable_all() {
        let mut b = batch(2);
        b.enable(Mat4::IDENTITY);
        b.enable(Mat4::IDENTITY);
        b.disable_all();
        assert_eq!(b.enabled_count(), 0);
        assert_eq!(b.enable(Mat4::IDENTITY), 0);
    }

    #[test]
    fn billboards_push_and_clear() {
        let mut b = BillboardedInstance::new(InstanceId(3), MeshHandle(1));
        b.mark_updated();
        b.push(Billboard {
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: 0.0,
        });
        assert_eq!(b.len(), 1);
        assert!(b.update_required());
        b.clear();
        assert!(b.is_empty());
    }
}
