use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a renderable instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// Unique identifier for a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

/// Unique identifier for a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderId(pub u64);

/// Opaque handle naming a set of vertex/index buffers.
///
/// Only used as a grouping key. Nothing in the core ever looks inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance {}", self.0)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material {}", self.0)
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader {}", self.0)
    }
}

impl fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh {}", self.0)
    }
}

/// Errors from group construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("group {value} is out of range (valid groups are 1..={max})")]
    OutOfRange { value: u32, max: u8 },
}

/// A priority bucket controlling coarse draw ordering.
///
/// Groups are traversed in ascending numeric order. Group 0 is reserved, so
/// valid groups are `1..=Group::MAXIMUM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Group(u8);

impl Group {
    /// The highest usable group.
    pub const MAXIMUM: u8 = 15;

    /// The group used when no group is specified.
    pub const DEFAULT: Group = Group(1);

    pub fn new(value: u32) -> Result<Self, GroupError> {
        if value == 0 || value > Self::MAXIMUM as u32 {
            return Err(GroupError::OutOfRange {
                value,
                max: Self::MAXIMUM,
            });
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid group in traversal order.
    pub fn all() -> impl Iterator<Item = Group> {
        (1..=Self::MAXIMUM).map(Group)
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Group {
    type Error = GroupError;

    fn try_from(value: u32) -> Result<Self, GroupError> {
        Group::new(value)
    }
}

impl From<Group> for u32 {
    fn from(group: Group) -> u32 {
        u32::from(group.0)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// Allocator of fresh identifiers.
///
/// Ids are strictly increasing and never handed out twice by the same pool.
#[derive(Debug, Default)]
pub struct IdPool {
    next: u64,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn fresh_instance(&mut self) -> InstanceId {
        InstanceId(self.fresh())
    }

    pub fn fresh_material(&mut self) -> MaterialId {
        MaterialId(self.fresh())
    }

    pub fn fresh_shader(&mut self) -> ShaderId {
        ShaderId(self.fresh())
    }
}
