use lumen_pool::{ImageDescription, TargetFactory};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fake factory refused to create {0:?}")]
pub struct FakeFactoryError(pub ImageDescription);

/// A target made by [`FakeTargetFactory`]. `serial` counts creations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeTarget {
    pub serial: u64,
    pub description: ImageDescription,
    pub reuses: u32,
}

/// Image target factory that allocates nothing and counts every call.
#[derive(Debug, Default)]
pub struct FakeTargetFactory {
    created: u64,
    destroyed: Vec<u64>,
    reused: u64,
    failing: bool,
}

impl FakeTargetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create` fails.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn creates(&self) -> u64 {
        self.created
    }

    pub fn destroys(&self) -> usize {
        self.destroyed.len()
    }

    /// Serials of destroyed targets, in destruction order.
    pub fn destroyed(&self) -> &[u64] {
        &self.destroyed
    }

    pub fn reuses(&self) -> u64 {
        self.reused
    }

    /// Targets created and not yet destroyed.
    pub fn live(&self) -> u64 {
        self.created - self.destroyed.len() as u64
    }
}

impl TargetFactory for FakeTargetFactory {
    type Description = ImageDescription;
    type Target = FakeTarget;
    type Error = FakeFactoryError;

    fn size_of(&self, description: &ImageDescription) -> u64 {
        description.size_bytes()
    }

    fn create(&mut self, description: &ImageDescription) -> Result<FakeTarget, FakeFactoryError> {
        if self.failing {
            return Err(FakeFactoryError(*description));
        }
        self.created += 1;
        Ok(FakeTarget {
            serial: self.created,
            description: *description,
            reuses: 0,
        })
    }

    fn destroy(&mut self, _description: ImageDescription, target: FakeTarget) {
        self.destroyed.push(target.serial);
    }

    fn on_reuse(&mut self, _description: &ImageDescription, target: &mut FakeTarget) {
        self.reused += 1;
        target.reuses += 1;
    }
}
