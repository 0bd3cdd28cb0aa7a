use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::config::PoolConfig;
use crate::error::PoolError;

/// Creates, sizes, and destroys the targets a pool manages.
#[allow(unused_variables)]
pub trait TargetFactory {
    type Description: Clone + Eq + Hash + fmt::Debug;
    type Target;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Size in bytes a target of `description` occupies.
    fn size_of(&self, description: &Self::Description) -> u64;

    fn create(&mut self, description: &Self::Description) -> Result<Self::Target, Self::Error>;

    fn destroy(&mut self, description: Self::Description, target: Self::Target);

    /// Called when an idle target is handed out again.
    fn on_reuse(&mut self, description: &Self::Description, target: &mut Self::Target) {}
}

/// Handle to a target owned by a pool. Never reused within one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(u64);

impl TargetId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target {}", self.0)
    }
}

/// Cumulative pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub evicted: u64,
    pub destroyed_on_teardown: u64,
}

struct Entry<D, T> {
    description: D,
    target: T,
    size: u64,
    /// Position in the idle order while idle; `None` while on loan.
    idle_at: Option<u64>,
}

/// A bounded cache of render targets.
///
/// Released targets stay idle for reuse while the pool's total size is at or
/// below the soft limit; beyond it, the oldest idle targets are destroyed.
/// Acquisitions that would take the total past the hard limit fail.
///
/// Targets are not destroyed when the pool is dropped; call
/// [`teardown`](Self::teardown) first.
pub struct RenderTargetPool<F: TargetFactory> {
    factory: F,
    config: PoolConfig,
    targets: HashMap<TargetId, Entry<F::Description, F::Target>>,
    /// Every idle target keyed by when it went idle, oldest first.
    idle: BTreeMap<u64, TargetId>,
    /// Idle targets per description, oldest first.
    idle_by_description: HashMap<F::Description, VecDeque<TargetId>>,
    total_bytes: u64,
    next_id: u64,
    next_idle: u64,
    stats: PoolStats,
}

impl<F: TargetFactory> fmt::Debug for RenderTargetPool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTargetPool")
            .field("config", &self.config)
            .field("total_bytes", &self.total_bytes)
            .field("idle", &self.idle.len())
            .field("on_loan", &self.on_loan_count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<F: TargetFactory> RenderTargetPool<F> {
    pub fn new(factory: F, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            factory,
            config,
            targets: HashMap::new(),
            idle: BTreeMap::new(),
            idle_by_description: HashMap::new(),
            total_bytes: 0,
            next_id: 0,
            next_idle: 0,
            stats: PoolStats::default(),
        })
    }

    /// Borrow a target matching `description`, reusing an idle one if
    /// possible.
    pub fn acquire(&mut self, description: &F::Description) -> Result<TargetId, PoolError> {
        if let Some(id) = self.take_idle(description) {
            if let Some(entry) = self.targets.get_mut(&id) {
                if let Some(at) = entry.idle_at.take() {
                    self.idle.remove(&at);
                }
                self.factory.on_reuse(&entry.description, &mut entry.target);
                self.stats.reused += 1;
                tracing::trace!(%id, ?description, "reusing pooled target");
                return Ok(id);
            }
        }

        let size = self.factory.size_of(description);
        if self.total_bytes.saturating_add(size) > self.config.hard_limit {
            tracing::debug!(
                requested = size,
                current = self.total_bytes,
                hard_limit = self.config.hard_limit,
                "pool exhausted"
            );
            return Err(PoolError::Exhausted {
                requested: size,
                current: self.total_bytes,
                hard_limit: self.config.hard_limit,
            });
        }

        let target = self
            .factory
            .create(description)
            .map_err(|e| PoolError::Factory(Box::new(e)))?;

        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(
            id,
            Entry {
                description: description.clone(),
                target,
                size,
                idle_at: None,
            },
        );
        self.total_bytes += size;
        self.stats.created += 1;
        tracing::debug!(%id, ?description, size, total = self.total_bytes, "created pooled target");
        Ok(id)
    }

    /// Return a target to the pool, then trim idle targets down to the soft
    /// limit.
    pub fn release(&mut self, id: TargetId) -> Result<(), PoolError> {
        let at = self.next_idle;
        match self.targets.get_mut(&id) {
            Some(entry) if entry.idle_at.is_none() => {
                entry.idle_at = Some(at);
                self.idle_by_description
                    .entry(entry.description.clone())
                    .or_default()
                    .push_back(id);
            }
            _ => return Err(PoolError::NotOnLoan(id)),
        }
        self.next_idle += 1;
        self.idle.insert(at, id);
        tracing::trace!(%id, "released pooled target");
        self.evict_to_soft_limit();
        Ok(())
    }

    /// Destroy every target, idle or on loan. Outstanding ids become stale.
    pub fn teardown(&mut self) {
        let count = self.targets.len();
        for (_, entry) in self.targets.drain() {
            self.factory.destroy(entry.description, entry.target);
        }
        self.idle.clear();
        self.idle_by_description.clear();
        self.total_bytes = 0;
        self.stats.destroyed_on_teardown += count as u64;
        tracing::debug!(count, "pool teardown");
    }

    pub fn get(&self, id: TargetId) -> Option<&F::Target> {
        self.targets.get(&id).map(|e| &e.target)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut F::Target> {
        self.targets.get_mut(&id).map(|e| &mut e.target)
    }

    pub fn description(&self, id: TargetId) -> Option<&F::Description> {
        self.targets.get(&id).map(|e| &e.description)
    }

    pub fn is_on_loan(&self, id: TargetId) -> bool {
        self.targets.get(&id).is_some_and(|e| e.idle_at.is_none())
    }

    pub fn current_total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn soft_limit(&self) -> u64 {
        self.config.soft_limit
    }

    pub fn hard_limit(&self) -> u64 {
        self.config.hard_limit
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn on_loan_count(&self) -> usize {
        self.targets.len() - self.idle.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn evict_to_soft_limit(&mut self) {
        while self.total_bytes > self.config.soft_limit {
            let Some((_, id)) = self.idle.pop_first() else {
                break;
            };
            if let Some(entry) = self.targets.remove(&id) {
                self.forget_idle(&entry.description, id);
                self.total_bytes -= entry.size;
                self.stats.evicted += 1;
                tracing::trace!(%id, description = ?entry.description, total = self.total_bytes, "evicting pooled target");
                self.factory.destroy(entry.description, entry.target);
            }
        }
    }

    /// Most recently idled target for `description`.
    fn take_idle(&mut self, description: &F::Description) -> Option<TargetId> {
        let queue = self.idle_by_description.get_mut(description)?;
        let id = queue.pop_back();
        if queue.is_empty() {
            self.idle_by_description.remove(description);
        }
        id
    }

    /// Drop an evicted target from its description's queue. Eviction is
    /// oldest first, so it sits at the front.
    fn forget_idle(&mut self, description: &F::Description, id: TargetId) {
        if let Some(queue) = self.idle_by_description.get_mut(description) {
            if queue.front() == Some(&id) {
                queue.pop_front();
            } else {
                queue.retain(|other| *other != id);
            }
            if queue.is_empty() {
                self.idle_by_description.remove(description);
            }
        }
    }
}
