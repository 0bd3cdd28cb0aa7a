//! Render target pool.
//!
//! Scratch render targets are expensive to create, so released targets are
//! kept idle and handed out again to the next request with the same
//! description. Two byte budgets bound the pool: idle targets are trimmed
//! down to the soft limit on release, and acquisitions that would pass the
//! hard limit fail.
//!
//! # Invariants
//! - `current_total_bytes() <= hard_limit()` at all times.
//! - Targets on loan are never evicted.
//! - A target is released at most once per loan.

mod config;
mod description;
mod error;
mod pool;

pub use config::PoolConfig;
pub use description::{ImageDescription, ImageFormat};
pub use error::PoolError;
pub use pool::{PoolStats, RenderTargetPool, TargetFactory, TargetId};

pub fn crate_info() -> &'static str {
    "lumen-pool v0.1.0"
}
