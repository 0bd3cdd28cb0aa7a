use serde::{Deserialize, Serialize};

use crate::error::PoolError;

const MIB: u64 = 1024 * 1024;

/// Byte budgets for a [`RenderTargetPool`](crate::RenderTargetPool).
///
/// Idle targets are kept while the pool's total stays within `soft_limit`.
/// The total never exceeds `hard_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub soft_limit: u64,
    pub hard_limit: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            soft_limit: 64 * MIB,
            hard_limit: 128 * MIB,
        }
    }
}

impl PoolConfig {
    pub fn new(soft_limit: u64, hard_limit: u64) -> Self {
        Self {
            soft_limit,
            hard_limit,
        }
    }

    /// A pool that keeps nothing idle.
    pub fn uncached(hard_limit: u64) -> Self {
        Self::new(0, hard_limit)
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.soft_limit > self.hard_limit {
            return Err(PoolError::InvalidLimits {
                soft: self.soft_limit,
                hard: self.hard_limit,
            });
        }
        Ok(())
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, PoolError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, PoolError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let c = PoolConfig::default();
        assert_eq!(c.soft_limit, 64 * MIB);
        assert_eq!(c.hard_limit, 128 * MIB);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn soft_above_hard_is_invalid() {
        assert!(matches!(
            PoolConfig::new(10, 5).validate(),
            Err(PoolError::InvalidLimits { soft: 10, hard: 5 })
        ));
        assert!(PoolConfig::uncached(0).validate().is_ok());
    }

    #[test]
    fn yaml_fills_missing_fields_from_default() {
        let c = PoolConfig::from_yaml_str("hard_limit: 268435456\n").unwrap();
        assert_eq!(c.hard_limit, 256 * MIB);
        assert_eq!(c.soft_limit, 64 * MIB);
    }

    #[test]
    fn json_round_trip_and_validation() {
        let c = PoolConfig::from_json_str(r#"{"soft_limit": 1, "hard_limit": 2}"#).unwrap();
        assert_eq!(c, PoolConfig::new(1, 2));

        assert!(matches!(
            PoolConfig::from_json_str(r#"{"soft_limit": 3, "hard_limit": 2}"#),
            Err(PoolError::InvalidLimits { .. })
        ));
    }

    #[test]
    fn parse_errors_keep_their_source() {
        let err = PoolConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, PoolError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid pool config JSON: "));

        let err = PoolConfig::from_yaml_str("soft_limit: [1, 2]\n").unwrap_err();
        assert!(matches!(err, PoolError::Yaml(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
