//! Configuration types for TypeBalancer
//!
//! This module defines the knobs a caller can set on a balance call.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of items processed per batch by the sliding window strategy
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default window size used when the sliding window strategy is selected by
/// name without an explicit window size
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default minimum share granted to every present type
pub const DEFAULT_MIN_RATIO: f64 = 0.1;

/// Root configuration for a balance call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Balancing strategy
    pub strategy: StrategyKind,
    /// Window size; when set, forces the sliding window strategy
    pub window_size: Option<usize>,
    /// Items per batch for the sliding window strategy
    pub batch_size: usize,
    /// Minimum ratio floor per present type
    pub min_ratio: f64,
    /// Explicit type order (earlier entries get placement priority)
    pub type_order: Option<Vec<String>>,
    /// Gap filler used by the distributor for leftover items
    pub gap_fill: GapFillKind,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            window_size: None,
            batch_size: DEFAULT_BATCH_SIZE,
            min_ratio: DEFAULT_MIN_RATIO,
            type_order: None,
            gap_fill: GapFillKind::default(),
        }
    }
}

impl BalancerConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::configuration("batch_size must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.min_ratio) {
            return Err(Error::configuration(format!(
                "min_ratio must be in [0, 1), got {}",
                self.min_ratio
            )));
        }
        if let Some(order) = &self.type_order {
            let mut seen = std::collections::HashSet::new();
            for name in order {
                if name.trim().is_empty() {
                    return Err(Error::configuration("type_order contains a blank type"));
                }
                if !seen.insert(name.as_str()) {
                    return Err(Error::configuration(format!(
                        "type_order lists '{name}' more than once"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Strategy that will actually run: an explicit window size always
    /// selects the sliding window
    #[must_use]
    pub fn effective_strategy(&self) -> StrategyKind {
        if self.window_size.is_some() {
            StrategyKind::SlidingWindow
        } else {
            self.strategy
        }
    }

    /// Window size with the documented clamp to at least 1
    #[must_use]
    pub fn effective_window_size(&self) -> usize {
        self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE).max(1)
    }
}

/// Balancing strategy selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Global ratio placement with gap filling
    #[default]
    Distributor,
    /// Local balancing over fixed-size windows and batches
    SlidingWindow,
}

impl StrategyKind {
    /// Get the strategy name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Distributor => "distributor",
            Self::SlidingWindow => "sliding_window",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "distributor" | "default" | "" => Ok(Self::Distributor),
            "sliding_window" | "sliding-window" | "window" => Ok(Self::SlidingWindow),
            _ => Err(Error::configuration(format!("unknown strategy: {s}"))),
        }
    }
}

/// Gap filling strategy for leftover items
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapFillKind {
    /// Round-robin across all leftover groups
    #[default]
    Sequential,
    /// Strict alternation between a primary and a secondary group
    Alternating,
}

impl GapFillKind {
    /// Get the filler name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Alternating => "alternating",
        }
    }
}

impl std::fmt::Display for GapFillKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for GapFillKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sequential" | "round_robin" | "round-robin" | "" => Ok(Self::Sequential),
            "alternating" | "alternate" => Ok(Self::Alternating),
            _ => Err(Error::configuration(format!("unknown gap filler: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BalancerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_strategy(), StrategyKind::Distributor);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_window_size_forces_sliding_window() {
        let config = BalancerConfig {
            window_size: Some(0),
            ..BalancerConfig::default()
        };
        assert_eq!(config.effective_strategy(), StrategyKind::SlidingWindow);
        assert_eq!(config.effective_window_size(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_batch = BalancerConfig {
            batch_size: 0,
            ..BalancerConfig::default()
        };
        assert!(matches!(zero_batch.validate(), Err(Error::Configuration(_))));

        let bad_floor = BalancerConfig {
            min_ratio: 1.0,
            ..BalancerConfig::default()
        };
        assert!(bad_floor.validate().is_err());

        let duplicate_order = BalancerConfig {
            type_order: Some(vec!["video".into(), "image".into(), "video".into()]),
            ..BalancerConfig::default()
        };
        assert!(duplicate_order.validate().is_err());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("window".parse::<StrategyKind>().unwrap(), StrategyKind::SlidingWindow);
        assert_eq!(
            "Sliding-Window".parse::<StrategyKind>().unwrap(),
            StrategyKind::SlidingWindow
        );
        assert_eq!("default".parse::<StrategyKind>().unwrap(), StrategyKind::Distributor);
        assert!("random".parse::<StrategyKind>().is_err());
        assert_eq!("alternate".parse::<GapFillKind>().unwrap(), GapFillKind::Alternating);
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config: BalancerConfig = toml::from_str(
            r#"
            strategy = "sliding_window"
            window_size = 5
            type_order = ["video", "image"]
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy, StrategyKind::SlidingWindow);
        assert_eq!(config.window_size, Some(5));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.gap_fill, GapFillKind::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_json_round_trip_names() {
        let config = BalancerConfig {
            gap_fill: GapFillKind::Alternating,
            ..BalancerConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["gap_fill"], "alternating");
        assert_eq!(json["strategy"], "distributor");
    }
}
