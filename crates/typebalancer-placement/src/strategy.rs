//! Strategy selection and the `Balancer` builder

use crate::distributor::Distributor;
use crate::extract::{AccessorCache, TypeAccessor};
use crate::sliding_window::SlidingWindow;
use serde_json::Value;
use tracing::debug;
use typebalancer_common::config::{DEFAULT_BATCH_SIZE, DEFAULT_MIN_RATIO};
use typebalancer_common::{BalancerConfig, GapFillKind, Result, StrategyKind};

/// Balancing strategy
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Strategy {
    /// Global ratio placement over the whole sequence
    Distributor(Distributor),
    /// Window-by-window placement inside batches
    SlidingWindow(SlidingWindow),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Distributor(Distributor::default())
    }
}

impl Strategy {
    /// Build the strategy a configuration selects
    #[must_use]
    pub fn from_config(config: &BalancerConfig) -> Self {
        match config.effective_strategy() {
            StrategyKind::Distributor => {
                Self::Distributor(Distributor::new(config.min_ratio, config.gap_fill))
            }
            StrategyKind::SlidingWindow => Self::SlidingWindow(SlidingWindow::new(
                config.effective_window_size(),
                config.batch_size,
            )),
        }
    }

    /// Kind of this strategy
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Distributor(_) => StrategyKind::Distributor,
            Self::SlidingWindow(_) => StrategyKind::SlidingWindow,
        }
    }

    /// Balance `items` with this strategy
    ///
    /// # Errors
    /// `EmptyCollection`, `MissingType` or `UnknownType`.
    pub fn balance<T, A>(
        &self,
        items: Vec<T>,
        accessor: &A,
        type_order: Option<&[String]>,
    ) -> Result<Vec<T>>
    where
        A: TypeAccessor<T> + ?Sized,
    {
        debug!(strategy = %self.kind(), items = items.len(), "balancing");
        match self {
            Self::Distributor(d) => d.balance(items, accessor, type_order),
            Self::SlidingWindow(w) => w.balance(items, accessor, type_order),
        }
    }
}

/// Builder over [`BalancerConfig`].
///
/// ```
/// use typebalancer_placement::Balancer;
/// use typebalancer_common::Result;
///
/// fn kind(item: &&str) -> Result<String> {
///     Ok(item[..5].to_string())
/// }
///
/// let items = vec!["video:1", "video:2", "image:1"];
///
/// let balanced = Balancer::new()
///     .type_order(["image", "video"])
///     .balance(items, &kind)
///     .unwrap();
/// assert_eq!(balanced[0], "image:1");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Balancer {
    config: BalancerConfig,
}

impl Balancer {
    /// Balancer with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balancer from an existing configuration
    #[must_use]
    pub const fn from_config(config: BalancerConfig) -> Self {
        Self { config }
    }

    /// Explicit type priority
    #[must_use]
    pub fn type_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.type_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Use the sliding window strategy with this window size
    #[must_use]
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.config.window_size = Some(window_size);
        self
    }

    /// Batch size for the sliding window strategy
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Minimum share per present type
    #[must_use]
    pub fn min_ratio(mut self, min_ratio: f64) -> Self {
        self.config.min_ratio = min_ratio;
        self
    }

    /// Gap filler for the distributor
    #[must_use]
    pub fn gap_fill(mut self, gap_fill: GapFillKind) -> Self {
        self.config.gap_fill = gap_fill;
        self
    }

    /// Select a strategy by kind
    #[must_use]
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Validate the configuration and balance `items`
    ///
    /// # Errors
    /// `Configuration` for invalid settings, otherwise as
    /// [`Strategy::balance`].
    pub fn balance<T, A>(&self, items: Vec<T>, accessor: &A) -> Result<Vec<T>>
    where
        A: TypeAccessor<T> + ?Sized,
    {
        self.config.validate()?;
        Strategy::from_config(&self.config).balance(
            items,
            accessor,
            self.config.type_order.as_deref(),
        )
    }

    /// Balance JSON objects by the value under `field`, taking the accessor
    /// from the caller's `accessors` table
    ///
    /// # Errors
    /// As [`balance`](Self::balance).
    pub fn balance_by_field(
        &self,
        items: Vec<Value>,
        field: &str,
        accessors: &mut AccessorCache,
    ) -> Result<Vec<Value>> {
        self.balance(items, accessors.get(field))
    }
}

/// Balance `items` by the tag `type_of` resolves.
///
/// Without `window_size` the distributor runs over the whole sequence; with
/// it, the sliding window strategy runs with the default batch size.
///
/// # Errors
/// `EmptyCollection`, `MissingType` or `UnknownType`.
pub fn balance<T, A>(
    items: Vec<T>,
    type_of: &A,
    type_order: Option<&[String]>,
    window_size: Option<usize>,
) -> Result<Vec<T>>
where
    A: TypeAccessor<T> + ?Sized,
{
    let strategy = match window_size {
        Some(size) => Strategy::SlidingWindow(SlidingWindow::new(size, DEFAULT_BATCH_SIZE)),
        None => Strategy::Distributor(Distributor::new(DEFAULT_MIN_RATIO, GapFillKind::default())),
    };
    strategy.balance(items, type_of, type_order)
}
