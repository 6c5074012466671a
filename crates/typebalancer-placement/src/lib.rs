//! TypeBalancer Placement - type-aware ordering of item sequences
//!
//! This crate reorders a sequence of tagged items so that every type is
//! spread across the output in proportion to its share, instead of arriving
//! in clumps. Items are opaque: only their type tag, resolved through a
//! [`TypeAccessor`], is ever inspected.
//!
//! # Strategies
//!
//! ## Distributor (default)
//! Global placement: each type in priority order claims evenly spaced slots
//! over the whole sequence, and leftovers fill the remaining gaps.
//!
//! ## Sliding window
//! Local placement for long inputs: contiguous batches are balanced one
//! fixed-size window at a time against per-window targets.
//!
//! # Example
//! ```
//! use serde_json::json;
//! use typebalancer_placement::{balance, FieldAccessor};
//!
//! let items = vec![
//!     json!({"id": 1, "type": "video"}),
//!     json!({"id": 2, "type": "video"}),
//!     json!({"id": 3, "type": "image"}),
//! ];
//! let order = vec!["image".to_string(), "video".to_string()];
//!
//! let balanced = balance(items, &FieldAccessor::new("type"), Some(order.as_slice()), None).unwrap();
//! assert_eq!(balanced[0]["type"], "image");
//! ```

pub mod distributor;
pub mod extract;
pub mod gap_fill;
pub mod grouping;
pub mod position;
pub mod quality;
pub mod ratio;
pub mod sliding_window;
pub mod slots;
pub mod strategy;

pub use distributor::Distributor;
pub use extract::{AccessorCache, FieldAccessor, TypeAccessor};
pub use gap_fill::{AlternatingFiller, GapFiller, SequentialFiller};
pub use grouping::TypeGroups;
pub use position::calculate_positions;
pub use quality::{DistributionReport, TypeStats};
pub use ratio::{RatioCalculator, window_targets};
pub use sliding_window::SlidingWindow;
pub use slots::SlotArray;
pub use strategy::{Balancer, Strategy, balance};
