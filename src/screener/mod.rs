//! Price-surge screening.
//!
//! - [`consumer`] - The polling loop and its control handle
//! - [`cooldown`] - Per-symbol alert spacing
//! - [`price_change`] - Windowed change calculation
//! - [`producer`] - The candle source the loop polls

pub mod consumer;
pub mod cooldown;
pub mod price_change;
pub mod producer;

pub use consumer::{
    Consumer, ConsumerHandle, ConsumerOptions, ConsumerState, TickOutcome, TickStats,
};
pub use cooldown::CooldownTracker;
pub use price_change::{PriceChange, calculate};
pub use producer::{Producer, Snapshot};
