//! # Position Sizing
//!
//! Derives a concentrated liquidity position from a single desired token
//! amount. The counterpart amount follows from the pool's current price and
//! the tick range chosen around it.

/// Position sizer
pub mod sizer;

pub use sizer::{size_position, PositionRequest, TickWidth};
