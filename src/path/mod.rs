//! # Swap Paths
//!
//! Packing of multi-hop routes into the byte layout the swap router reads:
//! 20-byte token addresses interleaved with 3-byte fee tiers, no padding.

/// Path packing and unpacking
pub mod codec;

pub use codec::{decode_path, encode_path, SwapRoute, TradeType};
