//! Domain types shared by the engine components

/// Fee tiers
pub mod fee;
/// Canonically ordered token pairs
pub mod pair;
/// Pool state snapshots
pub mod pool;
/// Liquidity positions
pub mod position;
/// Token descriptors and unit conversion
pub mod token;
