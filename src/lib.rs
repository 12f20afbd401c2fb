/*!
 * # Sprout - Concentrated Liquidity Pool Seeding
 *
 * Sprout computes the inputs a concentrated-liquidity AMM expects and drives
 * the on-chain calls that create, price and seed new pools.
 *
 * ## Core Features
 *
 * - **Fixed Point Prices**: Exact Q64.96 square-root price encoding from reserve ratios
 * - **Pair Ordering**: Canonical token0/token1 ordering required by the pool factory
 * - **Position Sizing**: Tick range and deposit amounts from a single-sided amount
 * - **Swap Paths**: Byte-exact packing of multi-hop router paths
 * - **Provisioning**: Create -> initialize -> approve -> mint, one pool at a time
 *
 * ## Module Structure
 *
 * - `chain`: Chain client trait and its `alloy` implementation
 * - `config`: Environment configuration and the deployment registry
 * - `error`: Invalid-input error taxonomy
 * - `liquidity`: Position sizing
 * - `math`: Tick, price and liquidity math
 * - `models`: Tokens, fee tiers, pairs, pools and positions
 * - `path`: Swap path codec
 * - `provision`: Pool provisioning pipeline
 * - `utils`: Logging and CLI context
 */

/// Chain access
pub mod chain;
/// Configuration and deployment registry
pub mod config;
/// Engine errors
pub mod error;
/// Position sizing
pub mod liquidity;
/// Fixed point pool math
pub mod math;
/// Domain types
pub mod models;
/// Swap path codec
pub mod path;
/// Pool provisioning
pub mod provision;
/// Utility functions and helpers
pub mod utils;

#[cfg(test)]
#[allow(clippy::unwrap_used, missing_docs)]
mod test_helpers;
