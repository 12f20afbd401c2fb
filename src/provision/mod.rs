//! # Pool Provisioning
//!
//! Drives a pool through `NotFound -> Initialized -> LiquidityAdded`:
//! create and price the pool, size a position against the confirmed
//! on-chain state, approve the position manager and mint. Batches run one
//! pool at a time and stop at the first failure.

/// Pipeline driver
pub mod pool;
/// Batch file and mint policy
pub mod request;
/// Pipeline states
pub mod state;

pub use pool::{BatchFailure, BatchOutcome, PoolProvisioner};
pub use request::{PoolRequest, ProvisionBatch, Slippage};
pub use state::{PoolPlan, ProvisionOutcome, ProvisionState};
