use std::fmt::{self, Debug, Display};

use alloy::primitives::{Address, Bytes};
use itertools::Itertools;

use crate::error::EngineError;
use crate::models::fee::FeeTier;

/// Bytes per packed token address
const ADDRESS_SIZE: usize = 20;
/// Bytes per packed fee, big-endian
const FEE_SIZE: usize = 3;
/// One fee followed by the next token
const HOP_SIZE: usize = FEE_SIZE + ADDRESS_SIZE;

/// Which side of a trade is fixed.
///
/// The router reads exact-input and exact-output paths in opposite
/// traversal order, so the packed bytes differ by direction.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum TradeType {
    /// The input amount is fixed; packed path is reversed
    ExactInput,
    /// The output amount is fixed; packed path is in route order
    ExactOutput,
}

impl TradeType {
    /// `ExactInput` if `is_exact_input`, `ExactOutput` otherwise
    #[must_use]
    pub const fn from_exact_input(is_exact_input: bool) -> Self {
        if is_exact_input {
            Self::ExactInput
        } else {
            Self::ExactOutput
        }
    }
}

impl Debug for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactInput => write!(f, "exact-in"),
            Self::ExactOutput => write!(f, "exact-out"),
        }
    }
}

impl Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An ordered route: `tokens[i] -> tokens[i + 1]` through a pool of `fees[i]`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwapRoute {
    /// At least two tokens, in route order
    tokens: Vec<Address>,
    /// One tier per hop
    fees: Vec<FeeTier>,
}

impl SwapRoute {
    /// Creates a route.
    ///
    /// Adjacent tokens are not checked for equality.
    ///
    /// # Errors
    /// * `PathTooShort` if fewer than two tokens are given
    /// * `PathLengthMismatch` unless `fees.len() == tokens.len() - 1`
    pub fn new(tokens: Vec<Address>, fees: Vec<FeeTier>) -> Result<Self, EngineError> {
        if tokens.len() < 2 {
            return Err(EngineError::PathTooShort {
                tokens: tokens.len(),
            });
        }
        if fees.len() != tokens.len() - 1 {
            return Err(EngineError::PathLengthMismatch {
                tokens: tokens.len(),
                fees: fees.len(),
            });
        }
        Ok(Self { tokens, fees })
    }

    /// Route tokens, first to last
    #[must_use]
    pub fn tokens(&self) -> &[Address] {
        &self.tokens
    }

    /// Per-hop fee tiers
    #[must_use]
    pub fn fees(&self) -> &[FeeTier] {
        &self.fees
    }

    /// Packs the route for the router.
    ///
    /// For `ExactInput` the interleaved token/fee sequence is reversed before
    /// packing.
    #[must_use]
    pub fn encode(&self, trade_type: TradeType) -> Bytes {
        let mut tokens = self.tokens.clone();
        let mut fees = self.fees.clone();
        if trade_type == TradeType::ExactInput {
            tokens.reverse();
            fees.reverse();
        }

        let mut packed = Vec::with_capacity(ADDRESS_SIZE + fees.len() * HOP_SIZE);
        packed.extend_from_slice(tokens[0].as_slice());
        for (fee, token) in fees.iter().zip(&tokens[1..]) {
            packed.extend_from_slice(&fee.to_be_bytes());
            packed.extend_from_slice(token.as_slice());
        }
        Bytes::from(packed)
    }

    /// Unpacks router path bytes produced for `trade_type` back into route
    /// order.
    ///
    /// # Errors
    /// * `MalformedPath` unless the length is `20 + 23 * hops` with `hops >= 1`
    /// * `UnsupportedFee` if a fee field is not a known tier
    pub fn decode(path: &[u8], trade_type: TradeType) -> Result<Self, EngineError> {
        if path.len() < ADDRESS_SIZE + HOP_SIZE || (path.len() - ADDRESS_SIZE) % HOP_SIZE != 0 {
            return Err(EngineError::MalformedPath(path.len()));
        }

        let mut tokens = vec![Address::from_slice(&path[..ADDRESS_SIZE])];
        let mut fees = Vec::new();
        for hop in path[ADDRESS_SIZE..].chunks_exact(HOP_SIZE) {
            let fee = u32::from_be_bytes([0, hop[0], hop[1], hop[2]]);
            fees.push(FeeTier::try_from(fee)?);
            tokens.push(Address::from_slice(&hop[FEE_SIZE..]));
        }

        if trade_type == TradeType::ExactInput {
            tokens.reverse();
            fees.reverse();
        }
        Self::new(tokens, fees)
    }
}

impl Display for SwapRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops = self
            .fees
            .iter()
            .zip(&self.tokens[1..])
            .map(|(fee, token)| format!("-({fee})-> {token}"))
            .join(" ");
        write!(f, "{} {hops}", self.tokens[0])
    }
}

/// Packs `tokens` and `fees` into router path bytes.
///
/// # Arguments
///
/// * `tokens` - Route tokens, first to last
/// * `fees` - Fee tier of each hop
/// * `is_exact_input` - Pack for an exact-input swap, reversing the route
///
/// # Returns
///
/// `20 + 23 * fees.len()` bytes: a token, then a 3-byte fee and token per hop
///
/// # Errors
/// * `PathTooShort` or `PathLengthMismatch` if the arrays do not line up
pub fn encode_path(
    tokens: &[Address],
    fees: &[FeeTier],
    is_exact_input: bool,
) -> Result<Bytes, EngineError> {
    let route = SwapRoute::new(tokens.to_vec(), fees.to_vec())?;
    Ok(route.encode(TradeType::from_exact_input(is_exact_input)))
}

/// Unpacks router path bytes into route order.
///
/// # Arguments
///
/// * `path` - Packed path bytes
/// * `is_exact_input` - Whether `path` was packed for an exact-input swap
///
/// # Errors
/// * `MalformedPath` or `UnsupportedFee`
pub fn decode_path(path: &[u8], is_exact_input: bool) -> Result<SwapRoute, EngineError> {
    SwapRoute::decode(path, TradeType::from_exact_input(is_exact_input))
}
