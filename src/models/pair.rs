use std::fmt::{self, Display};

use alloy::primitives::Address;

use crate::error::EngineError;

/// One side of an [`OrderedPair`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PairSide<T> {
    /// Token address
    pub address: Address,
    /// Whatever the caller attached to the address
    pub payload: T,
}

/// Two tokens in canonical (ascending address) order.
///
/// The pool factory only accepts pairs sorted this way, so every pool
/// creation and position call takes its token0/token1 from an `OrderedPair`
/// built by [`OrderedPair::new`]. Addresses compare byte-wise, which is the
/// same order as comparing their lowercase hex strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderedPair<T> {
    /// `[token0, token1]`
    sides: [PairSide<T>; 2],
}

impl<T> OrderedPair<T> {
    /// Sorts two tokens into canonical order.
    ///
    /// # Arguments
    ///
    /// * `address_a`, `payload_a` - The first token in the caller's labelling
    /// * `address_b`, `payload_b` - The second token in the caller's labelling
    ///
    /// # Returns
    ///
    /// The pair with the lower address as `first()`, each payload kept with
    /// its address
    ///
    /// # Errors
    /// * `IdenticalTokens` if both addresses are the same
    pub fn new(
        address_a: Address,
        payload_a: T,
        address_b: Address,
        payload_b: T,
    ) -> Result<Self, EngineError> {
        let a = PairSide {
            address: address_a,
            payload: payload_a,
        };
        let b = PairSide {
            address: address_b,
            payload: payload_b,
        };

        let sides = match address_a.cmp(&address_b) {
            std::cmp::Ordering::Less => [a, b],
            std::cmp::Ordering::Greater => [b, a],
            std::cmp::Ordering::Equal => {
                return Err(EngineError::IdenticalTokens { address: address_a })
            }
        };
        Ok(Self { sides })
    }

    /// Canonical token0
    #[must_use]
    pub const fn first(&self) -> &PairSide<T> {
        &self.sides[0]
    }

    /// Canonical token1
    #[must_use]
    pub const fn second(&self) -> &PairSide<T> {
        &self.sides[1]
    }

    /// Canonical (token0, token1) addresses
    #[must_use]
    pub const fn addresses(&self) -> (Address, Address) {
        (self.sides[0].address, self.sides[1].address)
    }

    /// Index (0 or 1) of `address` in canonical order.
    ///
    /// # Errors
    /// * `TokenNotInPair` if `address` is neither token
    pub fn position_of(&self, address: Address) -> Result<usize, EngineError> {
        self.sides
            .iter()
            .position(|side| side.address == address)
            .ok_or(EngineError::TokenNotInPair {
                token: address,
                token0: self.sides[0].address,
                token1: self.sides[1].address,
            })
    }

    /// Consumes the pair, returning the payloads in canonical order
    pub fn into_parts(self) -> (T, T) {
        let [first, second] = self.sides;
        (first.payload, second.payload)
    }
}

impl<T: Display> Display for OrderedPair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sides[0].payload, self.sides[1].payload)
    }
}

/// Sorts two tokens into canonical order. Shorthand for [`OrderedPair::new`].
///
/// # Errors
/// * `IdenticalTokens` if both addresses are the same
pub fn order<T>(
    address_a: Address,
    payload_a: T,
    address_b: Address,
    payload_b: T,
) -> Result<OrderedPair<T>, EngineError> {
    OrderedPair::new(address_a, payload_a, address_b, payload_b)
}
