use std::fmt::{self, Display};

use alloy::primitives::U256;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::liquidity_amounts::{max_liquidity_for_amount0_precise, max_liquidity_for_amount1};
use crate::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use crate::math::tick_math::{get_sqrt_ratio_at_tick, nearest_usable_tick};
use crate::models::pair::OrderedPair;
use crate::models::pool::PoolState;
use crate::models::position::{MintAmounts, Position};
use crate::models::token::TokenDescriptor;

/// Half-width of a position's tick range, in multiples of the pool's tick
/// spacing.
///
/// A range of `K` spans `[center - K * spacing, center + K * spacing]`.
/// Wide ranges (e.g. 200) keep bootstrap liquidity in range while the price
/// moves; narrow ones (e.g. 2) concentrate it around the current price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TickWidth(u32);

impl TickWidth {
    /// Creates a tick width.
    ///
    /// # Errors
    /// * `InvalidTickWidth` if `multiplier` is zero
    pub const fn new(multiplier: u32) -> Result<Self, EngineError> {
        if multiplier == 0 {
            return Err(EngineError::InvalidTickWidth);
        }
        Ok(Self(multiplier))
    }

    /// The multiplier
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TickWidth {
    type Error = EngineError;

    fn try_from(multiplier: u32) -> Result<Self, Self::Error> {
        Self::new(multiplier)
    }
}

impl From<TickWidth> for u32 {
    fn from(width: TickWidth) -> Self {
        width.0
    }
}

impl Display for TickWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{}", self.0)
    }
}

/// Everything needed to size a position
#[derive(Clone, Debug)]
pub struct PositionRequest<'a> {
    /// Chain the amounts are tagged with
    pub chain_id: u64,
    /// Pool snapshot to size against
    pub pool: &'a PoolState,
    /// Token the input amount is denominated in, in the caller's labelling
    pub token0: &'a TokenDescriptor,
    /// The other token, in the caller's labelling
    pub token1: &'a TokenDescriptor,
    /// Input amount of `token0`, in display units
    pub input_token0_amount: &'a str,
    /// Range half-width
    pub width: TickWidth,
}

/// Sizes a position from a single-sided amount.
///
/// The pair is canonicalized first. If the caller's `token0` is canonical
/// token0 its amount is fixed as `amount0`, otherwise as `amount1`; the other
/// side is derived from the pool price. The result is always in canonical
/// order, mint amounts rounded up the way the position manager charges them.
///
/// Amounts of zero or less are the caller's concern.
///
/// # Arguments
///
/// * `request` - Pool snapshot, both tokens in the caller's labelling, the
///   input amount and the range width
///
/// # Returns
///
/// The position with its tick range, liquidity and mint amounts
///
/// # Errors
/// * `UnsupportedFee` if the pool fee is not a known tier, before any math
/// * `IdenticalTokens` if both descriptors share an address
/// * `InvalidAmount` if the input amount does not parse in the token's units
/// * `TickOutOfBounds` if the range leaves the protocol bounds
/// * `RangeExcludesToken` if the range holds none of the fixed token
pub fn size_position(request: &PositionRequest<'_>) -> Result<Position, EngineError> {
    let pool = request.pool;
    let fee = pool.validate()?;

    let sorted = OrderedPair::new(
        request.token0.address,
        request.token0,
        request.token1.address,
        request.token1,
    )?;
    let fixed_index = sorted.position_of(request.token0.address)?;

    let (tick_lower, tick_upper) = tick_range(pool.tick, pool.tick_spacing, request.width)?;
    let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

    let fixed_token = if fixed_index == 0 {
        sorted.first().payload
    } else {
        sorted.second().payload
    };
    let amount = fixed_token.parse_units(request.input_token0_amount)?;

    let excludes = || EngineError::RangeExcludesToken {
        symbol: fixed_token.symbol.clone(),
        tick: pool.tick,
        tick_lower,
        tick_upper,
    };

    let liquidity = if fixed_index == 0 {
        if pool.tick >= tick_upper {
            return Err(excludes());
        }
        let from = pool.sqrt_price_x96.max(sqrt_lower);
        max_liquidity_for_amount0_precise(from, sqrt_upper, amount)?
    } else {
        if pool.tick < tick_lower {
            return Err(excludes());
        }
        let to = pool.sqrt_price_x96.min(sqrt_upper);
        max_liquidity_for_amount1(sqrt_lower, to, amount)?
    };
    let liquidity =
        u128::try_from(liquidity).map_err(|_| EngineError::MathOverflow("position liquidity"))?;

    let mint_amounts = mint_amounts(pool, tick_lower, tick_upper, sqrt_lower, sqrt_upper, liquidity)?;

    debug!(
        "liquidity::sizer: {} fee {} ticks [{tick_lower}, {tick_upper}] liquidity {liquidity} amounts {} / {}",
        sorted,
        fee,
        mint_amounts.amount0,
        mint_amounts.amount1
    );

    let (token0, token1) = sorted.into_parts();
    Ok(Position {
        chain_id: request.chain_id,
        pool: pool.address,
        fee,
        token0: token0.clone(),
        token1: token1.clone(),
        tick_lower,
        tick_upper,
        liquidity,
        mint_amounts,
    })
}

/// Range of `width` tick spacings either side of the usable tick nearest to
/// `tick`.
///
/// # Errors
/// * `InvalidTickSpacing` or `TickOutOfBounds` from [`nearest_usable_tick`]
pub fn tick_range(
    tick: i32,
    tick_spacing: i32,
    width: TickWidth,
) -> Result<(i32, i32), EngineError> {
    let center = i64::from(nearest_usable_tick(tick, tick_spacing)?);
    let offset = i64::from(tick_spacing) * i64::from(width.get());

    // Saturate; anything past MIN_TICK/MAX_TICK is rejected by the tick math anyway
    let saturate = |value: i64| value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    Ok((saturate(center - offset), saturate(center + offset)))
}

/// Token amounts `liquidity` requires at the pool's current price, rounded up
fn mint_amounts(
    pool: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
) -> Result<MintAmounts, EngineError> {
    let amounts = if pool.tick < tick_lower {
        MintAmounts {
            amount0: get_amount0_delta(sqrt_lower, sqrt_upper, liquidity, true)?,
            amount1: U256::ZERO,
        }
    } else if pool.tick < tick_upper {
        MintAmounts {
            amount0: get_amount0_delta(pool.sqrt_price_x96, sqrt_upper, liquidity, true)?,
            amount1: get_amount1_delta(sqrt_lower, pool.sqrt_price_x96, liquidity, true)?,
        }
    } else {
        MintAmounts {
            amount0: U256::ZERO,
            amount1: get_amount1_delta(sqrt_lower, sqrt_upper, liquidity, true)?,
        }
    };
    Ok(amounts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_helpers::{fixture_pool, token};
    use std::str::FromStr;

    const TOKEN_A: &str = "0x1111111111111111111111111111111111111111";
    const TOKEN_B: &str = "0x2222222222222222222222222222222222222222";

    fn request<'a>(
        pool: &'a PoolState,
        token0: &'a TokenDescriptor,
        token1: &'a TokenDescriptor,
        amount: &'a str,
        width: u32,
    ) -> PositionRequest<'a> {
        PositionRequest {
            chain_id: 84_532,
            pool,
            token0,
            token1,
            input_token0_amount: amount,
            width: TickWidth::new(width).unwrap(),
        }
    }

    #[test]
    fn test_fixture_pool_wide_range() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");

        let position = size_position(&request(&pool, &a, &b, "1000000", 200)).unwrap();

        assert_eq!(position.tick_lower, -18_100);
        assert_eq!(position.tick_upper, -14_100);
        assert_eq!(position.liquidity, 4_710_479_178_560_207_882_427_178);
        assert_eq!(
            position.mint_amounts.amount0,
            U256::from_str("1000000000000000000000000").unwrap()
        );
        assert_eq!(
            position.mint_amounts.amount1,
            U256::from_str("200917979363517164388486").unwrap()
        );
        assert_eq!(position.token0.address, a.address);
        assert_eq!(position.chain_id, 84_532);
    }

    #[test]
    fn test_fixture_pool_narrow_range() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");

        let position = size_position(&request(&pool, &a, &b, "1000000", 2)).unwrap();

        assert_eq!((position.tick_lower, position.tick_upper), (-16_120, -16_080));
        assert_eq!(
            position.mint_amounts.amount0,
            U256::from_str("1000000000000000000000000").unwrap()
        );
        assert_eq!(
            position.mint_amounts.amount1,
            U256::from_str("326797604682096046844582").unwrap()
        );
    }

    #[test]
    fn test_input_token_is_canonical_token1() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");

        // Caller calls B "token0"; its amount is fixed as canonical amount1
        let position = size_position(&request(&pool, &b, &a, "1000000", 200)).unwrap();

        assert_eq!(position.token0.address, a.address);
        assert_eq!(position.token1.address, b.address);
        assert_eq!(position.liquidity, 23_444_786_740_750_689_547_483_024);
        assert_eq!(
            position.mint_amounts.amount0,
            U256::from_str("4977155370404749059463420").unwrap()
        );
        assert_eq!(
            position.mint_amounts.amount1,
            U256::from_str("1000000000000000000000000").unwrap()
        );
        assert_eq!(position.amount_of(b.address).unwrap(), position.mint_amounts.amount1);
    }

    #[test]
    fn test_labelling_does_not_change_canonical_position() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");

        // Same derived liquidity -> same canonical position whichever side is labelled token0
        let from_a = size_position(&request(&pool, &a, &b, "1000000", 200)).unwrap();
        let implied_b = b.format_units(from_a.mint_amounts.amount1).to_string();
        let from_b = size_position(&request(&pool, &b, &a, &implied_b, 200)).unwrap();

        assert_eq!(from_a.tick_lower, from_b.tick_lower);
        assert_eq!(from_a.tick_upper, from_b.tick_upper);
        assert_eq!(from_a.token0, from_b.token0);
        assert_eq!(from_a.mint_amounts.amount1, from_b.mint_amounts.amount1);
        let drift = from_a.mint_amounts.amount0.abs_diff(from_b.mint_amounts.amount0);
        assert!(drift <= U256::from(10u8), "amount0 drifted by {drift}");
    }

    #[test]
    fn test_decimals_follow_the_fixed_token() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        let usdc = token(TOKEN_B, 6, "USDC");

        let position = size_position(&request(&pool, &usdc, &a, "1000000", 200)).unwrap();
        assert_eq!(
            position.mint_amounts.amount1,
            U256::from(1_000_000_000_000u64)
        );
    }

    #[test]
    fn test_unsupported_fee_is_rejected_first() {
        let mut pool = fixture_pool();
        pool.fee = 2500;
        // Out of range tick too; the fee must be reported first
        pool.tick = i32::MAX;
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");

        assert_eq!(
            size_position(&request(&pool, &a, &b, "1", 200)),
            Err(EngineError::UnsupportedFee(2500))
        );
    }

    #[test]
    fn test_identical_tokens_are_rejected() {
        let pool = fixture_pool();
        let a = token(TOKEN_A, 18, "AAA");
        assert!(matches!(
            size_position(&request(&pool, &a, &a, "1", 200)),
            Err(EngineError::IdenticalTokens { .. })
        ));
    }

    #[test]
    fn test_range_beyond_max_tick_is_rejected() {
        let mut pool = fixture_pool();
        pool.tick = 887_000;
        let a = token(TOKEN_A, 18, "AAA");
        let b = token(TOKEN_B, 18, "BBB");
        assert!(matches!(
            size_position(&request(&pool, &a, &b, "1", 200)),
            Err(EngineError::TickOutOfBounds(_))
        ));
    }

    #[test]
    fn test_tick_width_must_be_positive() {
        assert_eq!(TickWidth::new(0), Err(EngineError::InvalidTickWidth));
        assert!(serde_json::from_str::<TickWidth>("0").is_err());
        assert_eq!(serde_json::from_str::<TickWidth>("200").unwrap().get(), 200);
    }

    #[test]
    fn test_tick_range() {
        let width = TickWidth::new(2).unwrap();
        assert_eq!(tick_range(-16_096, 10, width).unwrap(), (-16_120, -16_080));
        assert_eq!(tick_range(0, 60, width).unwrap(), (-120, 120));
    }
}
