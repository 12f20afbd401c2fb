use alloy::primitives::{I256, U256};

use crate::error::EngineError;

/// Lowest tick a pool can reach
pub const MIN_TICK: i32 = -887_272;
/// Highest tick a pool can reach
pub const MAX_TICK: i32 = -MIN_TICK;

/// Square-root price at `MIN_TICK`
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4_295_128_739, 0, 0, 0]);
/// Square-root price at `MAX_TICK`
pub const MAX_SQRT_RATIO: U256 = U256::from_limbs([
    6_743_328_256_752_651_558,
    17_280_870_778_742_802_505,
    4_294_805_859,
    0,
]);

/// `log_sqrt(1.0001)(2)` in Q128.128
const SQRT_10001: I256 = I256::from_raw(U256::from_limbs([11_745_905_768_312_294_533, 13_863, 0, 0]));
/// Error bound subtracted for the lower tick candidate
const TICK_LOW: I256 = I256::from_raw(U256::from_limbs([
    6_552_757_943_157_144_234,
    184_476_617_836_266_586,
    0,
    0,
]));
/// Error bound added for the upper tick candidate
const TICK_HIGH: I256 = I256::from_raw(U256::from_limbs([
    4_998_474_450_511_881_007,
    15_793_544_031_827_761_793,
    0,
    0,
]));

/// Returns the Q64.96 square-root price at `tick`.
///
/// # Errors
/// * `TickOutOfBounds` if `|tick| > MAX_TICK`
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, EngineError> {
    let abs_tick = tick.unsigned_abs();
    if abs_tick > MAX_TICK.unsigned_abs() {
        return Err(EngineError::TickOutOfBounds(tick));
    }

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from_limbs([12_262_481_743_371_124_737, 18_445_821_805_675_392_311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    // Each set bit multiplies by 1/sqrt(1.0001)^bit in Q128
    macro_rules! apply_multiplier {
        ($bit:expr, $l0:expr, $l1:expr) => {
            if abs_tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from_limbs([$l0, $l1, 0, 0])) >> 128usize;
            }
        };
    }

    apply_multiplier!(0x2, 6_459_403_834_229_662_010, 18_444_899_583_751_176_498);
    apply_multiplier!(0x4, 17_226_890_335_427_755_468, 18_443_055_278_223_354_162);
    apply_multiplier!(0x8, 2_032_852_871_939_366_096, 18_439_367_220_385_604_838);
    apply_multiplier!(0x10, 14_545_316_742_740_207_172, 18_431_993_317_065_449_817);
    apply_multiplier!(0x20, 5_129_152_022_828_963_008, 18_417_254_355_718_160_513);
    apply_multiplier!(0x40, 4_894_419_605_888_772_193, 18_387_811_781_193_591_352);
    apply_multiplier!(0x80, 1_280_255_884_321_894_483, 18_329_067_761_203_520_168);
    apply_multiplier!(0x100, 15_924_666_964_335_305_636, 18_212_142_134_806_087_854);
    apply_multiplier!(0x200, 8_010_504_389_359_918_676, 17_980_523_815_641_551_639);
    apply_multiplier!(0x400, 10_668_036_004_952_895_731, 17_526_086_738_831_147_013);
    apply_multiplier!(0x800, 4_878_133_418_470_705_625, 16_651_378_430_235_024_244);
    apply_multiplier!(0x1000, 9_537_173_718_739_605_541, 15_030_750_278_693_429_944);
    apply_multiplier!(0x2000, 9_972_618_978_014_552_549, 12_247_334_978_882_834_399);
    apply_multiplier!(0x4000, 10_428_997_489_610_666_743, 8_131_365_268_884_726_200);
    apply_multiplier!(0x8000, 9_305_304_367_709_015_974, 3_584_323_654_723_342_297);
    apply_multiplier!(0x10000, 14_301_143_598_189_091_785, 696_457_651_847_595_233);
    apply_multiplier!(0x20000, 7_393_154_844_743_099_908, 26_294_789_957_452_057);
    apply_multiplier!(0x40000, 2_209_338_891_292_245_656, 37_481_735_321_082);
    apply_multiplier!(0x80000, 10_518_117_631_919_034_274, 76_158_723);

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128 -> Q96, rounding up so that get_tick_at_sqrt_ratio round-trips
    let lower_32_bits = ratio.as_limbs()[0] & 0xFFFF_FFFF;
    Ok((ratio >> 32usize) + U256::from(u8::from(lower_32_bits != 0)))
}

/// Returns the greatest tick whose square-root price is `<= sqrt_price_x96`.
///
/// # Errors
/// * `SqrtPriceOutOfBounds` unless `MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO`
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, EngineError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(EngineError::SqrtPriceOutOfBounds(sqrt_price_x96));
    }

    let ratio: U256 = sqrt_price_x96 << 32usize;
    let msb = 255 - ratio.leading_zeros();

    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    let mut log_2: I256 =
        (I256::from_raw(U256::from(msb)) - I256::from_raw(U256::from(128u8))) << 64usize;

    macro_rules! log2_step {
        ($shift:expr) => {{
            r = r.wrapping_mul(r) >> 127usize;
            let f: U256 = r >> 128usize;
            log_2 |= I256::from_raw(f << ($shift as usize));
            r >>= f.to::<usize>();
        }};
    }

    log2_step!(63);
    log2_step!(62);
    log2_step!(61);
    log2_step!(60);
    log2_step!(59);
    log2_step!(58);
    log2_step!(57);
    log2_step!(56);
    log2_step!(55);
    log2_step!(54);
    log2_step!(53);
    log2_step!(52);
    log2_step!(51);
    log2_step!(50);

    let log_sqrt10001 = log_2.wrapping_mul(SQRT_10001);
    let tick_low = (log_sqrt10001 - TICK_LOW).asr(128).low_i32();
    let tick_high = (log_sqrt10001 + TICK_HIGH).asr(128).low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x96 {
        tick_high
    } else {
        tick_low
    })
}

/// Rounds `tick` to the nearest multiple of `tick_spacing`, halves rounding
/// toward positive infinity, keeping the result inside `[MIN_TICK, MAX_TICK]`.
///
/// # Arguments
///
/// * `tick` - Any tick inside the protocol bounds
/// * `tick_spacing` - Spacing of the pool's fee tier
///
/// # Returns
///
/// A multiple of `tick_spacing`
///
/// # Errors
/// * `InvalidTickSpacing` if `tick_spacing` is not positive
/// * `TickOutOfBounds` if `tick` itself is outside the protocol bounds
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> Result<i32, EngineError> {
    if tick_spacing <= 0 {
        return Err(EngineError::InvalidTickSpacing(tick_spacing));
    }
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(EngineError::TickOutOfBounds(tick));
    }

    // floor(tick / spacing + 1/2) * spacing, in exact integer arithmetic
    let doubled = i64::from(tick) * 2 + i64::from(tick_spacing);
    let rounded = doubled.div_euclid(i64::from(tick_spacing) * 2) * i64::from(tick_spacing);

    let rounded = if rounded < i64::from(MIN_TICK) {
        rounded + i64::from(tick_spacing)
    } else if rounded > i64::from(MAX_TICK) {
        rounded - i64::from(tick_spacing)
    } else {
        rounded
    };
    Ok(rounded as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_get_sqrt_ratio_at_tick_bounds() {
        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(EngineError::TickOutOfBounds(MIN_TICK - 1))
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(EngineError::TickOutOfBounds(MAX_TICK + 1))
        );
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
    }

    #[test]
    fn test_get_sqrt_ratio_at_tick_values() {
        for (tick, expected) in [
            (0, "79228162514264337593543950336"),
            (50, "79426470787362580746886972461"),
            (1000, "83290069058676223003182343270"),
            (50000, "965075977353221155028623082916"),
            (MIN_TICK + 1, "4295343490"),
            (MAX_TICK - 1, "1461373636630004318706518188784493106690254656249"),
        ] {
            assert_eq!(
                get_sqrt_ratio_at_tick(tick).unwrap(),
                U256::from_str(expected).unwrap(),
                "sqrt ratio at {tick}"
            );
        }
    }

    #[test]
    fn test_get_tick_at_sqrt_ratio() {
        assert!(matches!(
            get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::from(1u8)),
            Err(EngineError::SqrtPriceOutOfBounds(_))
        ));
        assert!(matches!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO),
            Err(EngineError::SqrtPriceOutOfBounds(_))
        ));
        assert_eq!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(
            get_tick_at_sqrt_ratio(U256::from(4_295_343_490u64)).unwrap(),
            MIN_TICK + 1
        );
        assert_eq!(
            get_tick_at_sqrt_ratio(MAX_SQRT_RATIO - U256::from(1u8)).unwrap(),
            MAX_TICK - 1
        );
    }

    #[test]
    fn test_get_tick_at_sqrt_ratio_fixture_pool() {
        // ~1:5 pool, tick reported by the pool contract
        let sqrt_price = U256::from_str("35431911422859142059220343232").unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(sqrt_price).unwrap(), -16096);
    }

    #[test]
    fn test_nearest_usable_tick() {
        for (tick, spacing, expected) in [
            (-16096, 10, -16100),
            (-16095, 10, -16090),
            (-16094, 10, -16090),
            (5, 10, 10),
            (4, 10, 0),
            (-5, 10, 0),
            (-6, 10, -10),
            (0, 60, 0),
            (MIN_TICK, 60, -887_220),
            (MAX_TICK, 60, 887_220),
            (MAX_TICK, 1, MAX_TICK),
        ] {
            assert_eq!(
                nearest_usable_tick(tick, spacing).unwrap(),
                expected,
                "tick {tick} spacing {spacing}"
            );
        }
    }

    #[test]
    fn test_nearest_usable_tick_rejects_bad_input() {
        assert_eq!(
            nearest_usable_tick(MAX_TICK + 1, 10),
            Err(EngineError::TickOutOfBounds(MAX_TICK + 1))
        );
        assert_eq!(
            nearest_usable_tick(0, 0),
            Err(EngineError::InvalidTickSpacing(0))
        );
    }
}
