use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Fee tiers a pool can be deployed with, in hundredths of a basis point.
///
/// Pools are keyed by (token pair, fee tier); each tier comes with a fixed
/// tick spacing chosen by the factory.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    /// 0.01%
    #[display("100")]
    Lowest,
    /// 0.05%
    #[display("500")]
    Low,
    /// 0.3%
    #[display("3000")]
    Medium,
    /// 1%
    #[display("10000")]
    High,
}

impl FeeTier {
    /// All supported tiers, ascending
    pub const ALL: [Self; 4] = [Self::Lowest, Self::Low, Self::Medium, Self::High];

    /// Raw fee value as passed to the contracts
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Lowest => 100,
            Self::Low => 500,
            Self::Medium => 3000,
            Self::High => 10_000,
        }
    }

    /// Tick spacing the factory assigns to pools of this tier
    #[must_use]
    pub const fn tick_spacing(self) -> i32 {
        match self {
            Self::Lowest => 1,
            Self::Low => 10,
            Self::Medium => 60,
            Self::High => 200,
        }
    }

    /// Big-endian 24-bit encoding used in packed swap paths
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 3] {
        let [_, b0, b1, b2] = self.as_u32().to_be_bytes();
        [b0, b1, b2]
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = EngineError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        match fee {
            100 => Ok(Self::Lowest),
            500 => Ok(Self::Low),
            3000 => Ok(Self::Medium),
            10_000 => Ok(Self::High),
            other => Err(EngineError::UnsupportedFee(other)),
        }
    }
}

impl From<FeeTier> for u32 {
    fn from(fee: FeeTier) -> Self {
        fee.as_u32()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_round_trip() {
        for fee in FeeTier::ALL {
            assert_eq!(FeeTier::try_from(fee.as_u32()).unwrap(), fee);
            assert_eq!(fee.to_string(), fee.as_u32().to_string());
        }
    }

    #[test]
    fn test_unsupported_fee() {
        for fee in [0, 1, 250, 3001, 100_000] {
            assert_eq!(FeeTier::try_from(fee), Err(EngineError::UnsupportedFee(fee)));
        }
    }

    #[test]
    fn test_fee_bytes() {
        assert_eq!(FeeTier::Medium.to_be_bytes(), [0x00, 0x0b, 0xb8]);
        assert_eq!(FeeTier::High.to_be_bytes(), [0x00, 0x27, 0x10]);
    }

    #[test]
    fn test_fee_serde() {
        let fee: FeeTier = serde_json::from_str("500").unwrap();
        assert_eq!(fee, FeeTier::Low);
        assert_eq!(serde_json::to_string(&FeeTier::High).unwrap(), "10000");
        assert!(serde_json::from_str::<FeeTier>("42").is_err());
    }
}
