// Compact difficulty targets

use crate::core::Hash256;
use crate::error::{GenesisError, Result};
use primitive_types::U256;

/// Compact bits of the "difficulty 1" target
pub const DIFFICULTY_ONE_BITS: u32 = 0x1d00ffff;

const SIGN_BIT: u32 = 0x00800000;
const WORD_MASK: u32 = 0x007fffff;

/// Difficulty target decoded from its compact representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Compact representation (bits field in block header)
    pub bits: u32,
    value: U256,
}

impl Target {
    /// Decode compact bits into a full 256-bit target
    pub fn from_bits(bits: u32) -> Result<Self> {
        Ok(Self {
            bits,
            value: Self::decode(bits)?,
        })
    }

    /// Expand a compact value.
    /// Formula: target = word * 2^(8 * (size - 3))
    ///
    /// Fails on a negative encoding (sign bit set with a non-zero word) and on
    /// encodings that do not fit in 256 bits.
    pub fn decode(bits: u32) -> Result<U256> {
        let size = bits >> 24;
        let word = bits & WORD_MASK;

        if word != 0 && bits & SIGN_BIT != 0 {
            return Err(GenesisError::invalid(format!(
                "Compact target 0x{:08x} is negative",
                bits
            )));
        }

        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
        if overflow {
            return Err(GenesisError::invalid(format!(
                "Compact target 0x{:08x} overflows 256 bits (size {})",
                bits, size
            )));
        }

        if size <= 3 {
            Ok(U256::from(word >> (8 * (3 - size))))
        } else {
            Ok(U256::from(word) << (8 * (size - 3) as usize))
        }
    }

    /// Re-encode a target in compact form, rounding down to 3 significant bytes
    pub fn to_compact(value: U256) -> u32 {
        let mut size = (value.bits() as u32 + 7) / 8;
        let mut compact = if size <= 3 {
            (value.low_u64() << (8 * (3 - size))) as u32
        } else {
            (value >> (8 * (size - 3) as usize)).low_u64() as u32
        };

        // Keep the sign bit clear by moving to a larger exponent
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }
        compact | (size << 24)
    }

    /// The decoded target
    pub fn value(&self) -> U256 {
        self.value
    }

    /// A hash meets the target when its integer value is <= the target
    #[inline]
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        hash.to_u256() <= self.value
    }

    /// Big-endian bytes of the target
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.value.to_big_endian(&mut bytes);
        bytes
    }

    /// Hex without leading zeros, e.g. `0xffff0000...`
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.value)
    }

    /// Fixed-width 64-digit hex
    pub fn to_padded_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Count leading zero bits in target (difficulty indicator)
    pub fn leading_zeros(&self) -> u32 {
        self.value.leading_zeros()
    }

    /// Difficulty relative to the 0x1d00ffff target
    pub fn difficulty(&self) -> f64 {
        if self.value.is_zero() {
            return f64::INFINITY;
        }
        // 0x1d00ffff always decodes
        let one = Self::decode(DIFFICULTY_ONE_BITS).unwrap_or_default();
        u256_to_f64(one) / u256_to_f64(self.value)
    }

    /// Average number of hashes needed to meet this target
    pub fn expected_attempts(&self) -> f64 {
        2f64.powi(256) / (u256_to_f64(self.value) + 1.0)
    }
}

/// Approximate a 256-bit value as f64 from its top 64 bits
fn u256_to_f64(value: U256) -> f64 {
    let shift = value.bits().saturating_sub(64);
    (value >> shift).low_u64() as f64 * 2f64.powi(shift as i32)
}
