//! Two's-complement constant values.
//!
//! [`Const`] is the single constant representation used throughout the IR:
//! literals in expressions, reset values on signals, case-arm patterns, and
//! instance parameters. A constant carries its value together with an
//! explicit bit width and signedness, fixed at creation.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constant bit-vector value with fixed width and signedness.
///
/// The stored value is always within the representable range of the
/// declared width: construction wraps out-of-range values the way hardware
/// truncation would.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Const {
    value: BigInt,
    width: u32,
    signed: bool,
}

impl Const {
    /// Creates a constant with an explicit width and signedness.
    ///
    /// The value is wrapped into the representable range: unsigned
    /// constants into `[0, 2^width)`, signed constants into
    /// `[-2^(width-1), 2^(width-1))`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn new(value: BigInt, width: u32, signed: bool) -> Self {
        assert!(width > 0, "constant width must be positive");
        let modulus = BigInt::one() << width;
        let mut wrapped = value % &modulus;
        if wrapped.is_negative() {
            wrapped += &modulus;
        }
        if signed && wrapped >= (BigInt::one() << (width - 1)) {
            wrapped -= &modulus;
        }
        Self {
            value: wrapped,
            width,
            signed,
        }
    }

    /// Creates a constant from an integer, inferring the minimum
    /// representable width and signedness.
    ///
    /// Non-negative values are unsigned with width `max(1, bit_length)`;
    /// negative values are signed with the minimal two's-complement width
    /// including the sign bit.
    pub fn from_int(value: i64) -> Self {
        let big = BigInt::from(value);
        let (width, signed) = Self::min_shape(&big);
        Self {
            value: big,
            width,
            signed,
        }
    }

    /// Creates the all-zero constant of the given width, unsigned.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn zero(width: u32) -> Self {
        assert!(width > 0, "constant width must be positive");
        Self {
            value: BigInt::zero(),
            width,
            signed: false,
        }
    }

    /// Returns the minimum (width, signedness) able to represent `value`.
    pub fn min_shape(value: &BigInt) -> (u32, bool) {
        if value.is_zero() {
            (1, false)
        } else if value.is_positive() {
            (value.bits() as u32, false)
        } else {
            // Minimal two's complement: magnitude bits of (-v - 1), plus sign.
            let magnitude = -value - BigInt::one();
            (magnitude.bits() as u32 + 1, true)
        }
    }

    /// Returns the constant's value.
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// Returns the constant's bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns `true` if the constant is signed.
    pub fn signed(&self) -> bool {
        self.signed
    }

    /// Returns `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns the value of bit `index` (zero-based, LSB first).
    ///
    /// Bits at or above the width replicate the sign bit for signed
    /// constants and are zero for unsigned ones, matching two's-complement
    /// reading of the stored value.
    pub fn bit(&self, index: u32) -> bool {
        self.value.bit(u64::from(index))
    }
}

impl From<i64> for Const {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<bool> for Const {
    fn from(value: bool) -> Self {
        Self::from_int(i64::from(value))
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
