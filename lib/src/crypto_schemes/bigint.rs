use std::fmt;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// True when `value` is invertible modulo `modulus`.
pub fn is_unit(value: &BigUint, modulus: &BigUint) -> bool {
    !value.is_zero() && value < modulus && value.gcd(modulus).is_one()
}

/// Paillier's `L(u) = (u - 1) / n`, defined only when `n` divides `u - 1`.
pub fn l_function(u: &BigUint, n: &BigUint) -> Option<BigUint> {
    if u.is_zero() {
        return None;
    }
    let (quotient, remainder) = (u - BigUint::one()).div_rem(n);
    remainder.is_zero().then_some(quotient)
}

// Used just for better log messages
pub struct BetterFormattingVec<'a, T>(pub &'a [T]);
impl<T: fmt::Display> fmt::Debug for BetterFormattingVec<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Values: {{")?;
        for value in self.0 {
            writeln!(f, "  {}", value)?;
        }
        write!(f, "}}")
    }
}
