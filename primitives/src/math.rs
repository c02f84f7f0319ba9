//! Exact integer arithmetic shared by the economic pallets.
//!
//! Every monetary calculation in the workspace routes through these helpers
//! so intermediate products never truncate: `mul_div` widens to 256 bits and
//! the square root is the exact integer root. The bonding-curve discriminant
//! needs more than 256 bits for extreme price parameters and is computed in
//! `U512` by the minting pallet.

use polkadot_sdk::sp_core::U256;

use crate::Balance;

/// `floor(a * b / c)` with a 256-bit intermediate product.
///
/// Returns `None` when `c == 0` or the quotient does not fit `u128`.
pub fn mul_div(a: Balance, b: Balance, c: Balance) -> Option<Balance> {
  if c == 0 {
    return None;
  }
  let quotient = U256::from(a) * U256::from(b) / U256::from(c);
  if quotient > U256::from(u128::MAX) {
    return None;
  }
  Some(quotient.as_u128())
}

/// `ceil(a / b)`; `None` when `b == 0`.
pub fn div_ceil(a: Balance, b: Balance) -> Option<Balance> {
  if b == 0 {
    return None;
  }
  let floor = a / b;
  if a % b == 0 { Some(floor) } else { Some(floor + 1) }
}

/// Exact `floor(sqrt(n))`.
pub fn isqrt(n: U256) -> U256 {
  n.integer_sqrt()
}

/// `floor(sqrt(a * b))`, the geometric mean used for bootstrap LP issuance.
///
/// The root of a product of two `u128` values always fits `u128`.
pub fn sqrt_product(a: Balance, b: Balance) -> Balance {
  (U256::from(a) * U256::from(b)).integer_sqrt().as_u128()
}
