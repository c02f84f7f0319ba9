//! Ecosystem Constants for the UTBC/POL Workspace
//!
//! This module centralizes all system-level constants: pallet IDs for the
//! component-owned accounts and the economic parameters every pallet reads
//! its defaults from.
//!
//! These constants are the single source of truth for system architecture
//! and are re-used across all pallet configurations via the primitives crate.

/// Balance type alias for consistency across the ecosystem
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for component-owned funds.
pub mod pallet_ids {
  /// XYK pool pallet ID (reserve account of the native/foreign pair)
  pub const XYK_POOL_PALLET_ID: &[u8; 8] = b"xykpool0";

  /// Token Minting Curve pallet ID (unidirectional bonding-curve issuer)
  pub const TOKEN_MINTING_CURVE_PALLET_ID: &[u8; 8] = b"tmcurve0";

  /// POL Manager pallet ID (protocol-owned liquidity buffers and LP position)
  pub const POL_MANAGER_PALLET_ID: &[u8; 8] = b"polmgr00";

  /// Fee Manager pallet ID (deflationary fee sink)
  pub const FEE_MANAGER_PALLET_ID: &[u8; 8] = b"feemgr00";
}

/// Ecosystem parameters defining mathematical constants and thresholds.
///
/// These parameters are global across all pallets and coordinate the
/// economic properties of the system.
pub mod params {
  use super::Balance;
  use sp_arithmetic::Permill;

  /// Precision scalar for all monetary quantities (10^12).
  ///
  /// Prices, reserves and token amounts are expressed in these base units;
  /// one token equals `PRECISION` internal units.
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Parts-per-million scalar for fractions (10^6).
  ///
  /// Fees, distribution shares and the curve slope are PPM-scaled integers;
  /// `Permill` carries the same encoding.
  pub const PPM: Balance = 1_000_000;

  /// Minimum foreign payment for the very first mint (100 tokens).
  ///
  /// Enforced by the router while the pool is not yet live so that the
  /// bootstrap liquidity position starts at a meaningful size.
  pub const MIN_INITIAL_FOREIGN: Balance = 100 * PRECISION;

  /// Minimum foreign value accepted by the router for any swap (0.01).
  ///
  /// Prevents spam and dust trades; also the fee manager's default swap
  /// trigger threshold.
  pub const MIN_SWAP_FOREIGN: Balance = PRECISION / 100;

  /// Bonding-curve price at zero supply (0.001 foreign per native).
  pub const PRICE_INITIAL: Balance = PRECISION / 1000;

  /// Bonding-curve slope in PPM per native base unit.
  pub const SLOPE_PPM: Balance = PPM / 1000;

  /// XYK pool fee (0.3%).
  pub const XYK_FEE: Permill = Permill::from_parts(3_000);

  /// Router fee captured on every external swap (0.2%).
  pub const ROUTER_FEE: Permill = Permill::from_parts(2_000);

  /// Minted-supply share delivered to the buyer.
  pub const USER_SHARE: Permill = Permill::from_parts(333_333);

  /// Minted-supply share paired into protocol-owned liquidity.
  pub const POL_SHARE: Permill = Permill::from_parts(333_333);

  /// Minted-supply share accumulated for the treasury.
  pub const TREASURY_SHARE: Permill = Permill::from_parts(222_222);

  /// Minted-supply share accumulated for the team.
  ///
  /// The team share is the arithmetic remainder of the other three, so the
  /// four shares sum to exactly one million parts.
  pub const TEAM_SHARE: Permill = Permill::from_parts(111_112);
}
