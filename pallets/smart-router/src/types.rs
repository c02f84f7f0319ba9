use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use polkadot_sdk::sp_runtime::{DispatchError, DispatchResult};
use scale_info::TypeInfo;

use primitives::Balance;

/// Route taken by a foreign-in swap
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum Route {
  /// Bonding-curve mint
  Utbc,
  /// Constant-product pool swap
  Xyk,
}

/// Pool-side swap result as seen by the router
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PoolSwap {
  pub amount_out: Balance,
  pub price_before: Balance,
  pub price_after: Balance,
  pub price_impact_ppm: Balance,
}

/// Mint-side result as seen by the router
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MintSummary {
  pub total_native: Balance,
  pub user_native: Balance,
  pub price_before: Balance,
  pub price_after: Balance,
  pub pol_lp_minted: Balance,
}

/// Full report of a routed trade
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TradeReport {
  pub route: Route,
  pub amount_in: Balance,
  pub fee: Balance,
  pub amount_out: Balance,
  pub price_before: Balance,
  pub price_after: Balance,
  /// Pool route only; zero for mints
  pub price_impact_ppm: Balance,
  /// Mint route only; zero for pool swaps
  pub pol_lp_minted: Balance,
}

/// Constant-product pool operations used by the router
pub trait PoolInterface<AccountId> {
  fn is_live() -> bool;

  /// Spot price in foreign per native; `None` while the pool is not live
  fn spot_price() -> Option<Balance>;

  /// Quote the native output of a foreign sale; zero when the pool is not live
  fn quote_native_out(foreign_in: Balance) -> Balance;

  fn swap_foreign_to_native(
    who: &AccountId,
    foreign_in: Balance,
    min_native_out: Balance,
  ) -> Result<PoolSwap, DispatchError>;

  fn swap_native_to_foreign(
    who: &AccountId,
    native_in: Balance,
    min_foreign_out: Balance,
  ) -> Result<PoolSwap, DispatchError>;
}

/// Bonding-curve operations used by the router
pub trait MintingCurveInterface<AccountId> {
  /// `(user_received, total_minted)` for a prospective payment; `None` when
  /// the payment buys no supply
  fn mint_quote(foreign_in: Balance) -> Option<(Balance, Balance)>;

  fn mint(who: &AccountId, foreign_in: Balance) -> Result<MintSummary, DispatchError>;
}

/// Fee sink fed by the router before a trade executes
pub trait FeeRoutingAdapter<AccountId> {
  fn route_fee_foreign(who: &AccountId, amount: Balance) -> DispatchResult;

  fn route_fee_native(who: &AccountId, amount: Balance) -> DispatchResult;
}
