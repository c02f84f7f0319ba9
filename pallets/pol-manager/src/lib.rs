//! POL Manager Pallet
//!
//! Protocol-owned liquidity accumulator: folds minted allocations and their
//! foreign payments into the pool position and buffers whatever cannot be
//! placed yet. LP held here is permanent; nothing ever withdraws it.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
pub mod mock;

use frame::deps::sp_runtime::DispatchError;
use primitives::Balance;

/// Pool operations the POL manager depends on
pub trait LiquidityPool<AccountId> {
  fn is_live() -> bool;

  /// Current reserves as `(native, foreign)`
  fn reserves() -> (Balance, Balance);

  /// Deposit liquidity held by `who`; returns `(lp_minted, native_used, foreign_used)`
  fn add_liquidity(
    who: &AccountId,
    native: Balance,
    foreign: Balance,
  ) -> Result<(Balance, Balance, Balance), DispatchError>;

  /// Market-sell foreign held by `who`; returns the native received
  fn swap_foreign_to_native(who: &AccountId, foreign_in: Balance) -> Result<Balance, DispatchError>;
}

/// Aggregated result of one provisioning cycle. Provisioning never fails;
/// a zero report means everything stayed buffered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PolReport {
  pub lp_minted: Balance,
  pub native_used: Balance,
  pub foreign_used: Balance,
}

impl PolReport {
  /// True when the cycle minted at least one LP unit
  pub fn provided(&self) -> bool {
    self.lp_minted > 0
  }
}

#[frame::pallet]
pub mod pallet {
  use super::{LiquidityPool, PolReport};
  use frame::deps::sp_runtime::traits::AccountIdConversion;
  use frame::prelude::*;
  use primitives::{Balance, math};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Pool receiving the protocol-owned position
    type Pool: LiquidityPool<Self::AccountId>;

    /// Pallet ID the buffer account is derived from
    #[pallet::constant]
    type PalletId: Get<PalletId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// LP units minted for the protocol position; never decreases
  #[pallet::storage]
  #[pallet::getter(fn balance_lp)]
  pub type BalanceLp<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Cumulative native placed into the pool
  #[pallet::storage]
  #[pallet::getter(fn contributed_native)]
  pub type ContributedNative<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Cumulative foreign placed into the pool (adds and residual swaps)
  #[pallet::storage]
  #[pallet::getter(fn contributed_foreign)]
  pub type ContributedForeign<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Native waiting for a matching foreign inflow
  #[pallet::storage]
  #[pallet::getter(fn buffer_native)]
  pub type BufferNative<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Foreign waiting for the next provisioning cycle
  #[pallet::storage]
  #[pallet::getter(fn buffer_foreign)]
  pub type BufferForeign<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// LP minted for the protocol position
    LiquidityProvided {
      lp_minted: Balance,
      native_used: Balance,
      foreign_used: Balance,
    },
    /// Residual foreign sold into the pool for native
    ResidualSwapped {
      foreign_in: Balance,
      native_out: Balance,
    },
    /// Nothing could be placed; amounts stay buffered
    LiquidityDeferred {
      native_buffered: Balance,
      foreign_buffered: Balance,
    },
  }

  impl<T: Config> Pallet<T> {
    /// Get the account ID holding the buffered tokens
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Fold `(native, foreign)` plus any buffered residuals into the pool
    /// position. Infallible: anything that cannot be placed stays buffered
    /// until a later cycle drains it.
    pub fn provide_liquidity(native: Balance, foreign: Balance) -> PolReport {
      let total_native = BufferNative::<T>::get().saturating_add(native);
      let total_foreign = BufferForeign::<T>::get().saturating_add(foreign);

      let report = if T::Pool::is_live() {
        Self::zap(total_native, total_foreign)
      } else {
        Self::bootstrap(total_native, total_foreign)
      };

      if report.provided() {
        Self::deposit_event(Event::LiquidityProvided {
          lp_minted: report.lp_minted,
          native_used: report.native_used,
          foreign_used: report.foreign_used,
        });
      } else if BufferNative::<T>::get() > 0 || BufferForeign::<T>::get() > 0 {
        Self::deposit_event(Event::LiquidityDeferred {
          native_buffered: BufferNative::<T>::get(),
          foreign_buffered: BufferForeign::<T>::get(),
        });
      }

      report
    }

    /// First cycle on an empty pool: the full holdings set the initial ratio.
    fn bootstrap(total_native: Balance, total_foreign: Balance) -> PolReport {
      if total_native == 0 || total_foreign == 0 {
        BufferNative::<T>::put(total_native);
        BufferForeign::<T>::put(total_foreign);
        return PolReport::default();
      }

      match T::Pool::add_liquidity(&Self::account_id(), total_native, total_foreign) {
        Ok((lp_minted, native_used, foreign_used)) => {
          Self::credit_position(lp_minted, native_used, foreign_used);
          BufferNative::<T>::put(total_native.saturating_sub(native_used));
          BufferForeign::<T>::put(total_foreign.saturating_sub(foreign_used));
          PolReport {
            lp_minted,
            native_used,
            foreign_used,
          }
        }
        Err(error) => {
          log::debug!(target: "pol-manager", "bootstrap deferred: {error:?}");
          BufferNative::<T>::put(total_native);
          BufferForeign::<T>::put(total_foreign);
          PolReport::default()
        }
      }
    }

    /// Live-pool cycle: balanced top-up first, then the foreign residual is
    /// swapped to native and held for future matching.
    fn zap(total_native: Balance, total_foreign: Balance) -> PolReport {
      let mut native_rest = total_native;
      let mut foreign_rest = total_foreign;
      let mut report = PolReport::default();

      if native_rest > 0 && foreign_rest > 0 {
        let (use_native, use_foreign) = Self::balanced_pair(native_rest, foreign_rest);
        if use_native > 0 && use_foreign > 0 {
          match T::Pool::add_liquidity(&Self::account_id(), use_native, use_foreign) {
            Ok((lp_minted, native_used, foreign_used)) => {
              Self::credit_position(lp_minted, native_used, foreign_used);
              native_rest = native_rest.saturating_sub(native_used);
              foreign_rest = foreign_rest.saturating_sub(foreign_used);
              report = PolReport {
                lp_minted,
                native_used,
                foreign_used,
              };
            }
            Err(error) => {
              log::debug!(target: "pol-manager", "balanced top-up deferred: {error:?}");
            }
          }
        }
      }

      if foreign_rest > 0 && T::Pool::is_live() {
        match T::Pool::swap_foreign_to_native(&Self::account_id(), foreign_rest) {
          Ok(native_out) => {
            ContributedForeign::<T>::mutate(|total| *total = total.saturating_add(foreign_rest));
            Self::deposit_event(Event::ResidualSwapped {
              foreign_in: foreign_rest,
              native_out,
            });
            native_rest = native_rest.saturating_add(native_out);
            foreign_rest = 0;
          }
          Err(error) => {
            log::debug!(target: "pol-manager", "residual swap deferred: {error:?}");
          }
        }
      }

      BufferNative::<T>::put(native_rest);
      BufferForeign::<T>::put(foreign_rest);
      report
    }

    /// Largest sub-pair of `(native, foreign)` matching the pool ratio
    fn balanced_pair(native: Balance, foreign: Balance) -> (Balance, Balance) {
      let (reserve_native, reserve_foreign) = T::Pool::reserves();
      let foreign_by_native = math::mul_div(native, reserve_foreign, reserve_native).unwrap_or(0);
      if foreign_by_native <= foreign {
        (native, foreign_by_native)
      } else {
        (
          math::mul_div(foreign, reserve_native, reserve_foreign).unwrap_or(0),
          foreign,
        )
      }
    }

    fn credit_position(lp_minted: Balance, native_used: Balance, foreign_used: Balance) {
      BalanceLp::<T>::mutate(|total| *total = total.saturating_add(lp_minted));
      ContributedNative::<T>::mutate(|total| *total = total.saturating_add(native_used));
      ContributedForeign::<T>::mutate(|total| *total = total.saturating_add(foreign_used));
    }
  }

  /// Genesis configuration — ensures pallet account is ED-free
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      // Pallet account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
