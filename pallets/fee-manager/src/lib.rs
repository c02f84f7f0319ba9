//! Fee Manager Pallet
//!
//! Passive deflationary engine: buffers router fees, swaps accumulated
//! foreign fees to native once a threshold is crossed, and burns the
//! native proceeds through the minting curve.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
pub mod mock;

use frame::deps::sp_runtime::DispatchError;
use primitives::Balance;

/// Pool operations the fee manager depends on
pub trait SwapPool<AccountId> {
  fn is_live() -> bool;

  /// Market-sell foreign held by `who`; returns the native received
  fn swap_foreign_to_native(who: &AccountId, foreign_in: Balance) -> Result<Balance, DispatchError>;
}

/// Supply-shrinking interface of the minting curve
pub trait BurnHandler<AccountId> {
  /// Burn native held by `who`; returns the amount burned
  fn burn_native(who: &AccountId, amount: Balance) -> Result<Balance, DispatchError>;
}

#[frame::pallet]
pub mod pallet {
  use super::{Balance, BurnHandler, SwapPool};
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
      tokens::Preservation,
    },
    sp_runtime::traits::AccountIdConversion,
  };
  use frame::prelude::*;
  use primitives::ecosystem::params;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Currency interface for the native token
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Asset management interface for the foreign reserve token
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Asset id of the foreign reserve token
    #[pallet::constant]
    type ForeignAssetId: Get<u32>;

    /// Pallet ID the fee account is derived from
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Pool used to convert foreign fees to native
    type Pool: SwapPool<Self::AccountId>;

    /// Minting curve burning the native proceeds
    type Burner: BurnHandler<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::type_value]
  pub fn DefaultMinSwapForeign<T: Config>() -> Balance {
    params::MIN_SWAP_FOREIGN
  }

  /// Foreign buffer size that triggers a conversion swap
  #[pallet::storage]
  #[pallet::getter(fn min_swap_foreign)]
  pub type MinSwapForeign<T: Config> =
    StorageValue<_, Balance, ValueQuery, DefaultMinSwapForeign<T>>;

  /// Cumulative native fees ever received
  #[pallet::storage]
  #[pallet::getter(fn fees_native)]
  pub type FeesNative<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Cumulative foreign fees ever received
  #[pallet::storage]
  #[pallet::getter(fn fees_foreign)]
  pub type FeesForeign<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Native awaiting burn
  #[pallet::storage]
  #[pallet::getter(fn buffer_native)]
  pub type BufferNative<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Foreign awaiting conversion
  #[pallet::storage]
  #[pallet::getter(fn buffer_foreign)]
  pub type BufferForeign<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Total native supply burned by this pallet
  #[pallet::storage]
  #[pallet::getter(fn total_native_burned)]
  pub type TotalNativeBurned<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Total foreign converted to native for burning
  #[pallet::storage]
  #[pallet::getter(fn total_foreign_swapped)]
  pub type TotalForeignSwapped<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Native fee credited to the burn buffer
    NativeFeeReceived { amount: Balance },
    /// Foreign fee credited to the conversion buffer
    ForeignFeeReceived { amount: Balance },
    /// Buffered foreign converted to native
    ForeignFeesSwapped {
      foreign_in: Balance,
      native_out: Balance,
    },
    /// Buffered native burned out of the supply
    NativeFeesBurned { amount: Balance },
  }

  impl<T: Config> Pallet<T> {
    /// Get the account ID holding the fee buffers
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Pull a native fee from `from` and process it.
    pub fn receive_fee_native(from: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount == 0 {
        return Ok(());
      }
      T::Currency::transfer(from, &Self::account_id(), amount, Preservation::Expendable)?;
      Self::note_fee_native(amount);
      Ok(())
    }

    /// Pull a foreign fee from `from` and process it.
    pub fn receive_fee_foreign(from: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount == 0 {
        return Ok(());
      }
      T::Assets::transfer(
        T::ForeignAssetId::get(),
        from,
        &Self::account_id(),
        amount,
        Preservation::Expendable,
      )?;
      Self::note_fee_foreign(amount);
      Ok(())
    }

    /// Record a native fee already sitting on the fee account and attempt an
    /// immediate burn of the whole buffer. Downstream failures are absorbed.
    pub fn note_fee_native(amount: Balance) {
      if amount == 0 {
        return;
      }
      FeesNative::<T>::mutate(|total| *total = total.saturating_add(amount));
      BufferNative::<T>::mutate(|buffer| *buffer = buffer.saturating_add(amount));
      Self::deposit_event(Event::NativeFeeReceived { amount });
      Self::try_burn_buffer();
    }

    /// Record a foreign fee already sitting on the fee account. Once the
    /// buffer crosses the threshold and the pool is live, the whole buffer is
    /// converted and the proceeds burned. Downstream failures are absorbed.
    pub fn note_fee_foreign(amount: Balance) {
      if amount == 0 {
        return;
      }
      FeesForeign::<T>::mutate(|total| *total = total.saturating_add(amount));
      BufferForeign::<T>::mutate(|buffer| *buffer = buffer.saturating_add(amount));
      Self::deposit_event(Event::ForeignFeeReceived { amount });

      let buffer = BufferForeign::<T>::get();
      if buffer < MinSwapForeign::<T>::get() || !T::Pool::is_live() {
        return;
      }

      match T::Pool::swap_foreign_to_native(&Self::account_id(), buffer) {
        Ok(native_out) => {
          BufferForeign::<T>::put(0);
          BufferNative::<T>::mutate(|held| *held = held.saturating_add(native_out));
          TotalForeignSwapped::<T>::mutate(|total| *total = total.saturating_add(buffer));
          Self::deposit_event(Event::ForeignFeesSwapped {
            foreign_in: buffer,
            native_out,
          });
          Self::try_burn_buffer();
        }
        Err(error) => {
          log::debug!(target: "fee-manager", "fee conversion deferred: {error:?}");
        }
      }
    }

    fn try_burn_buffer() {
      let buffer = BufferNative::<T>::get();
      if buffer == 0 {
        return;
      }
      match T::Burner::burn_native(&Self::account_id(), buffer) {
        Ok(burned) => {
          BufferNative::<T>::put(0);
          TotalNativeBurned::<T>::mutate(|total| *total = total.saturating_add(burned));
          Self::deposit_event(Event::NativeFeesBurned { amount: burned });
        }
        Err(error) => {
          log::debug!(target: "fee-manager", "fee burn deferred: {error:?}");
        }
      }
    }
  }

  /// Genesis configuration for the swap threshold and the ED-free pallet account
  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub min_swap_foreign: Balance,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        min_swap_foreign: params::MIN_SWAP_FOREIGN,
        _marker: Default::default(),
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      MinSwapForeign::<T>::put(self.min_swap_foreign);
      // Pallet account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
