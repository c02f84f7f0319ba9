//! XYK Pool Pallet
//!
//! Constant-product market maker for the native/foreign pair with
//! protocol-internal LP accounting.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
pub mod mock;

use primitives::Balance;

/// Result of an `add_liquidity` call.
///
/// On a live-pool top-up only the `*_used` amounts leave the caller; the
/// `*_rest` remainders never move.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LiquidityOutcome {
  pub lp_minted: Balance,
  pub native_used: Balance,
  pub foreign_used: Balance,
  pub native_rest: Balance,
  pub foreign_rest: Balance,
}

/// Result of a swap, with spot prices sampled before and after execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwapOutcome {
  pub amount_in: Balance,
  pub amount_out: Balance,
  pub price_before: Balance,
  pub price_after: Balance,
  /// `|Δprice| · PPM / price_before`; may exceed one million parts
  pub price_impact_ppm: Balance,
}

#[frame::pallet]
pub mod pallet {
  use super::{Balance, LiquidityOutcome, SwapOutcome};
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
      tokens::Preservation,
    },
    sp_core::U512,
    sp_runtime::{Permill, traits::AccountIdConversion},
  };
  use frame::prelude::*;
  use primitives::{ecosystem::params, math};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Native side of the pair
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;

    /// Foreign side of the pair
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;

    /// Asset id of the foreign reserve token
    #[pallet::constant]
    type ForeignAssetId: Get<u32>;

    /// Pallet ID the reserve account is derived from
    #[pallet::constant]
    type PalletId: Get<PalletId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::type_value]
  pub fn DefaultFee<T: Config>() -> Permill {
    params::XYK_FEE
  }

  /// Proportional swap fee, fixed at construction
  #[pallet::storage]
  #[pallet::getter(fn fee_ppm)]
  pub type FeePpm<T: Config> = StorageValue<_, Permill, ValueQuery, DefaultFee<T>>;

  /// Native units held by the pool
  #[pallet::storage]
  #[pallet::getter(fn reserve_native)]
  pub type ReserveNative<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Foreign units held by the pool
  #[pallet::storage]
  #[pallet::getter(fn reserve_foreign)]
  pub type ReserveForeign<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Total LP units ever minted against the reserves
  #[pallet::storage]
  #[pallet::getter(fn lp_supply)]
  pub type LpSupply<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Pool bootstrapped out of the empty state
    PoolInitialized {
      provider: T::AccountId,
      native_in: Balance,
      foreign_in: Balance,
      lp_minted: Balance,
    },
    /// Liquidity added to a live pool
    LiquidityAdded {
      provider: T::AccountId,
      native_used: Balance,
      foreign_used: Balance,
      lp_minted: Balance,
    },
    /// Native sold into the pool for foreign
    NativeSoldForForeign {
      who: T::AccountId,
      native_in: Balance,
      foreign_out: Balance,
      price_impact_ppm: Balance,
    },
    /// Foreign sold into the pool for native
    ForeignSoldForNative {
      who: T::AccountId,
      foreign_in: Balance,
      native_out: Balance,
      price_impact_ppm: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Zero amount not allowed
    ZeroAmount,
    /// Pool is not live or the deposit is too small to mint LP
    InsufficientLiquidity,
    /// Output would drain the opposing reserve
    InsufficientReserves,
    /// Output below the caller-supplied minimum
    SlippageExceeded,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
  }

  impl<T: Config> Pallet<T> {
    /// Get the account ID holding both reserves
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// True iff both reserves are strictly positive
    pub fn has_liquidity() -> bool {
      ReserveNative::<T>::get() > 0 && ReserveForeign::<T>::get() > 0
    }

    /// Current reserves as `(native, foreign)`
    pub fn reserves() -> (Balance, Balance) {
      (ReserveNative::<T>::get(), ReserveForeign::<T>::get())
    }

    /// Spot price in foreign per native, PRECISION-scaled. Requires a live pool.
    pub fn spot_price() -> Result<Balance, DispatchError> {
      ensure!(Self::has_liquidity(), Error::<T>::InsufficientLiquidity);
      Self::price_of(ReserveNative::<T>::get(), ReserveForeign::<T>::get())
    }

    /// Quote the native output of a foreign sale; zero when the pool is not live.
    pub fn get_out_native(foreign_in: Balance) -> Balance {
      if !Self::has_liquidity() {
        return 0;
      }
      Self::quote_out(foreign_in, ReserveForeign::<T>::get(), ReserveNative::<T>::get())
    }

    /// Quote the foreign output of a native sale; zero when the pool is not live.
    pub fn get_out_foreign(native_in: Balance) -> Balance {
      if !Self::has_liquidity() {
        return 0;
      }
      Self::quote_out(native_in, ReserveNative::<T>::get(), ReserveForeign::<T>::get())
    }

    /// Fee-adjusted constant-product output
    ///
    /// out = in·(PPM − fee)·reserve_out / (reserve_in·PPM + in·(PPM − fee))
    fn quote_out(amount_in: Balance, reserve_in: Balance, reserve_out: Balance) -> Balance {
      if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return 0;
      }
      let fee = Balance::from(FeePpm::<T>::get().deconstruct());
      let in_after_fee = U512::from(amount_in) * U512::from(params::PPM - fee);
      let numerator = in_after_fee * U512::from(reserve_out);
      let denominator = U512::from(reserve_in) * U512::from(params::PPM) + in_after_fee;
      (numerator / denominator).as_u128()
    }

    fn price_of(reserve_native: Balance, reserve_foreign: Balance) -> Result<Balance, DispatchError> {
      math::mul_div(reserve_foreign, params::PRECISION, reserve_native)
        .ok_or_else(|| Error::<T>::ArithmeticOverflow.into())
    }

    fn impact_ppm(price_before: Balance, price_after: Balance) -> Result<Balance, DispatchError> {
      if price_before == 0 {
        return Ok(0);
      }
      math::mul_div(price_before.abs_diff(price_after), params::PPM, price_before)
        .ok_or_else(|| Error::<T>::ArithmeticOverflow.into())
    }

    /// Deposit liquidity from `who`, bootstrapping the pool when it is empty.
    ///
    /// Both amounts must be strictly positive. Checks run before any transfer
    /// and transfers before any storage write, so an error implies no mutation.
    pub fn do_add_liquidity(
      who: &T::AccountId,
      native_in: Balance,
      foreign_in: Balance,
    ) -> Result<LiquidityOutcome, DispatchError> {
      ensure!(native_in > 0 && foreign_in > 0, Error::<T>::ZeroAmount);

      let lp_supply = LpSupply::<T>::get();
      if lp_supply == 0 {
        return Self::bootstrap(who, native_in, foreign_in);
      }

      let reserve_native = ReserveNative::<T>::get();
      let reserve_foreign = ReserveForeign::<T>::get();

      let lp_from_native = math::mul_div(native_in, lp_supply, reserve_native)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let lp_from_foreign = math::mul_div(foreign_in, lp_supply, reserve_foreign)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let lp_minted = lp_from_native.min(lp_from_foreign);
      ensure!(lp_minted > 0, Error::<T>::InsufficientLiquidity);

      let native_used = math::mul_div(reserve_native, lp_minted, lp_supply)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let foreign_used = math::mul_div(reserve_foreign, lp_minted, lp_supply)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      let reserve_native_after = reserve_native
        .checked_add(native_used)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let reserve_foreign_after = reserve_foreign
        .checked_add(foreign_used)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let lp_supply_after = lp_supply
        .checked_add(lp_minted)
        .ok_or(Error::<T>::ArithmeticOverflow)?;

      Self::deposit_pair(who, native_used, foreign_used)?;

      ReserveNative::<T>::put(reserve_native_after);
      ReserveForeign::<T>::put(reserve_foreign_after);
      LpSupply::<T>::put(lp_supply_after);

      Self::deposit_event(Event::LiquidityAdded {
        provider: who.clone(),
        native_used,
        foreign_used,
        lp_minted,
      });

      Ok(LiquidityOutcome {
        lp_minted,
        native_used,
        foreign_used,
        native_rest: native_in - native_used,
        foreign_rest: foreign_in - foreign_used,
      })
    }

    /// First-time deposit: the supplied pair sets the initial price.
    fn bootstrap(
      who: &T::AccountId,
      native_in: Balance,
      foreign_in: Balance,
    ) -> Result<LiquidityOutcome, DispatchError> {
      let lp_minted = math::sqrt_product(native_in, foreign_in);
      ensure!(lp_minted > 0, Error::<T>::InsufficientLiquidity);

      Self::deposit_pair(who, native_in, foreign_in)?;

      ReserveNative::<T>::put(native_in);
      ReserveForeign::<T>::put(foreign_in);
      LpSupply::<T>::put(lp_minted);

      Self::deposit_event(Event::PoolInitialized {
        provider: who.clone(),
        native_in,
        foreign_in,
        lp_minted,
      });

      Ok(LiquidityOutcome {
        lp_minted,
        native_used: native_in,
        foreign_used: foreign_in,
        native_rest: 0,
        foreign_rest: 0,
      })
    }

    /// Swap native into foreign at the fee-adjusted constant-product rate.
    pub fn do_swap_native_to_foreign(
      who: &T::AccountId,
      native_in: Balance,
      min_foreign_out: Balance,
    ) -> Result<SwapOutcome, DispatchError> {
      ensure!(native_in > 0, Error::<T>::ZeroAmount);
      ensure!(Self::has_liquidity(), Error::<T>::InsufficientLiquidity);

      let reserve_native = ReserveNative::<T>::get();
      let reserve_foreign = ReserveForeign::<T>::get();

      let foreign_out = Self::quote_out(native_in, reserve_native, reserve_foreign);
      ensure!(foreign_out >= min_foreign_out, Error::<T>::SlippageExceeded);
      ensure!(foreign_out < reserve_foreign, Error::<T>::InsufficientReserves);

      let reserve_native_after = reserve_native
        .checked_add(native_in)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let reserve_foreign_after = reserve_foreign - foreign_out;

      let price_before = Self::price_of(reserve_native, reserve_foreign)?;
      let price_after = Self::price_of(reserve_native_after, reserve_foreign_after)?;
      let price_impact_ppm = Self::impact_ppm(price_before, price_after)?;

      let pool = Self::account_id();
      T::Currency::transfer(who, &pool, native_in, Preservation::Expendable)?;
      T::Assets::transfer(
        T::ForeignAssetId::get(),
        &pool,
        who,
        foreign_out,
        Preservation::Expendable,
      )?;

      ReserveNative::<T>::put(reserve_native_after);
      ReserveForeign::<T>::put(reserve_foreign_after);

      Self::deposit_event(Event::NativeSoldForForeign {
        who: who.clone(),
        native_in,
        foreign_out,
        price_impact_ppm,
      });

      Ok(SwapOutcome {
        amount_in: native_in,
        amount_out: foreign_out,
        price_before,
        price_after,
        price_impact_ppm,
      })
    }

    /// Swap foreign into native at the fee-adjusted constant-product rate.
    pub fn do_swap_foreign_to_native(
      who: &T::AccountId,
      foreign_in: Balance,
      min_native_out: Balance,
    ) -> Result<SwapOutcome, DispatchError> {
      ensure!(foreign_in > 0, Error::<T>::ZeroAmount);
      ensure!(Self::has_liquidity(), Error::<T>::InsufficientLiquidity);

      let reserve_native = ReserveNative::<T>::get();
      let reserve_foreign = ReserveForeign::<T>::get();

      let native_out = Self::quote_out(foreign_in, reserve_foreign, reserve_native);
      ensure!(native_out >= min_native_out, Error::<T>::SlippageExceeded);
      ensure!(native_out < reserve_native, Error::<T>::InsufficientReserves);

      let reserve_foreign_after = reserve_foreign
        .checked_add(foreign_in)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let reserve_native_after = reserve_native - native_out;

      let price_before = Self::price_of(reserve_native, reserve_foreign)?;
      let price_after = Self::price_of(reserve_native_after, reserve_foreign_after)?;
      let price_impact_ppm = Self::impact_ppm(price_before, price_after)?;

      let pool = Self::account_id();
      T::Assets::transfer(
        T::ForeignAssetId::get(),
        who,
        &pool,
        foreign_in,
        Preservation::Expendable,
      )?;
      T::Currency::transfer(&pool, who, native_out, Preservation::Expendable)?;

      ReserveForeign::<T>::put(reserve_foreign_after);
      ReserveNative::<T>::put(reserve_native_after);

      Self::deposit_event(Event::ForeignSoldForNative {
        who: who.clone(),
        foreign_in,
        native_out,
        price_impact_ppm,
      });

      Ok(SwapOutcome {
        amount_in: foreign_in,
        amount_out: native_out,
        price_before,
        price_after,
        price_impact_ppm,
      })
    }

    fn deposit_pair(who: &T::AccountId, native: Balance, foreign: Balance) -> DispatchResult {
      let pool = Self::account_id();
      T::Currency::transfer(who, &pool, native, Preservation::Expendable)?;
      T::Assets::transfer(
        T::ForeignAssetId::get(),
        who,
        &pool,
        foreign,
        Preservation::Expendable,
      )?;
      Ok(())
    }
  }

  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub fee: Permill,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        fee: params::XYK_FEE,
        _marker: Default::default(),
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      assert!(self.fee < Permill::one(), "pool fee must stay below 100%");
      FeePpm::<T>::put(self.fee);
      // Pool account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
