//! Smart Router Pallet
//!
//! Front-end for every external trade: compares the bonding-curve mint route
//! with the pool route on the net amount, executes the better one, and
//! forwards the router fee to the fee manager ahead of execution.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

pub mod types;
pub use types::*;


pub mod weights;
pub use weights::WeightInfo;

#[frame::pallet]
pub mod pallet {
  use super::WeightInfo;
  use crate::types::{
    FeeRoutingAdapter, MintingCurveInterface, PoolInterface, Route, TradeReport,
  };
  use frame::deps::sp_runtime::Permill;
  use frame::prelude::*;
  use primitives::{Balance, ecosystem::params, math};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Constant-product pool branch
    type Pool: PoolInterface<Self::AccountId>;

    /// Bonding-curve mint branch
    type MintingCurve: MintingCurveInterface<Self::AccountId>;

    /// Fee sink receiving the router fee
    type FeeRouter: FeeRoutingAdapter<Self::AccountId>;

    /// Weight information
    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::type_value]
  pub fn DefaultRouterFee<T: Config>() -> Permill {
    params::ROUTER_FEE
  }

  #[pallet::type_value]
  pub fn DefaultMinSwapForeign<T: Config>() -> Balance {
    params::MIN_SWAP_FOREIGN
  }

  #[pallet::type_value]
  pub fn DefaultMinInitialForeign<T: Config>() -> Balance {
    params::MIN_INITIAL_FOREIGN
  }

  /// Proportional fee captured on every trade, fixed at construction
  #[pallet::storage]
  #[pallet::getter(fn router_fee)]
  pub type RouterFee<T: Config> = StorageValue<_, Permill, ValueQuery, DefaultRouterFee<T>>;

  /// Minimum foreign value accepted for any trade
  #[pallet::storage]
  #[pallet::getter(fn min_swap_foreign)]
  pub type MinSwapForeign<T: Config> =
    StorageValue<_, Balance, ValueQuery, DefaultMinSwapForeign<T>>;

  /// Minimum foreign payment while the pool is not yet live
  #[pallet::storage]
  #[pallet::getter(fn min_initial_foreign)]
  pub type MinInitialForeign<T: Config> =
    StorageValue<_, Balance, ValueQuery, DefaultMinInitialForeign<T>>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Trade routed and executed
    SwapExecuted {
      who: T::AccountId,
      route: Route,
      amount_in: Balance,
      fee: Balance,
      amount_out: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Zero or fee-consumed amount
    ZeroAmount,
    /// Trade value below the minimum swap threshold
    BelowMinimumSwap,
    /// First mint must meet the initial-liquidity floor
    BelowInitialMintMinimum,
    /// Native sales need a live pool
    PoolNotInitialized,
    /// Pool cannot price the trade
    InsufficientLiquidity,
    /// No branch can satisfy the requested minimum output
    SlippageExceeded,
    /// Neither branch produces any output
    NoRouteAvailable,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Trade foreign for native through the better of mint and pool routes
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::swap_foreign_to_native())]
    pub fn swap_foreign_to_native(
      origin: OriginFor<T>,
      foreign_in: Balance,
      min_native_out: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_swap_foreign_to_native(&who, foreign_in, min_native_out)?;
      Ok(())
    }

    /// Trade native for foreign through the pool
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::swap_native_to_foreign())]
    pub fn swap_native_to_foreign(
      origin: OriginFor<T>,
      native_in: Balance,
      min_foreign_out: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_swap_native_to_foreign(&who, native_in, min_foreign_out)?;
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Quote both branches on the net amount and execute the better one.
    pub fn do_swap_foreign_to_native(
      who: &T::AccountId,
      foreign_in: Balance,
      min_native_out: Balance,
    ) -> Result<TradeReport, DispatchError> {
      ensure!(foreign_in > 0, Error::<T>::ZeroAmount);
      ensure!(
        foreign_in >= MinSwapForeign::<T>::get(),
        Error::<T>::BelowMinimumSwap
      );

      let pool_live = T::Pool::is_live();
      if !pool_live {
        ensure!(
          foreign_in >= MinInitialForeign::<T>::get(),
          Error::<T>::BelowInitialMintMinimum
        );
      }

      let fee = RouterFee::<T>::get().mul_floor(foreign_in);
      let net = foreign_in - fee;
      ensure!(net > 0, Error::<T>::ZeroAmount);

      let curve_user = T::MintingCurve::mint_quote(net)
        .map(|(user, _total)| user)
        .unwrap_or(0);
      let pool_out = if pool_live {
        T::Pool::quote_native_out(net)
      } else {
        0
      };

      let curve_viable = curve_user > 0 && curve_user >= min_native_out;
      let pool_viable = pool_out > 0 && pool_out >= min_native_out;

      // The curve wins ties: protocol liquidity over market liquidity
      let route = if curve_viable && (!pool_viable || curve_user >= pool_out) {
        Route::Utbc
      } else if pool_viable {
        Route::Xyk
      } else if pool_out > 0 {
        return Err(Error::<T>::SlippageExceeded.into());
      } else {
        return Err(Error::<T>::NoRouteAvailable.into());
      };

      if fee > 0 {
        T::FeeRouter::route_fee_foreign(who, fee)?;
      }

      let report = match route {
        Route::Utbc => {
          let summary = T::MintingCurve::mint(who, net)?;
          TradeReport {
            route,
            amount_in: foreign_in,
            fee,
            amount_out: summary.user_native,
            price_before: summary.price_before,
            price_after: summary.price_after,
            price_impact_ppm: 0,
            pol_lp_minted: summary.pol_lp_minted,
          }
        }
        Route::Xyk => {
          let swap = T::Pool::swap_foreign_to_native(who, net, min_native_out)?;
          TradeReport {
            route,
            amount_in: foreign_in,
            fee,
            amount_out: swap.amount_out,
            price_before: swap.price_before,
            price_after: swap.price_after,
            price_impact_ppm: swap.price_impact_ppm,
            pol_lp_minted: 0,
          }
        }
      };

      Self::deposit_event(Event::SwapExecuted {
        who: who.clone(),
        route,
        amount_in: foreign_in,
        fee,
        amount_out: report.amount_out,
      });

      Ok(report)
    }

    /// Sell native into the pool. The curve is unidirectional, so there is no
    /// mint-side branch on this path.
    pub fn do_swap_native_to_foreign(
      who: &T::AccountId,
      native_in: Balance,
      min_foreign_out: Balance,
    ) -> Result<TradeReport, DispatchError> {
      ensure!(native_in > 0, Error::<T>::ZeroAmount);
      ensure!(T::Pool::is_live(), Error::<T>::PoolNotInitialized);

      let fee = RouterFee::<T>::get().mul_floor(native_in);
      let net = native_in - fee;

      let price_spot = T::Pool::spot_price().unwrap_or(0);
      ensure!(price_spot > 0, Error::<T>::InsufficientLiquidity);

      let net_as_foreign = math::mul_div(net, price_spot, params::PRECISION).unwrap_or(0);
      ensure!(
        net_as_foreign >= MinSwapForeign::<T>::get(),
        Error::<T>::BelowMinimumSwap
      );

      if fee > 0 {
        T::FeeRouter::route_fee_native(who, fee)?;
      }

      let swap = T::Pool::swap_native_to_foreign(who, net, min_foreign_out)?;

      Self::deposit_event(Event::SwapExecuted {
        who: who.clone(),
        route: Route::Xyk,
        amount_in: native_in,
        fee,
        amount_out: swap.amount_out,
      });

      Ok(TradeReport {
        route: Route::Xyk,
        amount_in: native_in,
        fee,
        amount_out: swap.amount_out,
        price_before: swap.price_before,
        price_after: swap.price_after,
        price_impact_ppm: swap.price_impact_ppm,
        pol_lp_minted: 0,
      })
    }
  }

  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub fee: Permill,
    pub min_swap_foreign: Balance,
    pub min_initial_foreign: Balance,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        fee: params::ROUTER_FEE,
        min_swap_foreign: params::MIN_SWAP_FOREIGN,
        min_initial_foreign: params::MIN_INITIAL_FOREIGN,
        _marker: Default::default(),
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      assert!(self.fee < Permill::one(), "router fee must stay below 100%");
      RouterFee::<T>::put(self.fee);
      MinSwapForeign::<T>::put(self.min_swap_foreign);
      MinInitialForeign::<T>::put(self.min_initial_foreign);
    }
  }
}
