//! Token Minting Curve Pallet
//!
//! Linear bonding-curve issuer: quotes and executes unidirectional mints
//! against the foreign reserve token, distributes minted supply by fixed
//! shares, and supports explicit burn.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;


pub mod weights;
pub use weights::WeightInfo;

use primitives::Balance;

/// Interface to the protocol-owned-liquidity manager.
///
/// Receives the freshly minted POL allocation together with the full foreign
/// payment; returns `(lp_minted, native_used, foreign_used)` and must not
/// fail. Amounts that cannot be deployed stay buffered inside the manager.
pub trait PolLiquidity {
  fn provide_liquidity(native: Balance, foreign: Balance) -> (Balance, Balance, Balance);
}

impl PolLiquidity for () {
  fn provide_liquidity(_native: Balance, _foreign: Balance) -> (Balance, Balance, Balance) {
    (0, 0, 0)
  }
}

/// Pure mint quote: the four-way split of a prospective mint
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MintQuote {
  pub minted: Balance,
  pub user: Balance,
  pub pol: Balance,
  pub treasury: Balance,
  pub team: Balance,
}

/// Full report of an executed mint
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MintReport {
  pub foreign_in: Balance,
  pub total_native: Balance,
  pub user_native: Balance,
  pub pol_native: Balance,
  pub treasury_native: Balance,
  pub team_native: Balance,
  pub price_before: Balance,
  pub price_after: Balance,
  pub pol_lp_minted: Balance,
  pub pol_native_used: Balance,
  pub pol_foreign_used: Balance,
}

/// Report of an executed burn
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BurnReport {
  pub native_burned: Balance,
  pub supply_before: Balance,
  pub supply_after: Balance,
}

#[frame::pallet]
pub mod pallet {
  use super::{Balance, BurnReport, MintQuote, MintReport, PolLiquidity, WeightInfo};
  use frame::deps::{
    frame_support::traits::{
      fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
      fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
      tokens::{Fortitude, Precision, Preservation},
    },
    sp_core::U512,
    sp_runtime::Permill,
  };
  use frame::prelude::*;
  use primitives::{ecosystem::params, math};

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

    /// Account of the POL manager, receiving its allocation and the payment
    type PolAccount: Get<Self::AccountId>;

    /// Account accumulating the treasury allocation
    type TreasuryAccount: Get<Self::AccountId>;

    /// Account accumulating the team allocation
    type TeamAccount: Get<Self::AccountId>;

    /// POL manager invoked after every mint
    type PolLiquidity: PolLiquidity;

    /// Weight information
    type WeightInfo: WeightInfo;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Fixed four-way split applied to every minted quantity
  #[derive(Clone, Encode, Decode, Eq, PartialEq, Debug, TypeInfo, MaxEncodedLen)]
  pub struct DistributionShares {
    pub user: Permill,
    pub pol: Permill,
    pub treasury: Permill,
    pub team: Permill,
  }

  impl DistributionShares {
    /// True iff the four shares sum to exactly one million parts
    pub fn is_complete(&self) -> bool {
      u64::from(self.user.deconstruct())
        + u64::from(self.pol.deconstruct())
        + u64::from(self.treasury.deconstruct())
        + u64::from(self.team.deconstruct())
        == 1_000_000
    }
  }

  /// Curve configuration, immutable after construction
  #[derive(Clone, Encode, Decode, Eq, PartialEq, Debug, TypeInfo, MaxEncodedLen)]
  pub struct CurveConfig {
    /// Spot price at zero supply, PRECISION-scaled
    pub price_initial: Balance,
    /// Price increase per native base unit, PPM-scaled
    pub slope_ppm: Balance,
    /// Distribution of every minted quantity
    pub shares: DistributionShares,
  }

  #[pallet::type_value]
  pub fn DefaultCurve<T: Config>() -> CurveConfig {
    CurveConfig {
      price_initial: params::PRICE_INITIAL,
      slope_ppm: params::SLOPE_PPM,
      shares: DistributionShares {
        user: params::USER_SHARE,
        pol: params::POL_SHARE,
        treasury: params::TREASURY_SHARE,
        team: params::TEAM_SHARE,
      },
    }
  }

  /// Curve parameters
  #[pallet::storage]
  #[pallet::getter(fn curve)]
  pub type Curve<T: Config> = StorageValue<_, CurveConfig, ValueQuery, DefaultCurve<T>>;

  /// Native supply issued through the curve, net of burns
  #[pallet::storage]
  #[pallet::getter(fn supply)]
  pub type Supply<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Cumulative treasury allocation
  #[pallet::storage]
  #[pallet::getter(fn treasury_minted)]
  pub type TreasuryMinted<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Cumulative team allocation
  #[pallet::storage]
  #[pallet::getter(fn team_minted)]
  pub type TeamMinted<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Supply minted through the curve and distributed
    NativeMinted {
      who: T::AccountId,
      foreign_in: Balance,
      total_native: Balance,
      user_native: Balance,
      pol_native: Balance,
      treasury_native: Balance,
      team_native: Balance,
    },
    /// Supply burned
    NativeBurned {
      who: T::AccountId,
      native_burned: Balance,
      supply_after: Balance,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Zero amount not allowed
    ZeroAmount,
    /// Payment too small to mint a single supply unit
    InsufficientAmount,
    /// Burn amount exceeds the curve supply
    SupplyExhausted,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Burn the caller's native tokens, shrinking the curve supply
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::burn())]
    pub fn burn(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_burn(&who, amount)?;
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Spot price at the current supply: `price_initial + slope · supply / PPM`
    pub fn current_price() -> Balance {
      let curve = Curve::<T>::get();
      let climb = math::mul_div(curve.slope_ppm, Supply::<T>::get(), params::PPM)
        .unwrap_or(Balance::MAX);
      curve.price_initial.saturating_add(climb)
    }

    /// Largest supply increment whose integral cost stays within the payment.
    ///
    /// Solves `a·Δ² + b·Δ + c = 0` for a = slope, b = 2(price_initial·PPM +
    /// slope·supply), c = −2·f·PPM·PRECISION; the discriminant exceeds 256
    /// bits for extreme price parameters, hence U512.
    pub fn calculate_mint(foreign_amount: Balance) -> Balance {
      if foreign_amount == 0 {
        return 0;
      }
      let curve = Curve::<T>::get();

      if curve.slope_ppm == 0 {
        return math::mul_div(foreign_amount, params::PRECISION, curve.price_initial).unwrap_or(0);
      }

      let ppm = U512::from(params::PPM);
      let a = U512::from(curve.slope_ppm);
      let b = U512::from(2u32)
        * (U512::from(curve.price_initial) * ppm + a * U512::from(Supply::<T>::get()));
      // c is negative; −4·a·c folds into the discriminant as a positive term
      let minus_four_ac =
        U512::from(8u32) * a * U512::from(foreign_amount) * ppm * U512::from(params::PRECISION);

      let root = (b * b + minus_four_ac).integer_sqrt();
      if root <= b {
        return 0;
      }
      let delta = (root - b) / (U512::from(2u32) * a);
      if delta > U512::from(u128::MAX) {
        return 0;
      }
      delta.as_u128()
    }

    /// Pure quote for a prospective mint; `None` when the payment buys nothing
    pub fn mint_quote(foreign_amount: Balance) -> Option<MintQuote> {
      let minted = Self::calculate_mint(foreign_amount);
      if minted == 0 {
        return None;
      }
      let shares = Curve::<T>::get().shares;
      let user = shares.user.mul_floor(minted);
      let pol = shares.pol.mul_floor(minted);
      let treasury = shares.treasury.mul_floor(minted);
      // The remainder lands on the team so no unit is ever lost
      let team = minted - user - pol - treasury;
      Some(MintQuote {
        minted,
        user,
        pol,
        treasury,
        team,
      })
    }

    /// Execute a mint for `who`'s foreign payment.
    ///
    /// The full payment moves to the POL manager; the user share is minted to
    /// `who` and the rest to the configured allocation accounts.
    pub fn do_mint(who: &T::AccountId, foreign_amount: Balance) -> Result<MintReport, DispatchError> {
      ensure!(foreign_amount > 0, Error::<T>::ZeroAmount);
      let quote = Self::mint_quote(foreign_amount).ok_or(Error::<T>::InsufficientAmount)?;

      let price_before = Self::current_price();

      T::Assets::transfer(
        T::ForeignAssetId::get(),
        who,
        &T::PolAccount::get(),
        foreign_amount,
        Preservation::Expendable,
      )?;

      T::Currency::mint_into(who, quote.user)?;
      T::Currency::mint_into(&T::PolAccount::get(), quote.pol)?;
      T::Currency::mint_into(&T::TreasuryAccount::get(), quote.treasury)?;
      T::Currency::mint_into(&T::TeamAccount::get(), quote.team)?;

      Supply::<T>::mutate(|supply| *supply = supply.saturating_add(quote.minted));
      TreasuryMinted::<T>::mutate(|total| *total = total.saturating_add(quote.treasury));
      TeamMinted::<T>::mutate(|total| *total = total.saturating_add(quote.team));

      let (pol_lp_minted, pol_native_used, pol_foreign_used) =
        T::PolLiquidity::provide_liquidity(quote.pol, foreign_amount);

      let price_after = Self::current_price();

      Self::deposit_event(Event::NativeMinted {
        who: who.clone(),
        foreign_in: foreign_amount,
        total_native: quote.minted,
        user_native: quote.user,
        pol_native: quote.pol,
        treasury_native: quote.treasury,
        team_native: quote.team,
      });

      Ok(MintReport {
        foreign_in: foreign_amount,
        total_native: quote.minted,
        user_native: quote.user,
        pol_native: quote.pol,
        treasury_native: quote.treasury,
        team_native: quote.team,
        price_before,
        price_after,
        pol_lp_minted,
        pol_native_used,
        pol_foreign_used,
      })
    }

    /// Burn `amount` of `who`'s native tokens and shrink the supply.
    pub fn do_burn(who: &T::AccountId, amount: Balance) -> Result<BurnReport, DispatchError> {
      ensure!(amount > 0, Error::<T>::ZeroAmount);
      let supply_before = Supply::<T>::get();
      ensure!(amount <= supply_before, Error::<T>::SupplyExhausted);

      T::Currency::burn_from(
        who,
        amount,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;

      let supply_after = supply_before - amount;
      Supply::<T>::put(supply_after);

      Self::deposit_event(Event::NativeBurned {
        who: who.clone(),
        native_burned: amount,
        supply_after,
      });

      Ok(BurnReport {
        native_burned: amount,
        supply_before,
        supply_after,
      })
    }
  }

  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub price_initial: Balance,
    pub slope_ppm: Balance,
    pub user_share: Permill,
    pub pol_share: Permill,
    pub treasury_share: Permill,
    pub team_share: Permill,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        price_initial: params::PRICE_INITIAL,
        slope_ppm: params::SLOPE_PPM,
        user_share: params::USER_SHARE,
        pol_share: params::POL_SHARE,
        treasury_share: params::TREASURY_SHARE,
        team_share: params::TEAM_SHARE,
        _marker: Default::default(),
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      assert!(self.price_initial > 0, "initial price must be positive");
      let shares = DistributionShares {
        user: self.user_share,
        pol: self.pol_share,
        treasury: self.treasury_share,
        team: self.team_share,
      };
      assert!(
        shares.is_complete(),
        "distribution shares must sum to one million parts"
      );
      Curve::<T>::put(CurveConfig {
        price_initial: self.price_initial,
        slope_ppm: self.slope_ppm,
        shares,
      });
    }
  }
}
