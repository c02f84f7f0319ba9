use crate as pallet_xyk_pool;

use polkadot_sdk::frame_support::{
  PalletId, assert_ok, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, Get, fungible::Mutate as FungibleMutate, fungibles::Mutate as FungiblesMutate},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::ecosystem::params::PRECISION;

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    XykPool: pallet_xyk_pool,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

pub const FOREIGN_ASSET: u32 = 1;

pub struct PoolPalletId;
impl Get<PalletId> for PoolPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::XYK_POOL_PALLET_ID)
  }
}

impl pallet_xyk_pool::Config for Test {
  type Currency = Balances;
  type Assets = Assets;
  type ForeignAssetId = ConstU32<FOREIGN_ASSET>;
  type PalletId = PoolPalletId;
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  new_test_ext_with_fee(primitives::params::XYK_FEE)
}

pub fn new_test_ext_with_fee(fee: Permill) -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  pallet_xyk_pool::GenesisConfig::<Test> {
    fee,
    _marker: Default::default(),
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);

    assert_ok!(Assets::force_create(RuntimeOrigin::root(), FOREIGN_ASSET, 1, true, 1));

    for account in [1u64, 2, 3] {
      assert_ok!(<Balances as FungibleMutate<u64>>::mint_into(
        &account,
        1_000_000 * PRECISION
      ));
      assert_ok!(<Assets as FungiblesMutate<u64>>::mint_into(
        FOREIGN_ASSET,
        &account,
        1_000_000 * PRECISION
      ));
    }
  });
  ext
}
