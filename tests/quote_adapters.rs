// SPDX-License-Identifier: MIT

//! Adapter-level route selection against a scripted chain: direct versus
//! bridged comparison, stable-pool fallback, the V3 fee-grid sweep, and
//! isolation of per-candidate read failures.

use alloy::primitives::{address, Address, Bytes, U256};
use arbscout::domain::error::AppError;
use arbscout::domain::path::{decode_packed_path, PathKind, RouteDescriptor};
use arbscout::domain::venue::{StablePoolPolicy, Venue};
use arbscout::infrastructure::network::reads::DexReads;
use arbscout::services::quote::v2::{constant_product_out, V2QuoteAdapter};
use arbscout::services::quote::v3::V3QuoteAdapter;
use arbscout::services::quote::{PairCache, QuoteAdapter};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

const TOKEN_A: Address = address!("1111111111111111111111111111111111111111");
const BRIDGE: Address = address!("4200000000000000000000000000000000000006");
const TOKEN_B: Address = address!("8888888888888888888888888888888888888888");

const FACTORY: Address = address!("00000000000000000000000000000000000000F1");
const ROUTER: Address = address!("00000000000000000000000000000000000000F2");
const QUOTER: Address = address!("00000000000000000000000000000000000000F3");

const POOL_AB: Address = address!("00000000000000000000000000000000000000A1");
const POOL_AW: Address = address!("00000000000000000000000000000000000000A2");
const POOL_WB: Address = address!("00000000000000000000000000000000000000A3");
const POOL_AB_STABLE: Address = address!("00000000000000000000000000000000000000A4");

fn ckey(a: Address, b: Address, stable: bool) -> (Address, Address, bool) {
    if a < b { (a, b, stable) } else { (b, a, stable) }
}

/// In-memory chain state; reads against anything unregistered error the way
/// a reverting quoter or a dead node would.
#[derive(Default)]
struct ScriptedChain {
    pools: HashMap<(Address, Address, bool), Address>,
    // Raw (reserve0, reserve1) in stored token order (token0 = lower address).
    reserves: HashMap<Address, (U256, U256)>,
    broken_pools: HashSet<Address>,
    stable_quote: Option<U256>,
    single_quotes: HashMap<(Address, Address, u32), U256>,
    grid_quotes: HashMap<(u32, u32), U256>,
}

#[async_trait]
impl DexReads for ScriptedChain {
    async fn pair_address(
        &self,
        _factory: Address,
        a: Address,
        b: Address,
    ) -> Result<Address, AppError> {
        Ok(*self.pools.get(&ckey(a, b, false)).unwrap_or(&Address::ZERO))
    }

    async fn stable_pool_address(
        &self,
        _factory: Address,
        a: Address,
        b: Address,
        stable: bool,
    ) -> Result<Address, AppError> {
        Ok(*self.pools.get(&ckey(a, b, stable)).unwrap_or(&Address::ZERO))
    }

    async fn pair_reserves(&self, pool: Address) -> Result<(U256, U256), AppError> {
        if self.broken_pools.contains(&pool) {
            return Err(AppError::ChainRead("getReserves: revert".into()));
        }
        self.reserves
            .get(&pool)
            .copied()
            .ok_or_else(|| AppError::ChainRead("getReserves: no code".into()))
    }

    async fn stable_amounts_out(
        &self,
        _router: Address,
        _factory: Address,
        hops: &[Address],
        amount_in: U256,
    ) -> Result<Vec<U256>, AppError> {
        let out = self.stable_quote.unwrap_or(U256::ZERO);
        let mut amounts = vec![amount_in; hops.len().saturating_sub(1)];
        amounts.push(out);
        Ok(amounts)
    }

    async fn quote_single(
        &self,
        _quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        _amount_in: U256,
    ) -> Result<U256, AppError> {
        self.single_quotes
            .get(&(token_in, token_out, fee))
            .copied()
            .ok_or_else(|| AppError::ChainRead("quoteExactInputSingle: revert".into()))
    }

    async fn quote_path(
        &self,
        _quoter: Address,
        path: Bytes,
        _amount_in: U256,
    ) -> Result<U256, AppError> {
        let (_, fees) = decode_packed_path(&path)
            .ok_or_else(|| AppError::ChainRead("quoteExactInput: bad path".into()))?;
        self.grid_quotes
            .get(&(fees[0], fees[1]))
            .copied()
            .ok_or_else(|| AppError::ChainRead("quoteExactInput: revert".into()))
    }
}

fn v2_adapter(chain: ScriptedChain, venue: Venue) -> V2QuoteAdapter {
    let cache = Arc::new(PairCache::new(Duration::from_secs(60), 64));
    V2QuoteAdapter::new(Arc::new(chain), venue, BRIDGE, cache).unwrap()
}

fn deep(r: u64) -> (U256, U256) {
    (U256::from(r), U256::from(r))
}

#[tokio::test]
async fn v2_adapter_selects_bridged_when_it_beats_direct() {
    // The shallow direct pool loses most of the trade to price impact; the
    // deep bridge pools only pay the fee twice.
    let chain = ScriptedChain {
        pools: HashMap::from([
            (ckey(TOKEN_A, TOKEN_B, false), POOL_AB),
            (ckey(TOKEN_A, BRIDGE, false), POOL_AW),
            (ckey(BRIDGE, TOKEN_B, false), POOL_WB),
        ]),
        reserves: HashMap::from([
            (POOL_AB, deep(100_000)),
            (POOL_AW, deep(10_000_000)),
            (POOL_WB, deep(10_000_000)),
        ]),
        ..Default::default()
    };
    let adapter = v2_adapter(chain, Venue::constant_product("pool2", ROUTER, FACTORY));

    let amount = U256::from(10_000u64);
    let path = adapter.quote(TOKEN_A, TOKEN_B, amount).await.unwrap().unwrap();

    assert_eq!(path.kind, PathKind::Bridged);
    assert_eq!(path.hops, vec![TOKEN_A, BRIDGE, TOKEN_B]);
    let hop1 = constant_product_out(
        amount,
        U256::from(10_000_000u64),
        U256::from(10_000_000u64),
        997,
        1000,
    );
    let expected = constant_product_out(
        hop1,
        U256::from(10_000_000u64),
        U256::from(10_000_000u64),
        997,
        1000,
    );
    assert_eq!(path.amount_out, expected);
    assert_eq!(
        path.descriptor,
        RouteDescriptor::ConstantProduct {
            tokens: vec![TOKEN_A, BRIDGE, TOKEN_B],
            stable: false,
        }
    );
}

#[tokio::test]
async fn v2_adapter_keeps_direct_when_it_wins() {
    let chain = ScriptedChain {
        pools: HashMap::from([
            (ckey(TOKEN_A, TOKEN_B, false), POOL_AB),
            (ckey(TOKEN_A, BRIDGE, false), POOL_AW),
            (ckey(BRIDGE, TOKEN_B, false), POOL_WB),
        ]),
        reserves: HashMap::from([
            // Asymmetric reserves so a wrong orientation would change the
            // expected output.
            (POOL_AB, (U256::from(1_000_000u64), U256::from(4_000_000u64))),
            (POOL_AW, deep(50_000)),
            (POOL_WB, deep(50_000)),
        ]),
        ..Default::default()
    };
    let adapter = v2_adapter(chain, Venue::constant_product("pool2", ROUTER, FACTORY));

    let amount = U256::from(10_000u64);
    let path = adapter.quote(TOKEN_A, TOKEN_B, amount).await.unwrap().unwrap();

    assert_eq!(path.kind, PathKind::Direct);
    // TOKEN_A is token0, so reserve0 is the input side.
    let expected =
        constant_product_out(amount, U256::from(1_000_000u64), U256::from(4_000_000u64), 997, 1000);
    assert_eq!(path.amount_out, expected);
}

fn stable_venue() -> Venue {
    let mut venue = Venue::constant_product("solidly", ROUTER, FACTORY);
    venue.supports_stable = true;
    venue.stable_policy = StablePoolPolicy::OnChain;
    venue
}

#[tokio::test]
async fn v2_adapter_takes_the_stable_pool_when_the_router_prices_it() {
    let chain = ScriptedChain {
        pools: HashMap::from([
            (ckey(TOKEN_A, TOKEN_B, false), POOL_AB),
            (ckey(TOKEN_A, TOKEN_B, true), POOL_AB_STABLE),
        ]),
        reserves: HashMap::from([(POOL_AB, deep(1_000_000))]),
        stable_quote: Some(U256::from(9_990u64)),
        ..Default::default()
    };
    let adapter = v2_adapter(chain, stable_venue());

    let path = adapter
        .quote(TOKEN_A, TOKEN_B, U256::from(10_000u64))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path.amount_out, U256::from(9_990u64));
    assert_eq!(
        path.descriptor,
        RouteDescriptor::ConstantProduct {
            tokens: vec![TOKEN_A, TOKEN_B],
            stable: true,
        }
    );
}

#[tokio::test]
async fn v2_adapter_falls_back_to_volatile_when_the_stable_quote_is_empty() {
    // The stable pool exists, but the router prices the route at zero.
    let chain = ScriptedChain {
        pools: HashMap::from([
            (ckey(TOKEN_A, TOKEN_B, false), POOL_AB),
            (ckey(TOKEN_A, TOKEN_B, true), POOL_AB_STABLE),
        ]),
        reserves: HashMap::from([(POOL_AB, deep(1_000_000))]),
        stable_quote: None,
        ..Default::default()
    };
    let adapter = v2_adapter(chain, stable_venue());

    let amount = U256::from(10_000u64);
    let path = adapter.quote(TOKEN_A, TOKEN_B, amount).await.unwrap().unwrap();

    let expected =
        constant_product_out(amount, U256::from(1_000_000u64), U256::from(1_000_000u64), 997, 1000);
    assert_eq!(path.amount_out, expected);
    assert_eq!(
        path.descriptor,
        RouteDescriptor::ConstantProduct {
            tokens: vec![TOKEN_A, TOKEN_B],
            stable: false,
        }
    );
}

#[tokio::test]
async fn v2_adapter_survives_a_failing_candidate() {
    // The direct pool reverts on getReserves; the bridged candidate must
    // still come back instead of the whole venue erroring out.
    let chain = ScriptedChain {
        pools: HashMap::from([
            (ckey(TOKEN_A, TOKEN_B, false), POOL_AB),
            (ckey(TOKEN_A, BRIDGE, false), POOL_AW),
            (ckey(BRIDGE, TOKEN_B, false), POOL_WB),
        ]),
        reserves: HashMap::from([(POOL_AW, deep(1_000_000)), (POOL_WB, deep(1_000_000))]),
        broken_pools: HashSet::from([POOL_AB]),
        ..Default::default()
    };
    let adapter = v2_adapter(chain, Venue::constant_product("pool2", ROUTER, FACTORY));

    let path = adapter
        .quote(TOKEN_A, TOKEN_B, U256::from(10_000u64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path.kind, PathKind::Bridged);
}

#[tokio::test]
async fn v3_adapter_keeps_the_best_across_tiers_and_the_bridge_grid() {
    let chain = ScriptedChain {
        single_quotes: HashMap::from([
            ((TOKEN_A, TOKEN_B, 500u32), U256::from(1_000u64)),
            ((TOKEN_A, TOKEN_B, 3000u32), U256::from(1_100u64)),
        ]),
        grid_quotes: HashMap::from([
            ((500u32, 500u32), U256::from(900u64)),
            ((500u32, 3000u32), U256::from(1_300u64)),
            // (3000, *) combinations revert and must be skipped silently.
        ]),
        ..Default::default()
    };
    let venue = Venue::concentrated("conc", ROUTER, QUOTER, vec![500, 3000]);
    let adapter = V3QuoteAdapter::new(Arc::new(chain), venue, BRIDGE).unwrap();

    let path = adapter
        .quote(TOKEN_A, TOKEN_B, U256::from(10_000u64))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path.kind, PathKind::Bridged);
    assert_eq!(path.fees, vec![500, 3000]);
    assert_eq!(path.amount_out, U256::from(1_300u64));
    match &path.descriptor {
        RouteDescriptor::Concentrated { path: packed } => {
            let (tokens, fees) = decode_packed_path(packed).unwrap();
            assert_eq!(tokens, vec![TOKEN_A, BRIDGE, TOKEN_B]);
            assert_eq!(fees, vec![500, 3000]);
        }
        other => panic!("expected a packed path, got {other:?}"),
    }
}

#[tokio::test]
async fn v3_adapter_prefers_direct_when_the_grid_is_worse() {
    let chain = ScriptedChain {
        single_quotes: HashMap::from([((TOKEN_A, TOKEN_B, 3000u32), U256::from(2_000u64))]),
        grid_quotes: HashMap::from([((3000u32, 3000u32), U256::from(1_500u64))]),
        ..Default::default()
    };
    let venue = Venue::concentrated("conc", ROUTER, QUOTER, vec![3000]);
    let adapter = V3QuoteAdapter::new(Arc::new(chain), venue, BRIDGE).unwrap();

    let path = adapter
        .quote(TOKEN_A, TOKEN_B, U256::from(10_000u64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(path.kind, PathKind::Direct);
    assert_eq!(path.fees, vec![3000]);
    assert_eq!(path.amount_out, U256::from(2_000u64));
}

#[tokio::test]
async fn v3_adapter_with_every_tier_reverting_is_no_path() {
    let venue = Venue::concentrated("conc", ROUTER, QUOTER, vec![500, 3000]);
    let adapter = V3QuoteAdapter::new(Arc::new(ScriptedChain::default()), venue, BRIDGE).unwrap();

    let path = adapter
        .quote(TOKEN_A, TOKEN_B, U256::from(10_000u64))
        .await
        .unwrap();
    assert!(path.is_none());
}
