// SPDX-License-Identifier: MIT

use crate::domain::constants::{V2_FEE_DENOMINATOR, V2_FEE_NUMERATOR};
use alloy::primitives::Address;
use std::collections::HashSet;

/// Which quote adapter services a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VenueKind {
    /// V2-style pool priced by `reserveIn * reserveOut = k`.
    ConstantProduct,
    /// V3-style pool with fee tiers, quoted via a dedicated quoter contract.
    ConcentratedLiquidity,
}

/// How a Solidly-style venue decides whether a hop may use its stable pool.
///
/// The upstream bots disagreed on this; both strategies exist behind a
/// config switch. Either way a hop falls back to the volatile pool unless a
/// stable pool is confirmed to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StablePoolPolicy {
    /// Never consider stable pools.
    Never,
    /// Probe the factory for a stable pool on every hop.
    OnChain,
    /// Consider the stable pool only when both hop tokens appear in a static
    /// stable-token set (pool existence is still confirmed on-chain).
    StableList(HashSet<Address>),
}

/// A configured DEX the aggregator may query.
#[derive(Debug, Clone)]
pub struct Venue {
    pub name: String,
    pub kind: VenueKind,
    pub router: Address,
    /// Pair factory; required for constant-product venues.
    pub factory: Option<Address>,
    /// Quoter contract; required for concentrated-liquidity venues.
    pub quoter: Option<Address>,
    /// Ordered fee tiers in bps; concentrated-liquidity venues only.
    pub fee_tiers: Vec<u32>,
    /// Constant-product swap fee as numerator/denominator (997/1000 = 0.3%).
    pub fee_numerator: u64,
    pub fee_denominator: u64,
    /// Solidly-style venues keep distinct stable and volatile pools per pair.
    pub supports_stable: bool,
    pub stable_policy: StablePoolPolicy,
}

impl Venue {
    pub fn constant_product(name: impl Into<String>, router: Address, factory: Address) -> Self {
        Self {
            name: name.into(),
            kind: VenueKind::ConstantProduct,
            router,
            factory: Some(factory),
            quoter: None,
            fee_tiers: Vec::new(),
            fee_numerator: V2_FEE_NUMERATOR,
            fee_denominator: V2_FEE_DENOMINATOR,
            supports_stable: false,
            stable_policy: StablePoolPolicy::Never,
        }
    }

    pub fn concentrated(
        name: impl Into<String>,
        router: Address,
        quoter: Address,
        fee_tiers: Vec<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: VenueKind::ConcentratedLiquidity,
            router,
            factory: None,
            quoter: Some(quoter),
            fee_tiers,
            fee_numerator: V2_FEE_NUMERATOR,
            fee_denominator: V2_FEE_DENOMINATOR,
            supports_stable: false,
            stable_policy: StablePoolPolicy::Never,
        }
    }
}
