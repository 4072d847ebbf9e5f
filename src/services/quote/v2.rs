// SPDX-License-Identifier: MIT

//! Constant-product (V2-style) quote adapter.
//!
//! Direct pools are priced locally from fresh reserves; Solidly-style stable
//! pools are priced through the venue router because the stable invariant is
//! not reproduced off-chain.

use crate::domain::error::AppError;
use crate::domain::path::{PathKind, QuotePath, RouteDescriptor};
use crate::domain::venue::{StablePoolPolicy, Venue};
use crate::infrastructure::network::reads::DexReads;
use crate::services::quote::{PairCache, QuoteAdapter};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// `floor(in * feeNum * rOut / (rIn * feeDen + in * feeNum))`.
/// Returns zero when any operand is zero; callers treat zero as "no path".
pub fn constant_product_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_numerator: u64,
    fee_denominator: u64,
) -> U256 {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return U256::ZERO;
    }
    let amount_in_with_fee = amount_in.saturating_mul(U256::from(fee_numerator));
    let numerator = amount_in_with_fee.saturating_mul(reserve_out);
    let denominator = reserve_in
        .saturating_mul(U256::from(fee_denominator))
        .saturating_add(amount_in_with_fee);
    if denominator.is_zero() {
        return U256::ZERO;
    }
    numerator / denominator
}

/// Maps raw `(reserve0, reserve1)` onto `(reserveIn, reserveOut)` for a swap
/// `token_in -> token_out`. V2 pairs store token0 as the numerically smaller
/// address; getting this backwards silently corrupts every quote.
pub fn oriented_reserves(
    token_in: Address,
    token_out: Address,
    reserve0: U256,
    reserve1: U256,
) -> (U256, U256) {
    if token_in < token_out {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    }
}

fn canonical_pair(a: Address, b: Address) -> (Address, Address) {
    if a < b { (a, b) } else { (b, a) }
}

/// Whether the policy permits a stable pool for one hop. Pool existence is a
/// separate on-chain check; this is only the static gate.
fn policy_allows_stable(policy: &StablePoolPolicy, a: Address, b: Address) -> bool {
    match policy {
        StablePoolPolicy::Never => false,
        StablePoolPolicy::OnChain => true,
        StablePoolPolicy::StableList(set) => set.contains(&a) && set.contains(&b),
    }
}

pub struct V2QuoteAdapter {
    reads: Arc<dyn DexReads>,
    venue: Venue,
    bridge_token: Address,
    pair_cache: Arc<PairCache>,
}

impl V2QuoteAdapter {
    pub fn new(
        reads: Arc<dyn DexReads>,
        venue: Venue,
        bridge_token: Address,
        pair_cache: Arc<PairCache>,
    ) -> Result<Self, AppError> {
        if venue.factory.is_none() {
            return Err(AppError::Config(format!(
                "Venue {} has no factory; cannot serve constant-product quotes",
                venue.name
            )));
        }
        Ok(Self {
            reads,
            venue,
            bridge_token,
            pair_cache,
        })
    }

    fn factory(&self) -> Address {
        // Checked in the constructor.
        self.venue.factory.unwrap_or_default()
    }

    fn quote_err(&self, reason: impl std::fmt::Display) -> AppError {
        AppError::Quote {
            venue: self.venue.name.clone(),
            reason: reason.to_string(),
        }
    }

    /// Pool address for (a, b) in the requested variant, going through the
    /// injected discovery cache. `Ok(None)` means the factory reports no pool.
    async fn pool_for(
        &self,
        a: Address,
        b: Address,
        stable: bool,
    ) -> Result<Option<Address>, AppError> {
        let (lo, hi) = canonical_pair(a, b);
        let key = (self.factory(), lo, hi, stable);
        if let Some(cached) = self.pair_cache.get(&key) {
            return Ok(cached);
        }

        let pool = if self.venue.supports_stable {
            self.reads
                .stable_pool_address(self.factory(), a, b, stable)
                .await
                .map_err(|e| self.quote_err(e))?
        } else {
            self.reads
                .pair_address(self.factory(), a, b)
                .await
                .map_err(|e| self.quote_err(e))?
        };

        let resolved = (pool != Address::ZERO).then_some(pool);
        self.pair_cache.insert(key, resolved);
        Ok(resolved)
    }

    /// Whether this path may run on stable pools: the policy must allow every
    /// hop and a stable pool must be confirmed to exist for every hop.
    async fn stable_path_available(&self, hops: &[Address]) -> Result<bool, AppError> {
        if !self.venue.supports_stable {
            return Ok(false);
        }
        for window in hops.windows(2) {
            let allowed = policy_allows_stable(&self.venue.stable_policy, window[0], window[1]);
            if !allowed || self.pool_for(window[0], window[1], true).await?.is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// One volatile hop priced from fresh reserves. `Ok(None)` when the pool
    /// is missing or has empty reserves.
    async fn volatile_hop_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<U256>, AppError> {
        let Some(pool) = self.pool_for(token_in, token_out, false).await? else {
            return Ok(None);
        };
        let (reserve0, reserve1) = self
            .reads
            .pair_reserves(pool)
            .await
            .map_err(|e| self.quote_err(e))?;

        let (reserve_in, reserve_out) = oriented_reserves(token_in, token_out, reserve0, reserve1);
        let out = constant_product_out(
            amount_in,
            reserve_in,
            reserve_out,
            self.venue.fee_numerator,
            self.venue.fee_denominator,
        );
        Ok((!out.is_zero()).then_some(out))
    }

    /// Stable hops chained through the venue router's on-chain math.
    async fn stable_path_out(
        &self,
        hops: &[Address],
        amount_in: U256,
    ) -> Result<Option<U256>, AppError> {
        let amounts = self
            .reads
            .stable_amounts_out(self.venue.router, self.factory(), hops, amount_in)
            .await
            .map_err(|e| self.quote_err(e))?;
        let out = amounts.last().copied().unwrap_or(U256::ZERO);
        Ok((!out.is_zero()).then_some(out))
    }

    /// Evaluates one candidate hop sequence; picks the stable variant only
    /// when it is confirmed for the whole path, volatile otherwise.
    async fn quote_hops(
        &self,
        hops: &[Address],
        amount_in: U256,
    ) -> Result<Option<(U256, bool)>, AppError> {
        if self.stable_path_available(hops).await? {
            match self.stable_path_out(hops, amount_in).await {
                Ok(Some(out)) => return Ok(Some((out, true))),
                Ok(None) => {}
                // A failing stable router quote still leaves the volatile
                // pools as a valid route.
                Err(e) => {
                    tracing::debug!(
                        target: "quote_v2",
                        venue = %self.venue.name,
                        error = %e,
                        "Stable route quote failed; trying volatile pools"
                    );
                }
            }
        }

        let mut amount = amount_in;
        for window in hops.windows(2) {
            match self.volatile_hop_out(window[0], window[1], amount).await? {
                Some(out) => amount = out,
                None => return Ok(None),
            }
        }
        Ok(Some((amount, false)))
    }
}

#[async_trait]
impl QuoteAdapter for V2QuoteAdapter {
    fn venue_name(&self) -> &str {
        &self.venue.name
    }

    async fn quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<QuotePath>, AppError> {
        let mut candidates: Vec<Vec<Address>> = vec![vec![token_in, token_out]];
        if token_in != self.bridge_token && token_out != self.bridge_token {
            candidates.push(vec![token_in, self.bridge_token, token_out]);
        }

        let mut best: Option<QuotePath> = None;
        for hops in candidates {
            // A chain-read failure on one hop sequence must not discard the
            // venue's other candidate.
            let quoted = match self.quote_hops(&hops, amount_in).await {
                Ok(quoted) => quoted,
                Err(e) => {
                    tracing::debug!(
                        target: "quote_v2",
                        venue = %self.venue.name,
                        error = %e,
                        "Hop sequence query failed; skipping candidate"
                    );
                    None
                }
            };
            let Some((amount_out, stable)) = quoted else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.amount_out >= amount_out) {
                continue;
            }
            let kind = if hops.len() == 2 {
                PathKind::Direct
            } else {
                PathKind::Bridged
            };
            best = Some(QuotePath {
                venue: self.venue.name.clone(),
                kind,
                hops: hops.clone(),
                fees: Vec::new(),
                amount_out,
                descriptor: RouteDescriptor::ConstantProduct {
                    tokens: hops,
                    stable,
                },
            });
        }
        Ok(best)
    }
}
