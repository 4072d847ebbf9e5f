// SPDX-License-Identifier: MIT

//! Concentrated-liquidity (V3-style) quote adapter.
//!
//! A quoter revert means "no pool / no liquidity at that tier", so every
//! failed attempt is folded into "this tier yields nothing" and enumeration
//! continues. The adapter keeps the single best output across all direct
//! tiers and all (fee1, fee2) bridge combinations, not the best per category.

use crate::domain::constants::DEFAULT_V3_FEE_TIERS;
use crate::domain::error::AppError;
use crate::domain::path::{encode_packed_path, PathKind, QuotePath, RouteDescriptor};
use crate::domain::venue::Venue;
use crate::infrastructure::network::reads::DexReads;
use crate::services::quote::QuoteAdapter;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;

pub struct V3QuoteAdapter {
    reads: Arc<dyn DexReads>,
    venue: Venue,
    bridge_token: Address,
}

impl V3QuoteAdapter {
    pub fn new(
        reads: Arc<dyn DexReads>,
        venue: Venue,
        bridge_token: Address,
    ) -> Result<Self, AppError> {
        if venue.quoter.is_none() {
            return Err(AppError::Config(format!(
                "Venue {} has no quoter; cannot serve concentrated-liquidity quotes",
                venue.name
            )));
        }
        Ok(Self {
            reads,
            venue,
            bridge_token,
        })
    }

    fn quoter_address(&self) -> Address {
        // Checked in the constructor.
        self.venue.quoter.unwrap_or_default()
    }

    fn fee_tiers(&self) -> &[u32] {
        if self.venue.fee_tiers.is_empty() {
            &DEFAULT_V3_FEE_TIERS
        } else {
            &self.venue.fee_tiers
        }
    }

    async fn try_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Option<U256> {
        match self
            .reads
            .quote_single(self.quoter_address(), token_in, token_out, fee, amount_in)
            .await
        {
            Ok(out) => (!out.is_zero()).then_some(out),
            Err(e) => {
                tracing::trace!(
                    target: "quote_v3",
                    venue = %self.venue.name,
                    fee,
                    error = %e,
                    "Single-hop tier yielded no quote"
                );
                None
            }
        }
    }

    async fn try_bridged(&self, hops: &[Address; 3], fees: [u32; 2], amount_in: U256) -> Option<U256> {
        let path = encode_packed_path(hops, &fees)?;
        match self
            .reads
            .quote_path(self.quoter_address(), path, amount_in)
            .await
        {
            Ok(out) => (!out.is_zero()).then_some(out),
            Err(e) => {
                tracing::trace!(
                    target: "quote_v3",
                    venue = %self.venue.name,
                    fee1 = fees[0],
                    fee2 = fees[1],
                    error = %e,
                    "Bridged tier combination yielded no quote"
                );
                None
            }
        }
    }
}

#[async_trait]
impl QuoteAdapter for V3QuoteAdapter {
    fn venue_name(&self) -> &str {
        &self.venue.name
    }

    async fn quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<QuotePath>, AppError> {
        let mut best: Option<QuotePath> = None;

        for &fee in self.fee_tiers() {
            let Some(out) = self.try_single(token_in, token_out, fee, amount_in).await else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.amount_out >= out) {
                continue;
            }
            let hops = vec![token_in, token_out];
            let Some(path) = encode_packed_path(&hops, &[fee]) else {
                continue;
            };
            best = Some(QuotePath {
                venue: self.venue.name.clone(),
                kind: PathKind::Direct,
                hops,
                fees: vec![fee],
                amount_out: out,
                descriptor: RouteDescriptor::Concentrated { path },
            });
        }

        if token_in != self.bridge_token && token_out != self.bridge_token {
            let hops = [token_in, self.bridge_token, token_out];
            for &fee1 in self.fee_tiers() {
                for &fee2 in self.fee_tiers() {
                    let Some(out) = self.try_bridged(&hops, [fee1, fee2], amount_in).await else {
                        continue;
                    };
                    if best.as_ref().is_some_and(|b| b.amount_out >= out) {
                        continue;
                    }
                    let Some(path) = encode_packed_path(&hops, &[fee1, fee2]) else {
                        continue;
                    };
                    best = Some(QuotePath {
                        venue: self.venue.name.clone(),
                        kind: PathKind::Bridged,
                        hops: hops.to_vec(),
                        fees: vec![fee1, fee2],
                        amount_out: out,
                        descriptor: RouteDescriptor::Concentrated { path },
                    });
                }
            }
        }

        Ok(best)
    }
}
