// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use crate::domain::path::QuotePath;
use crate::services::quote::{PathFinder, QuoteAdapter};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

/// Fans one quote request out across every whitelisted venue and keeps the
/// single best result.
///
/// Settle-all semantics: a venue that errors or times out contributes
/// nothing and never cancels the others. Outstanding chain reads are bounded
/// by a semaphore so a long venue list cannot stampede the RPC endpoint.
pub struct VenueAggregator {
    adapters: Vec<Arc<dyn QuoteAdapter>>,
    permits: Arc<Semaphore>,
    quote_timeout: Duration,
}

impl VenueAggregator {
    pub fn new(
        adapters: Vec<Arc<dyn QuoteAdapter>>,
        max_concurrent: usize,
        quote_timeout: Duration,
    ) -> Self {
        Self {
            adapters,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            quote_timeout,
        }
    }

    pub fn venue_count(&self) -> usize {
        self.adapters.len()
    }
}

#[async_trait]
impl PathFinder for VenueAggregator {
    async fn find_best_path(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<QuotePath>, AppError> {
        let queries = self.adapters.iter().map(|adapter| {
            let adapter = adapter.clone();
            let permits = self.permits.clone();
            let deadline = self.quote_timeout;
            async move {
                // Closed semaphore cannot happen; treat it like a timeout.
                let Ok(_permit) = permits.acquire().await else {
                    return (adapter.venue_name().to_string(), None);
                };
                let result = timeout(deadline, adapter.quote(token_in, token_out, amount_in)).await;
                let name = adapter.venue_name().to_string();
                match result {
                    Ok(Ok(path)) => (name, path),
                    Ok(Err(e)) => {
                        tracing::debug!(
                            target: "aggregator",
                            venue = %name,
                            error = %e,
                            "Venue query failed; excluding from this round"
                        );
                        (name, None)
                    }
                    Err(_) => {
                        tracing::debug!(
                            target: "aggregator",
                            venue = %name,
                            timeout_ms = deadline.as_millis() as u64,
                            "Venue query timed out; excluding from this round"
                        );
                        (name, None)
                    }
                }
            }
        });

        let mut best: Option<QuotePath> = None;
        for (_venue, path) in join_all(queries).await {
            let Some(path) = path else { continue };
            if path.amount_out.is_zero() {
                continue;
            }
            // Strictly-greater keeps the first-seen winner on ties.
            if best.as_ref().is_none_or(|b| path.amount_out > b.amount_out) {
                best = Some(path);
            }
        }
        Ok(best)
    }
}
