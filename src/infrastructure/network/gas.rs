// SPDX-License-Identifier: MIT

use crate::common::retry::retry_async;
use crate::domain::constants::BPS_DENOMINATOR;
use crate::domain::error::AppError;
use crate::infrastructure::network::provider::HttpProvider;
use alloy::providers::Provider;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Named urgency levels, each a fixed premium over the node's gas price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasStrategy {
    Slow,
    #[default]
    Normal,
    Fast,
    Urgent,
}

impl GasStrategy {
    /// Multiplier in bps: slow 1.1x, normal 1.2x, fast 1.3x, urgent 1.5x.
    pub fn multiplier_bps(self) -> u64 {
        match self {
            GasStrategy::Slow => 11_000,
            GasStrategy::Normal => 12_000,
            GasStrategy::Fast => 13_000,
            GasStrategy::Urgent => 15_000,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "slow" => Some(GasStrategy::Slow),
            "normal" | "medium" | "" => Some(GasStrategy::Normal),
            "fast" => Some(GasStrategy::Fast),
            "urgent" | "aggressive" => Some(GasStrategy::Urgent),
            _ => None,
        }
    }
}

/// Seam for the evaluator; the scan path uses [`GasOracle`], tests use fakes.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn gas_price(&self, strategy: GasStrategy) -> Result<u128, AppError>;
}

#[derive(Clone)]
pub struct GasOracle {
    provider: HttpProvider,
    last_good: Arc<Mutex<Option<u128>>>,
}

impl GasOracle {
    pub fn new(provider: HttpProvider) -> Self {
        Self {
            provider,
            last_good: Arc::new(Mutex::new(None)),
        }
    }

    async fn fetch_base_price(&self) -> Result<u128, AppError> {
        let provider = self.provider.clone();
        let price = retry_async(
            move |_| {
                let provider = provider.clone();
                async move { provider.get_gas_price().await }
            },
            3,
            Duration::from_millis(100),
        )
        .await
        .map_err(|e| AppError::Connection(format!("Gas price fetch failed: {}", e)))?;

        if let Ok(mut guard) = self.last_good.lock() {
            *guard = Some(price);
        }
        Ok(price)
    }
}

/// Scaled-integer multiply with round-to-nearest so the premium survives on
/// chains where the base price is only a handful of wei.
pub fn apply_strategy(base_price: u128, strategy: GasStrategy) -> u128 {
    let bps = strategy.multiplier_bps() as u128;
    let den = BPS_DENOMINATOR as u128;
    base_price
        .saturating_mul(bps)
        .saturating_add(den / 2)
        / den
}

#[async_trait]
impl GasPriceSource for GasOracle {
    async fn gas_price(&self, strategy: GasStrategy) -> Result<u128, AppError> {
        let base = match self.fetch_base_price().await {
            Ok(p) => p,
            Err(e) => {
                // Fall back to the last observed price rather than stalling
                // the whole cycle on a flaky node.
                let cached = self.last_good.lock().ok().and_then(|g| *g);
                match cached {
                    Some(p) => {
                        tracing::warn!(target: "gas", error=%e, "Using last known gas price");
                        p
                    }
                    None => return Err(e),
                }
            }
        };
        Ok(apply_strategy(base, strategy))
    }
}
