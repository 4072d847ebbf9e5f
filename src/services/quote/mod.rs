// SPDX-License-Identifier: MIT

pub mod aggregator;
pub mod v2;
pub mod v3;

use crate::domain::error::AppError;
use crate::domain::path::QuotePath;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One venue's quoting capability. Implementations are read-only against
/// chain state; a request that finds no pool resolves to `Ok(None)`.
#[async_trait]
pub trait QuoteAdapter: Send + Sync {
    fn venue_name(&self) -> &str;

    async fn quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<QuotePath>, AppError>;
}

/// Best-path search across a set of venues. The production implementation is
/// [`aggregator::VenueAggregator`]; tests substitute fakes.
#[async_trait]
pub trait PathFinder: Send + Sync {
    async fn find_best_path(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<Option<QuotePath>, AppError>;
}

type PairKey = (Address, Address, Address, bool);

/// Caller-owned cache of discovered pool addresses, keyed by
/// (factory, tokenA, tokenB, stable). "No pool exists" is cached too, so a
/// missing pair does not cost a factory call on every scan.
///
/// Reserves are never cached here; only discovery results, which change
/// rarely, get a TTL. Insertion order provides the capacity bound.
pub struct PairCache {
    ttl: Duration,
    capacity: usize,
    entries: DashMap<PairKey, (Option<Address>, Instant)>,
    order: Mutex<VecDeque<PairKey>>,
}

impl PairCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get(&self, key: &PairKey) -> Option<Option<Address>> {
        let entry = self.entries.get(key)?;
        let (pool, inserted) = *entry;
        if inserted.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(key);
            // The insertion-order queue must drop the key too, or a
            // re-insert would be double-counted against capacity and the
            // fresh entry evicted early.
            if let Ok(mut order) = self.order.lock() {
                if let Some(pos) = order.iter().position(|k| k == key) {
                    order.remove(pos);
                }
            }
            return None;
        }
        Some(pool)
    }

    pub fn insert(&self, key: PairKey, pool: Option<Address>) {
        if self.entries.insert(key, (pool, Instant::now())).is_some() {
            return;
        }
        let Ok(mut order) = self.order.lock() else {
            return;
        };
        order.push_back(key);
        if order.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
