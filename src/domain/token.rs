// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use crate::infrastructure::network::contracts::Erc20;
use crate::infrastructure::network::provider::HttpProvider;
use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::HashMap;

/// Minimal token metadata used for decimal-aware amount math and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Token metadata resolver.
///
/// Entries from the config token table are authoritative; anything else is
/// resolved lazily via ERC-20 `symbol()`/`decimals()` and memoized. A token
/// whose decimals cannot be resolved is a hard error: amount arithmetic
/// without the right scale silently corrupts every downstream comparison.
#[derive(Clone)]
pub struct TokenRegistry {
    provider: HttpProvider,
    static_entries: HashMap<Address, TokenInfo>,
    resolved: DashMap<Address, TokenInfo>,
}

impl TokenRegistry {
    pub fn new(provider: HttpProvider, static_entries: HashMap<Address, TokenInfo>) -> Self {
        Self {
            provider,
            static_entries,
            resolved: DashMap::new(),
        }
    }

    pub fn lookup_static(&self, address: Address) -> Option<&TokenInfo> {
        self.static_entries.get(&address)
    }

    pub async fn resolve(&self, address: Address) -> Result<TokenInfo, AppError> {
        if let Some(info) = self.static_entries.get(&address) {
            return Ok(info.clone());
        }
        if let Some(info) = self.resolved.get(&address) {
            return Ok(info.clone());
        }

        let contract = Erc20::new(address, self.provider.clone());
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|_| AppError::UnknownToken(format!("{address:#x}")))?;
        let symbol = contract
            .symbol()
            .call()
            .await
            .unwrap_or_else(|_| format!("{address:#x}"));

        let info = TokenInfo {
            address,
            symbol,
            decimals,
        };
        self.resolved.insert(address, info.clone());
        Ok(info)
    }
}
