// SPDX-License-Identifier: MIT

use alloy::primitives::{address, Address};

// Wrapped native currency per supported chain.
pub const WETH_MAINNET: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
pub const WETH_OPTIMISM: Address = address!("4200000000000000000000000000000000000006");
pub const WETH_ARBITRUM: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_OPTIMISM: u64 = 10;
pub const CHAIN_BASE: u64 = 8453;
pub const CHAIN_ARBITRUM: u64 = 42161;

pub fn wrapped_native_for_chain(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_ETHEREUM => Some(WETH_MAINNET),
        CHAIN_OPTIMISM => Some(WETH_OPTIMISM),
        CHAIN_BASE => Some(WETH_BASE),
        CHAIN_ARBITRUM => Some(WETH_ARBITRUM),
        _ => None,
    }
}

/// Uniswap-style V2 swap fee: 0.3% expressed as 997/1000.
pub const V2_FEE_NUMERATOR: u64 = 997;
pub const V2_FEE_DENOMINATOR: u64 = 1000;

/// Fee tiers probed when a V3 venue does not configure its own set.
pub const DEFAULT_V3_FEE_TIERS: [u32; 4] = [100, 500, 3000, 10_000];

/// Basis points denominator used for slippage and multiplier math.
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const DEFAULT_SLIPPAGE_BPS: u64 = 50;
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_QUOTE_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_MAX_CONCURRENT_QUOTES: usize = 16;
