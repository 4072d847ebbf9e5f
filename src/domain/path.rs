// SPDX-License-Identifier: MIT

use crate::domain::constants::BPS_DENOMINATOR;
use alloy::primitives::{Address, Bytes, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Direct,
    /// Routed through an intermediate bridge token (usually wrapped native).
    Bridged,
}

/// Venue-specific routing payload handed to the settlement contract.
///
/// The encoding here is a wire contract: the on-chain swap-step struct
/// consumes it verbatim, so shapes must not drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDescriptor {
    /// Ordered token hop list plus the stable/volatile pool selector.
    ConstantProduct { tokens: Vec<Address>, stable: bool },
    /// Densely packed (token, fee, token[, fee, token]) byte sequence.
    Concentrated { path: Bytes },
}

/// The best execution found for one (tokenIn, tokenOut, amountIn) query
/// against one venue. Constructed once, compared, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePath {
    pub venue: String,
    pub kind: PathKind,
    /// Token hop sequence: 2 entries for direct, 3 for bridged.
    pub hops: Vec<Address>,
    /// Winning fee tier per hop; empty for constant-product venues.
    pub fees: Vec<u32>,
    /// Expected output in tokenOut's smallest unit. Always positive; a
    /// zero-output quote means "no path" and is never materialized.
    pub amount_out: U256,
    pub descriptor: RouteDescriptor,
}

impl QuotePath {
    /// Slippage-floored output embedded into execution parameters.
    /// Integer bps math: `out * (10000 - bps) / 10000`.
    pub fn amount_out_min(&self, slippage_bps: u64) -> U256 {
        apply_slippage(self.amount_out, slippage_bps)
    }
}

pub fn apply_slippage(amount: U256, slippage_bps: u64) -> U256 {
    let bps = slippage_bps.min(BPS_DENOMINATOR);
    amount.saturating_mul(U256::from(BPS_DENOMINATOR - bps)) / U256::from(BPS_DENOMINATOR)
}

/// Packs `tokens` interleaved with `fees` into the concentrated-liquidity
/// path format: 20-byte address, 3-byte big-endian fee, repeating.
/// Requires `fees.len() == tokens.len() - 1`.
pub fn encode_packed_path(tokens: &[Address], fees: &[u32]) -> Option<Bytes> {
    if tokens.len() < 2 || fees.len() != tokens.len() - 1 {
        return None;
    }
    let mut out = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    for (i, token) in tokens.iter().enumerate() {
        out.extend_from_slice(token.as_slice());
        if let Some(fee) = fees.get(i) {
            out.extend_from_slice(&fee.to_be_bytes()[1..]);
        }
    }
    Some(out.into())
}

/// Inverse of [`encode_packed_path`]; used to validate payloads before they
/// reach the settlement layer.
pub fn decode_packed_path(path: &[u8]) -> Option<(Vec<Address>, Vec<u32>)> {
    if path.len() < 43 || (path.len() - 20) % 23 != 0 {
        return None;
    }
    let mut tokens = vec![Address::from_slice(&path[..20])];
    let mut fees = Vec::new();
    let mut offset = 20;
    while offset < path.len() {
        let fee = u32::from_be_bytes([0, path[offset], path[offset + 1], path[offset + 2]]);
        fees.push(fee);
        offset += 3;
        tokens.push(Address::from_slice(&path[offset..offset + 20]));
        offset += 20;
    }
    Some((tokens, fees))
}
