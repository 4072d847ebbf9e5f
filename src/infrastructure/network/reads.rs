// SPDX-License-Identifier: MIT

//! Read-only DEX chain access behind a seam, so route selection logic can be
//! exercised against scripted chains. The production implementation is
//! [`RpcReads`]; a quoter revert surfaces as an error here and is folded to
//! "no result" by the callers.

use crate::domain::error::AppError;
use crate::infrastructure::network::contracts::{
    SolidlyFactory, SolidlyRouter, UniV2Factory, UniV2Pair, UniV3Quoter,
};
use crate::infrastructure::network::provider::HttpProvider;
use alloy::primitives::{aliases::U24, Address, Bytes, U160, U256};
use async_trait::async_trait;

#[async_trait]
pub trait DexReads: Send + Sync {
    /// V2 factory pair lookup; the zero address means no pool.
    async fn pair_address(&self, factory: Address, a: Address, b: Address)
        -> Result<Address, AppError>;

    /// Solidly-style factory lookup keyed by the stable flag; the zero
    /// address means no pool in that variant.
    async fn stable_pool_address(
        &self,
        factory: Address,
        a: Address,
        b: Address,
        stable: bool,
    ) -> Result<Address, AppError>;

    /// Raw `(reserve0, reserve1)` of a V2 pair, in stored token order.
    async fn pair_reserves(&self, pool: Address) -> Result<(U256, U256), AppError>;

    /// Stable-curve amounts along `hops`, priced by the venue router.
    async fn stable_amounts_out(
        &self,
        router: Address,
        factory: Address,
        hops: &[Address],
        amount_in: U256,
    ) -> Result<Vec<U256>, AppError>;

    /// Single-hop concentrated-liquidity quote at one fee tier.
    async fn quote_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, AppError>;

    /// Multi-hop concentrated-liquidity quote over a packed path.
    async fn quote_path(
        &self,
        quoter: Address,
        path: Bytes,
        amount_in: U256,
    ) -> Result<U256, AppError>;
}

#[derive(Clone)]
pub struct RpcReads {
    provider: HttpProvider,
}

impl RpcReads {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }
}

fn read_err(call: &str, e: impl std::fmt::Display) -> AppError {
    AppError::ChainRead(format!("{call}: {e}"))
}

#[async_trait]
impl DexReads for RpcReads {
    async fn pair_address(
        &self,
        factory: Address,
        a: Address,
        b: Address,
    ) -> Result<Address, AppError> {
        UniV2Factory::new(factory, self.provider.clone())
            .getPair(a, b)
            .call()
            .await
            .map_err(|e| read_err("getPair", e))
    }

    async fn stable_pool_address(
        &self,
        factory: Address,
        a: Address,
        b: Address,
        stable: bool,
    ) -> Result<Address, AppError> {
        SolidlyFactory::new(factory, self.provider.clone())
            .getPool(a, b, stable)
            .call()
            .await
            .map_err(|e| read_err("getPool", e))
    }

    async fn pair_reserves(&self, pool: Address) -> Result<(U256, U256), AppError> {
        let reserves = UniV2Pair::new(pool, self.provider.clone())
            .getReserves()
            .call()
            .await
            .map_err(|e| read_err("getReserves", e))?;
        Ok((reserves.reserve0, reserves.reserve1))
    }

    async fn stable_amounts_out(
        &self,
        router: Address,
        factory: Address,
        hops: &[Address],
        amount_in: U256,
    ) -> Result<Vec<U256>, AppError> {
        let routes: Vec<SolidlyRouter::Route> = hops
            .windows(2)
            .map(|w| SolidlyRouter::Route {
                from: w[0],
                to: w[1],
                stable: true,
                factory,
            })
            .collect();
        SolidlyRouter::new(router, self.provider.clone())
            .getAmountsOut(amount_in, routes)
            .call()
            .await
            .map_err(|e| read_err("getAmountsOut", e))
    }

    async fn quote_single(
        &self,
        quoter: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
    ) -> Result<U256, AppError> {
        UniV3Quoter::new(quoter, self.provider.clone())
            .quoteExactInputSingle(token_in, token_out, U24::from(fee), amount_in, U160::ZERO)
            .call()
            .await
            .map_err(|e| read_err("quoteExactInputSingle", e))
    }

    async fn quote_path(
        &self,
        quoter: Address,
        path: Bytes,
        amount_in: U256,
    ) -> Result<U256, AppError> {
        UniV3Quoter::new(quoter, self.provider.clone())
            .quoteExactInput(path, amount_in)
            .call()
            .await
            .map_err(|e| read_err("quoteExactInput", e))
    }
}
