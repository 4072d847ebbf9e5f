// SPDX-License-Identifier: MIT

//! Round-trip profitability judgment.
//!
//! The pipeline is linear: leg 1, leg 2, slippage floors, gross profit, gas
//! pricing, gas conversion into the loan token, threshold check. Every
//! evaluation emits a fully populated [`ArbitrageOpportunity`] so the caller
//! can log the decision whether or not it clears.

use crate::domain::error::AppError;
use crate::domain::opportunity::{ArbitrageOpportunity, OpportunityStatus};
use crate::domain::token::TokenInfo;
use crate::infrastructure::network::gas::{GasPriceSource, GasStrategy};
use crate::services::quote::PathFinder;
use alloy::primitives::{Address, I256, U256};
use std::sync::Arc;

const ONE_NATIVE_WEI: u64 = 1_000_000_000_000_000_000;

/// One configured scan target: borrow `loan_amount` of `loan_token`, swap to
/// `target_token` and back, demand strictly more than `min_profit` after gas.
#[derive(Debug, Clone)]
pub struct TradeTuple {
    pub loan_token: TokenInfo,
    pub target_token: TokenInfo,
    pub loan_amount: U256,
    /// Minimum net profit in loan-token smallest units. Exactly reaching it
    /// is not enough; the comparison is strict.
    pub min_profit: U256,
}

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub slippage_bps: u64,
    pub gas_limit: u64,
    pub gas_strategy: GasStrategy,
    /// Wrapped native currency; loan tokens equal to it skip conversion.
    pub wrapped_native: Address,
}

pub struct ProfitabilityEvaluator {
    paths: Arc<dyn PathFinder>,
    /// Auxiliary native-to-loan-token pricing, routed over a trusted
    /// high-liquidity venue set distinct from the scan whitelist.
    price_paths: Arc<dyn PathFinder>,
    gas: Arc<dyn GasPriceSource>,
    config: EvaluatorConfig,
}

impl ProfitabilityEvaluator {
    pub fn new(
        paths: Arc<dyn PathFinder>,
        price_paths: Arc<dyn PathFinder>,
        gas: Arc<dyn GasPriceSource>,
        config: EvaluatorConfig,
    ) -> Self {
        Self {
            paths,
            price_paths,
            gas,
            config,
        }
    }

    pub async fn evaluate(&self, tuple: &TradeTuple) -> Result<ArbitrageOpportunity, AppError> {
        let loan = &tuple.loan_token;
        let target = &tuple.target_token;

        let Some(leg1) = self
            .paths
            .find_best_path(loan.address, target.address, tuple.loan_amount)
            .await?
        else {
            return Ok(ArbitrageOpportunity::no_path(
                loan.clone(),
                target.clone(),
                tuple.loan_amount,
            ));
        };

        let Some(leg2) = self
            .paths
            .find_best_path(target.address, loan.address, leg1.amount_out)
            .await?
        else {
            let mut opp =
                ArbitrageOpportunity::no_path(loan.clone(), target.clone(), tuple.loan_amount);
            opp.leg1_amount_out_min = leg1.amount_out_min(self.config.slippage_bps);
            opp.leg1 = Some(leg1);
            return Ok(opp);
        };

        let leg1_min = leg1.amount_out_min(self.config.slippage_bps);
        let leg2_min = leg2.amount_out_min(self.config.slippage_bps);

        let gross_profit = signed(leg2.amount_out) - signed(tuple.loan_amount);
        if gross_profit <= I256::ZERO {
            // A loop that does not even gross a profit is dead before any
            // gas work; skip the fee-data round trips entirely.
            return Ok(ArbitrageOpportunity {
                loan_token: loan.clone(),
                target_token: target.clone(),
                loan_amount: tuple.loan_amount,
                leg1: Some(leg1),
                leg2: Some(leg2),
                leg1_amount_out_min: leg1_min,
                leg2_amount_out_min: leg2_min,
                gross_profit,
                gas_cost_in_loan_token: U256::ZERO,
                net_profit: gross_profit,
                status: OpportunityStatus::ProfitTooLow,
            });
        }

        let gas_price = self.gas.gas_price(self.config.gas_strategy).await?;
        let gas_cost_native =
            U256::from(gas_price).saturating_mul(U256::from(self.config.gas_limit));
        let gas_cost = self
            .gas_cost_in_loan_token(loan, tuple.loan_amount, gas_cost_native)
            .await;

        let net_profit = gross_profit - signed(gas_cost);
        let status = if net_profit > signed(tuple.min_profit) {
            OpportunityStatus::Profitable
        } else {
            OpportunityStatus::ProfitTooLow
        };

        Ok(ArbitrageOpportunity {
            loan_token: loan.clone(),
            target_token: target.clone(),
            loan_amount: tuple.loan_amount,
            leg1: Some(leg1),
            leg2: Some(leg2),
            leg1_amount_out_min: leg1_min,
            leg2_amount_out_min: leg2_min,
            gross_profit,
            gas_cost_in_loan_token: gas_cost,
            net_profit,
            status,
        })
    }

    /// Converts a native-currency gas cost into loan-token units.
    ///
    /// When the auxiliary price lookup fails the full loan principal stands
    /// in as the cost: fail-safe toward "not profitable", never toward
    /// treating gas as free.
    async fn gas_cost_in_loan_token(
        &self,
        loan: &TokenInfo,
        loan_amount: U256,
        gas_cost_native: U256,
    ) -> U256 {
        if loan.address == self.config.wrapped_native {
            return gas_cost_native;
        }

        let one_native = U256::from(ONE_NATIVE_WEI);
        match self
            .price_paths
            .find_best_path(self.config.wrapped_native, loan.address, one_native)
            .await
        {
            Ok(Some(price_path)) => gas_cost_native
                .saturating_mul(price_path.amount_out)
                .checked_div(one_native)
                .unwrap_or(loan_amount),
            Ok(None) => {
                tracing::warn!(
                    target: "evaluator",
                    loan_token = %loan.symbol,
                    "No native price path; substituting conservative gas cost"
                );
                loan_amount
            }
            Err(e) => {
                tracing::warn!(
                    target: "evaluator",
                    loan_token = %loan.symbol,
                    error = %e,
                    "Native price lookup failed; substituting conservative gas cost"
                );
                loan_amount
            }
        }
    }
}

fn signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}
