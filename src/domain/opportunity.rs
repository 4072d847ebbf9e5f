// SPDX-License-Identifier: MIT

use crate::domain::path::QuotePath;
use crate::domain::token::TokenInfo;
use alloy::primitives::{I256, U256};

/// Terminal classification of one evaluated round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpportunityStatus {
    /// Net profit strictly above the configured minimum.
    Profitable,
    /// A closed loop exists but does not clear costs plus threshold.
    ProfitTooLow,
    /// At least one leg found no usable path on any venue.
    NoPath,
}

/// One fully evaluated (loanToken, targetToken, loanAmount) round trip.
///
/// Emitted for every evaluation regardless of outcome so callers can log the
/// decision; never persisted here.
#[derive(Debug, Clone)]
pub struct ArbitrageOpportunity {
    pub loan_token: TokenInfo,
    pub target_token: TokenInfo,
    pub loan_amount: U256,
    pub leg1: Option<QuotePath>,
    pub leg2: Option<QuotePath>,
    /// Slippage-floored minimum outputs, one per resolved leg. These are
    /// execution parameters; profit math uses the raw quoted outputs.
    pub leg1_amount_out_min: U256,
    pub leg2_amount_out_min: U256,
    /// `leg2.amount_out - loan_amount`; negative when the loop loses money.
    pub gross_profit: I256,
    /// Estimated gas cost converted into loan-token units.
    pub gas_cost_in_loan_token: U256,
    pub net_profit: I256,
    pub status: OpportunityStatus,
}

impl ArbitrageOpportunity {
    pub fn is_profitable(&self) -> bool {
        self.status == OpportunityStatus::Profitable
    }

    pub fn no_path(loan_token: TokenInfo, target_token: TokenInfo, loan_amount: U256) -> Self {
        Self {
            loan_token,
            target_token,
            loan_amount,
            leg1: None,
            leg2: None,
            leg1_amount_out_min: U256::ZERO,
            leg2_amount_out_min: U256::ZERO,
            gross_profit: I256::ZERO,
            gas_cost_in_loan_token: U256::ZERO,
            net_profit: I256::ZERO,
            status: OpportunityStatus::NoPath,
        }
    }
}
