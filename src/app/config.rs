// SPDX-License-Identifier: MIT

use crate::domain::constants::{
    self, DEFAULT_GAS_LIMIT, DEFAULT_MAX_CONCURRENT_QUOTES, DEFAULT_QUOTE_TIMEOUT_MS,
    DEFAULT_SCAN_INTERVAL_MS, DEFAULT_SLIPPAGE_BPS, V2_FEE_DENOMINATOR, V2_FEE_NUMERATOR,
};
use crate::domain::error::AppError;
use crate::domain::token::TokenInfo;
use crate::domain::venue::{StablePoolPolicy, Venue, VenueKind};
use crate::infrastructure::network::gas::GasStrategy;
use crate::services::evaluator::TradeTuple;
use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Deserialize, Clone)]
pub struct TokenSettings {
    pub address: Address,
    pub decimals: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VenueSettings {
    pub name: String,
    /// "v2" (constant product) or "v3" (concentrated liquidity).
    pub kind: String,
    pub router: Address,
    pub factory: Option<Address>,
    pub quoter: Option<Address>,
    #[serde(default)]
    pub fee_tiers: Vec<u32>,
    #[serde(default = "default_fee_numerator")]
    pub fee_numerator: u64,
    #[serde(default = "default_fee_denominator")]
    pub fee_denominator: u64,
    #[serde(default)]
    pub supports_stable: bool,
    /// "never", "onchain", or "stable_list".
    #[serde(default = "default_stable_policy")]
    pub stable_policy: String,
    /// Token symbols considered stable; only read under "stable_list".
    #[serde(default)]
    pub stable_tokens: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    pub chain_id: u64,
    pub rpc_url: String,
    pub ws_url: Option<String>,
    /// Bridge token override; defaults to the chain's known wrapped native.
    pub wrapped_native: Option<Address>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
    #[serde(default = "default_quote_timeout_ms")]
    pub quote_timeout_ms: u64,
    #[serde(default = "default_max_concurrent_quotes")]
    pub max_concurrent_quotes: usize,

    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u64,
    #[serde(default = "default_gas_strategy")]
    pub gas_strategy: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    #[serde(default = "default_pair_cache_ttl_secs")]
    pub pair_cache_ttl_secs: u64,
    #[serde(default = "default_pair_cache_capacity")]
    pub pair_cache_capacity: usize,

    /// Venue used for the auxiliary native-to-loan-token price lookup.
    /// Unset means the whole whitelist is consulted.
    pub trusted_price_venue: Option<String>,

    pub tokens: HashMap<String, TokenSettings>,
    pub venues: Vec<VenueSettings>,
    /// (loan symbol, target symbol) pairs to scan.
    pub pairs: Vec<(String, String)>,
    /// Loan-amount ladder per loan symbol, as decimal strings.
    pub loan_amounts: HashMap<String, Vec<String>>,
    /// Minimum net profit per loan symbol, as a decimal string.
    #[serde(default)]
    pub min_profit: HashMap<String, String>,
}

fn default_fee_numerator() -> u64 {
    V2_FEE_NUMERATOR
}
fn default_fee_denominator() -> u64 {
    V2_FEE_DENOMINATOR
}
fn default_stable_policy() -> String {
    "onchain".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_true() -> bool {
    true
}
fn default_scan_interval_ms() -> u64 {
    DEFAULT_SCAN_INTERVAL_MS
}
fn default_quote_timeout_ms() -> u64 {
    DEFAULT_QUOTE_TIMEOUT_MS
}
fn default_max_concurrent_quotes() -> usize {
    DEFAULT_MAX_CONCURRENT_QUOTES
}
fn default_slippage_bps() -> u64 {
    DEFAULT_SLIPPAGE_BPS
}
fn default_gas_strategy() -> String {
    "normal".into()
}
fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}
fn default_pair_cache_ttl_secs() -> u64 {
    300
}
fn default_pair_cache_capacity() -> usize {
    4096
}

impl GlobalSettings {
    pub fn load(config_path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        builder = match config_path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };
        let mut settings: GlobalSettings = builder
            .add_source(Environment::with_prefix("ARBSCOUT").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Symbols are compared case-insensitively by uppercasing everything once
    /// at load time; the config backend lowercases file map keys, so table
    /// keys and pair references would otherwise never match.
    fn normalize(&mut self) {
        self.tokens = std::mem::take(&mut self.tokens)
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        self.loan_amounts = std::mem::take(&mut self.loan_amounts)
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        self.min_profit = std::mem::take(&mut self.min_profit)
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        for (loan, target) in &mut self.pairs {
            *loan = loan.to_uppercase();
            *target = target.to_uppercase();
        }
        for venue in &mut self.venues {
            for symbol in &mut venue.stable_tokens {
                *symbol = symbol.to_uppercase();
            }
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.venues.is_empty() {
            return Err(AppError::Validation {
                field: "venues".into(),
                message: "at least one venue is required".into(),
            });
        }
        for venue in &self.venues {
            match venue.kind.as_str() {
                "v2" => {
                    if venue.factory.is_none() {
                        return Err(AppError::Validation {
                            field: format!("venues.{}", venue.name),
                            message: "constant-product venues require a factory".into(),
                        });
                    }
                }
                "v3" => {
                    if venue.quoter.is_none() {
                        return Err(AppError::Validation {
                            field: format!("venues.{}", venue.name),
                            message: "concentrated-liquidity venues require a quoter".into(),
                        });
                    }
                }
                other => {
                    return Err(AppError::Validation {
                        field: format!("venues.{}", venue.name),
                        message: format!("unknown venue kind '{other}' (expected v2 or v3)"),
                    });
                }
            }
        }
        if let Some(name) = &self.trusted_price_venue {
            if !self.venues.iter().any(|v| &v.name == name) {
                return Err(AppError::Validation {
                    field: "trusted_price_venue".into(),
                    message: format!("venue '{name}' is not configured"),
                });
            }
        }
        for (loan, target) in &self.pairs {
            for symbol in [loan, target] {
                if !self.tokens.contains_key(symbol) {
                    return Err(AppError::Validation {
                        field: "pairs".into(),
                        message: format!("token '{symbol}' is not in the token table"),
                    });
                }
            }
            if !self.loan_amounts.contains_key(loan) {
                return Err(AppError::Validation {
                    field: "loan_amounts".into(),
                    message: format!("no loan-amount ladder for '{loan}'"),
                });
            }
        }
        GasStrategy::parse(&self.gas_strategy).ok_or_else(|| AppError::Validation {
            field: "gas_strategy".into(),
            message: format!("unknown strategy '{}'", self.gas_strategy),
        })?;
        Ok(())
    }

    pub fn gas_strategy(&self) -> GasStrategy {
        // Validated at load time.
        GasStrategy::parse(&self.gas_strategy).unwrap_or_default()
    }

    pub fn wrapped_native(&self) -> Result<Address, AppError> {
        self.wrapped_native
            .or_else(|| constants::wrapped_native_for_chain(self.chain_id))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "No wrapped_native configured and chain {} is unknown",
                    self.chain_id
                ))
            })
    }

    pub fn token_info(&self, symbol: &str) -> Result<TokenInfo, AppError> {
        let entry = self
            .tokens
            .get(symbol)
            .ok_or_else(|| AppError::UnknownToken(symbol.to_string()))?;
        Ok(TokenInfo {
            address: entry.address,
            symbol: symbol.to_string(),
            decimals: entry.decimals,
        })
    }

    /// Static registry seed: the config token table is authoritative.
    pub fn static_token_map(&self) -> HashMap<Address, TokenInfo> {
        self.tokens
            .iter()
            .map(|(symbol, entry)| {
                (
                    entry.address,
                    TokenInfo {
                        address: entry.address,
                        symbol: symbol.clone(),
                        decimals: entry.decimals,
                    },
                )
            })
            .collect()
    }

    pub fn build_venues(&self) -> Result<Vec<Venue>, AppError> {
        self.venues.iter().map(|v| self.build_venue(v)).collect()
    }

    fn build_venue(&self, settings: &VenueSettings) -> Result<Venue, AppError> {
        let kind = match settings.kind.as_str() {
            "v2" => VenueKind::ConstantProduct,
            "v3" => VenueKind::ConcentratedLiquidity,
            // Unreachable after validate(), but keep the error honest.
            other => {
                return Err(AppError::Config(format!(
                    "Venue {} has unknown kind '{other}'",
                    settings.name
                )))
            }
        };
        let stable_policy = match settings.stable_policy.as_str() {
            _ if !settings.supports_stable => StablePoolPolicy::Never,
            "never" => StablePoolPolicy::Never,
            "onchain" => StablePoolPolicy::OnChain,
            "stable_list" => {
                let mut set = HashSet::new();
                for symbol in &settings.stable_tokens {
                    set.insert(self.token_info(symbol)?.address);
                }
                StablePoolPolicy::StableList(set)
            }
            other => {
                return Err(AppError::Config(format!(
                    "Venue {} has unknown stable_policy '{other}'",
                    settings.name
                )))
            }
        };
        Ok(Venue {
            name: settings.name.clone(),
            kind,
            router: settings.router,
            factory: settings.factory,
            quoter: settings.quoter,
            fee_tiers: settings.fee_tiers.clone(),
            fee_numerator: settings.fee_numerator,
            fee_denominator: settings.fee_denominator,
            supports_stable: settings.supports_stable,
            stable_policy,
        })
    }

    /// Expands the configured pairs into one tuple per loan-amount rung.
    pub fn trade_tuples(&self) -> Result<Vec<TradeTuple>, AppError> {
        let mut tuples = Vec::new();
        for (loan_symbol, target_symbol) in &self.pairs {
            let loan = self.token_info(loan_symbol)?;
            let target = self.token_info(target_symbol)?;
            let min_profit = match self.min_profit.get(loan_symbol) {
                Some(raw) => parse_amount(raw, loan.decimals, "min_profit")?,
                None => U256::ZERO,
            };
            let ladder = self
                .loan_amounts
                .get(loan_symbol)
                .ok_or_else(|| AppError::Config(format!("No loan amounts for {loan_symbol}")))?;
            for raw in ladder {
                tuples.push(TradeTuple {
                    loan_token: loan.clone(),
                    target_token: target.clone(),
                    loan_amount: parse_amount(raw, loan.decimals, "loan_amounts")?,
                    min_profit,
                });
            }
        }
        Ok(tuples)
    }
}

fn parse_amount(raw: &str, decimals: u8, field: &str) -> Result<U256, AppError> {
    let parsed = parse_units(raw, decimals).map_err(|e| AppError::Validation {
        field: field.to_string(),
        message: format!("cannot parse '{raw}': {e}"),
    })?;
    Ok(parsed.get_absolute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> GlobalSettings {
        let toml = r#"
            chain_id = 8453
            rpc_url = "http://127.0.0.1:8545"
            pairs = [["USDC", "WETH"]]

            [tokens.WETH]
            address = "0x4200000000000000000000000000000000000006"
            decimals = 18
            [tokens.USDC]
            address = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"
            decimals = 6

            [[venues]]
            name = "baseswap"
            kind = "v2"
            router = "0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24"
            factory = "0x89C836e1E496839b20675B3fE398158c069D26db"

            [[venues]]
            name = "uniswap_v3"
            kind = "v3"
            router = "0x2626664c2603336E57B271c5C0b26F421741e481"
            quoter = "0x3d4e44Eb137109323E50aaE39f43290a84ad1532"
            fee_tiers = [100, 500, 3000, 10000]

            [loan_amounts]
            USDC = ["10", "250.5"]

            [min_profit]
            USDC = "0.25"
        "#;
        let mut settings: GlobalSettings = Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        settings.normalize();
        settings
    }

    #[test]
    fn tuples_scale_amounts_by_token_decimals() {
        let settings = base_settings();
        settings.validate().unwrap();
        let tuples = settings.trade_tuples().unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].loan_amount, U256::from(10_000_000u64));
        assert_eq!(tuples[1].loan_amount, U256::from(250_500_000u64));
        assert_eq!(tuples[0].min_profit, U256::from(250_000u64));
    }

    #[test]
    fn symbol_lookup_survives_lowercased_table_keys() {
        let mut settings = base_settings();
        // The file backend folds map keys to lowercase.
        settings.tokens = settings
            .tokens
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        settings.normalize();
        assert!(settings.token_info("WETH").is_ok());
        settings.validate().unwrap();
    }

    #[test]
    fn wrapped_native_falls_back_to_chain_table() {
        let settings = base_settings();
        assert_eq!(
            settings.wrapped_native().unwrap(),
            constants::WETH_BASE
        );
    }

    #[test]
    fn v2_venue_without_factory_is_rejected() {
        let mut settings = base_settings();
        settings.venues[0].factory = None;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn unknown_gas_strategy_is_rejected() {
        let mut settings = base_settings();
        settings.gas_strategy = "ludicrous".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn stable_list_policy_resolves_symbols() {
        let mut settings = base_settings();
        settings.venues[0].supports_stable = true;
        settings.venues[0].stable_policy = "stable_list".into();
        settings.venues[0].stable_tokens = vec!["USDC".into()];
        let venues = settings.build_venues().unwrap();
        match &venues[0].stable_policy {
            StablePoolPolicy::StableList(set) => {
                assert!(set.contains(&settings.tokens["USDC"].address));
            }
            other => panic!("expected StableList, got {other:?}"),
        }
    }
}
