// SPDX-License-Identifier: MIT

use crate::domain::error::AppError;
use crate::domain::opportunity::{ArbitrageOpportunity, OpportunityStatus};
use crate::infrastructure::network::provider::WsProvider;
use crate::services::evaluator::{ProfitabilityEvaluator, TradeTuple};
use alloy::primitives::utils::format_units;
use alloy::providers::Provider;
use futures::future::join_all;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Drives evaluation cycles from block arrivals (when a WS endpoint is
/// available) or a fixed timer, and hands profitable opportunities off to
/// the execution layer.
pub struct Engine {
    evaluator: Arc<ProfitabilityEvaluator>,
    tuples: Vec<TradeTuple>,
    ws_provider: Option<WsProvider>,
    scan_interval: Duration,
    dry_run: bool,
    handoff: Option<mpsc::UnboundedSender<ArbitrageOpportunity>>,
    shutdown: CancellationToken,
}

impl Engine {
    pub fn new(
        evaluator: Arc<ProfitabilityEvaluator>,
        tuples: Vec<TradeTuple>,
        ws_provider: Option<WsProvider>,
        scan_interval: Duration,
        dry_run: bool,
        handoff: Option<mpsc::UnboundedSender<ArbitrageOpportunity>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            evaluator,
            tuples,
            ws_provider,
            scan_interval,
            dry_run,
            handoff,
            shutdown,
        }
    }

    pub async fn run(self) -> Result<(), AppError> {
        if self.tuples.is_empty() {
            return Err(AppError::Config(
                "No trade tuples configured; nothing to scan".into(),
            ));
        }
        tracing::info!(
            target: "engine",
            tuples = self.tuples.len(),
            dry_run = self.dry_run,
            "Scan engine starting"
        );

        match self.ws_provider.clone() {
            Some(ws) => self.run_on_blocks(ws).await,
            None => self.run_on_interval().await,
        }
    }

    async fn run_on_blocks(self, ws: WsProvider) -> Result<(), AppError> {
        // Cycles must never pile up: a trigger that lands while a scan is
        // still in flight is skipped, not queued.
        let busy = Arc::new(Mutex::new(()));
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(());
            }
            let sub = match ws.subscribe_blocks().await {
                Ok(sub) => sub,
                Err(e) => {
                    tracing::warn!(target: "engine", error=%e, "Block subscribe failed, retrying");
                    sleep(Duration::from_secs(2)).await;
                    continue;
                }
            };
            let mut stream = sub.into_stream();
            tracing::info!(target: "engine", "Subscribed to new heads");

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => return Ok(()),
                    maybe_header = stream.next() => {
                        let Some(header) = maybe_header else { break };
                        self.trigger_cycle(&busy, Some(header.inner.number)).await;
                    }
                }
            }
            tracing::warn!(target: "engine", "Head subscription ended, resubscribing");
            sleep(Duration::from_secs(2)).await;
        }
    }

    async fn run_on_interval(self) -> Result<(), AppError> {
        let busy = Arc::new(Mutex::new(()));
        let mut ticker = tokio::time::interval(self.scan_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    self.trigger_cycle(&busy, None).await;
                }
            }
        }
    }

    async fn trigger_cycle(&self, busy: &Arc<Mutex<()>>, block: Option<u64>) {
        let Ok(guard) = busy.clone().try_lock_owned() else {
            tracing::debug!(target: "engine", ?block, "Previous cycle still running; skipping trigger");
            return;
        };
        let evaluator = self.evaluator.clone();
        let tuples = self.tuples.clone();
        let dry_run = self.dry_run;
        let handoff = self.handoff.clone();
        tokio::spawn(async move {
            let _guard = guard;
            run_cycle(evaluator, &tuples, dry_run, handoff.as_ref(), block).await;
        });
    }
}

async fn run_cycle(
    evaluator: Arc<ProfitabilityEvaluator>,
    tuples: &[TradeTuple],
    dry_run: bool,
    handoff: Option<&mpsc::UnboundedSender<ArbitrageOpportunity>>,
    block: Option<u64>,
) {
    tracing::debug!(target: "engine", ?block, tuples = tuples.len(), "Scan cycle started");

    let evaluations = tuples.iter().map(|tuple| {
        let evaluator = evaluator.clone();
        async move { (tuple, evaluator.evaluate(tuple).await) }
    });

    let mut profitable = 0usize;
    for (tuple, result) in join_all(evaluations).await {
        match result {
            Ok(opportunity) => {
                report_opportunity(&opportunity);
                if opportunity.is_profitable() {
                    profitable += 1;
                    if dry_run {
                        tracing::info!(
                            target: "engine",
                            pair = %format!("{}/{}", opportunity.loan_token.symbol, opportunity.target_token.symbol),
                            "DRY RUN: skipping execution hand-off"
                        );
                    } else if let Some(sender) = handoff {
                        if sender.send(opportunity).is_err() {
                            tracing::warn!(target: "engine", "Execution channel closed; dropping opportunity");
                        }
                    }
                }
            }
            Err(e) => {
                // One bad tuple never aborts the cycle.
                tracing::warn!(
                    target: "engine",
                    pair = %format!("{}/{}", tuple.loan_token.symbol, tuple.target_token.symbol),
                    error = %e,
                    "Tuple evaluation failed"
                );
            }
        }
    }
    tracing::debug!(target: "engine", ?block, profitable, "Scan cycle finished");
}

fn report_opportunity(opportunity: &ArbitrageOpportunity) {
    let decimals = opportunity.loan_token.decimals;
    let net = format_units(opportunity.net_profit, decimals)
        .unwrap_or_else(|_| opportunity.net_profit.to_string());
    match opportunity.status {
        OpportunityStatus::Profitable => {
            let route = route_summary(opportunity);
            tracing::info!(
                target: "engine",
                pair = %format!("{}/{}", opportunity.loan_token.symbol, opportunity.target_token.symbol),
                route = %route,
                net_profit = %net,
                "Profitable opportunity"
            );
        }
        OpportunityStatus::ProfitTooLow => {
            tracing::debug!(
                target: "engine",
                pair = %format!("{}/{}", opportunity.loan_token.symbol, opportunity.target_token.symbol),
                net_profit = %net,
                "Opportunity below threshold"
            );
        }
        OpportunityStatus::NoPath => {
            tracing::trace!(
                target: "engine",
                pair = %format!("{}/{}", opportunity.loan_token.symbol, opportunity.target_token.symbol),
                "No path"
            );
        }
    }
}

fn route_summary(opportunity: &ArbitrageOpportunity) -> String {
    match (&opportunity.leg1, &opportunity.leg2) {
        (Some(a), Some(b)) => format!("{} -> {}", a.venue, b.venue),
        _ => "incomplete".into(),
    }
}
