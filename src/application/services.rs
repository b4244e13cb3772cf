//! Application services - scenario execution over the exchange engine

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, StepCfg};
use crate::domain::exchange::{ExchangeEngine, MemorySink};
use crate::domain::gateway::HostGateway;
use crate::domain::math;
use crate::infrastructure::{InMemoryLedger, ManualHost};
use crate::report::{PoolSnapshot, ScenarioReport, StepReport};
use crate::shared::errors::AppError;
use crate::shared::types::{AccountId, Token};
use crate::shared::utils::format_amount;

/// Default deadline headroom for steps that do not script their own.
const DEFAULT_DEADLINE_OFFSET: i64 = 300;

/// Replays a scripted scenario against a fresh in-memory ledger and a
/// scripted clock, collecting a full run report.
pub struct ScenarioService {
    cfg: Config,
    engine: ExchangeEngine,
    host: Arc<ManualHost>,
    sink: Arc<MemorySink>,
    tokens: HashMap<String, Token>,
    accounts: HashMap<String, AccountId>,
}

impl ScenarioService {
    pub fn new(cfg: Config) -> Result<Self, AppError> {
        let mut tokens = HashMap::new();
        for asset in &cfg.assets {
            let token = Token::new(&asset.symbol, asset.decimals);
            if tokens.insert(asset.symbol.clone(), token).is_some() {
                return Err(AppError::Config(format!(
                    "duplicate asset symbol: {}",
                    asset.symbol
                )));
            }
        }

        let mut accounts = HashMap::new();
        for account in &cfg.accounts {
            let id = AccountId::from_name(&account.name);
            if accounts.insert(account.name.clone(), id).is_some() {
                return Err(AppError::Config(format!(
                    "duplicate account name: {}",
                    account.name
                )));
            }
        }

        let custody = AccountId::from_name("cpswap-custody");
        let ledger = Arc::new(InMemoryLedger::new(custody));
        let host = Arc::new(ManualHost::new(cfg.scenario.start_time, custody));
        let sink = Arc::new(MemorySink::new());

        for account_cfg in &cfg.accounts {
            let account = accounts[&account_cfg.name];
            for balance in &account_cfg.balances {
                let token = tokens.get(&balance.asset).ok_or_else(|| {
                    AppError::Config(format!(
                        "unknown asset {} in balances of {}",
                        balance.asset, account_cfg.name
                    ))
                })?;
                ledger.mint(token.id, account, balance.amount);
            }
        }

        let engine = ExchangeEngine::new(ledger, host.clone(), sink.clone(), custody);

        Ok(Self {
            cfg,
            engine,
            host,
            sink,
            tokens,
            accounts,
        })
    }

    /// Execute every scripted step in order. Engine failures are recorded
    /// in the report and do not stop the run; only scenario resolution
    /// errors (unknown symbols or accounts) are fatal.
    pub async fn run(&self) -> Result<ScenarioReport, AppError> {
        info!(
            scenario = %self.cfg.scenario.name,
            steps = self.cfg.steps.len(),
            "running scenario"
        );

        let mut report = ScenarioReport::new(&self.cfg.scenario.name);
        for (index, step) in self.cfg.steps.iter().enumerate() {
            let entry = self.execute_step(index, step).await?;
            if entry.ok {
                info!(step = index, op = %entry.op, detail = %entry.detail, "step ok");
            } else {
                warn!(step = index, op = %entry.op, detail = %entry.detail, "step failed");
            }
            report.steps.push(entry);
        }

        for (key, pool) in self.engine.pools().snapshots().await {
            report.pools.push(PoolSnapshot {
                pair_key: key,
                pool,
            });
        }
        report.events = self.sink.events();
        Ok(report)
    }

    async fn execute_step(&self, index: usize, step: &StepCfg) -> Result<StepReport, AppError> {
        match step {
            StepCfg::AddLiquidity {
                caller,
                pair,
                desired,
                min,
                to,
                deadline_offset,
            } => {
                let caller_id = self.account(caller)?;
                let token_a = self.token(&pair[0])?;
                let token_b = self.token(&pair[1])?;
                let receiver = match to {
                    Some(name) => self.account(name)?,
                    None => caller_id,
                };
                self.host.set_caller(caller_id);
                let deadline = self.deadline(*deadline_offset);

                let result = self
                    .engine
                    .add_liquidity(
                        token_a.id, token_b.id, desired[0], desired[1], min[0], min[1], receiver,
                        deadline,
                    )
                    .await;
                Ok(match result {
                    Ok(added) => StepReport::succeeded(
                        index,
                        "add-liquidity",
                        format!(
                            "accepted {} {} + {} {}, minted {} shares",
                            format_amount(added.amount_a, token_a.decimals),
                            token_a.symbol,
                            format_amount(added.amount_b, token_b.decimals),
                            token_b.symbol,
                            added.shares,
                        ),
                    ),
                    Err(err) => StepReport::failed(index, "add-liquidity", err.to_string()),
                })
            }

            StepCfg::RemoveLiquidity {
                caller,
                pair,
                shares,
                min,
                to,
                deadline_offset,
            } => {
                let caller_id = self.account(caller)?;
                let token_a = self.token(&pair[0])?;
                let token_b = self.token(&pair[1])?;
                let receiver = match to {
                    Some(name) => self.account(name)?,
                    None => caller_id,
                };
                self.host.set_caller(caller_id);
                let deadline = self.deadline(*deadline_offset);

                let result = self
                    .engine
                    .remove_liquidity(
                        token_a.id, token_b.id, *shares, min[0], min[1], receiver, deadline,
                    )
                    .await;
                Ok(match result {
                    Ok(removed) => StepReport::succeeded(
                        index,
                        "remove-liquidity",
                        format!(
                            "burned {} shares for {} {} + {} {}",
                            shares,
                            format_amount(removed.amount_a, token_a.decimals),
                            token_a.symbol,
                            format_amount(removed.amount_b, token_b.decimals),
                            token_b.symbol,
                        ),
                    ),
                    Err(err) => StepReport::failed(index, "remove-liquidity", err.to_string()),
                })
            }

            StepCfg::Swap {
                caller,
                path,
                amount_in,
                min_out,
                to,
                deadline_offset,
            } => {
                let caller_id = self.account(caller)?;
                let mut assets = Vec::with_capacity(path.len());
                for symbol in path {
                    assets.push(self.token(symbol)?.id);
                }
                let receiver = match to {
                    Some(name) => self.account(name)?,
                    None => caller_id,
                };
                self.host.set_caller(caller_id);
                let deadline = self.deadline(*deadline_offset);

                let result = self
                    .engine
                    .swap_exact_in(*amount_in, *min_out, &assets, receiver, deadline)
                    .await;
                Ok(match result {
                    Ok(receipt) => {
                        let token_in = self.token(&path[0])?;
                        let token_out = self.token(&path[1])?;
                        StepReport::succeeded(
                            index,
                            "swap",
                            format!(
                                "swapped {} {} for {} {}",
                                format_amount(receipt.amount_in, token_in.decimals),
                                token_in.symbol,
                                format_amount(receipt.amount_out, token_out.decimals),
                                token_out.symbol,
                            ),
                        )
                    }
                    Err(err) => StepReport::failed(index, "swap", err.to_string()),
                })
            }

            StepCfg::Price { pair } => {
                let token_a = self.token(&pair[0])?;
                let token_b = self.token(&pair[1])?;
                Ok(match self.engine.price(token_a.id, token_b.id).await {
                    Ok(price) => StepReport::succeeded(
                        index,
                        "price",
                        format!(
                            "1 {} = {} {}",
                            token_a.symbol,
                            format_amount(price, 18),
                            token_b.symbol,
                        ),
                    ),
                    Err(err) => StepReport::failed(index, "price", err.to_string()),
                })
            }

            StepCfg::Quote {
                amount_in,
                reserve_in,
                reserve_out,
            } => Ok(
                match math::quote_amount_out(*amount_in, *reserve_in, *reserve_out) {
                    Ok(out) => StepReport::succeeded(
                        index,
                        "quote",
                        format!("{amount_in} in yields {out} out"),
                    ),
                    Err(err) => StepReport::failed(index, "quote", err.to_string()),
                },
            ),

            StepCfg::Advance { seconds } => {
                self.host.advance(*seconds);
                Ok(StepReport::succeeded(
                    index,
                    "advance",
                    format!("clock now {}", self.host.now()),
                ))
            }
        }
    }

    fn token(&self, symbol: &str) -> Result<&Token, AppError> {
        self.tokens
            .get(symbol)
            .ok_or_else(|| AppError::Scenario(format!("unknown asset: {symbol}")))
    }

    fn account(&self, name: &str) -> Result<AccountId, AppError> {
        self.accounts
            .get(name)
            .copied()
            .ok_or_else(|| AppError::Scenario(format!("unknown account: {name}")))
    }

    fn deadline(&self, offset: Option<i64>) -> u64 {
        let now = self.host.now() as i64;
        (now + offset.unwrap_or(DEFAULT_DEADLINE_OFFSET)).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config() -> Config {
        Config::from_toml_str(
            r#"
            [scenario]
            name = "demo"
            start_time = 1000

            [[assets]]
            symbol = "GOLD"
            decimals = 0

            [[assets]]
            symbol = "SILVER"
            decimals = 0

            [[accounts]]
            name = "alice"
            balances = [
                { asset = "GOLD", amount = 1000 },
                { asset = "SILVER", amount = 1000 },
            ]

            [[accounts]]
            name = "bob"
            balances = [{ asset = "GOLD", amount = 500 }]

            [[steps]]
            op = "add-liquidity"
            caller = "alice"
            pair = ["GOLD", "SILVER"]
            desired = [100, 400]

            [[steps]]
            op = "swap"
            caller = "bob"
            path = ["GOLD", "SILVER"]
            amount_in = 100
            min_out = 150

            [[steps]]
            op = "price"
            pair = ["GOLD", "SILVER"]

            [[steps]]
            op = "swap"
            caller = "bob"
            path = ["GOLD", "SILVER"]
            amount_in = 100
            min_out = 100000
        "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_scenario_runs_and_reports() {
        let service = ScenarioService::new(demo_config()).unwrap();
        let report = service.run().await.unwrap();

        assert_eq!(report.steps.len(), 4);
        assert!(report.steps[0].ok);
        // floor(100*400/200) = 200 SILVER out.
        assert!(report.steps[1].ok);
        assert!(report.steps[1].detail.contains("200 SILVER"));
        assert!(report.steps[2].ok);
        // The last swap demands an impossible minimum and is recorded,
        // not fatal.
        assert!(!report.steps[3].ok);
        assert!(report.steps[3].detail.contains("slippage"));

        assert_eq!(report.pools.len(), 1);
        assert_eq!(report.events.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_account_is_fatal() {
        let mut cfg = demo_config();
        cfg.accounts.clear();
        let service = ScenarioService::new(cfg).unwrap();
        let err = service.run().await.unwrap_err();
        assert!(matches!(err, AppError::Scenario(_)));
    }
}
