use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioCfg {
    pub name: String,
    /// Unix time the scripted clock starts at.
    #[serde(default = "default_start_time")]
    pub start_time: u64,
}

fn default_start_time() -> u64 {
    1_700_000_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetCfg {
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    6
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceCfg {
    pub asset: String,
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountCfg {
    pub name: String,
    #[serde(default)]
    pub balances: Vec<BalanceCfg>,
}

/// One scripted operation against the exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum StepCfg {
    AddLiquidity {
        caller: String,
        pair: [String; 2],
        desired: [u128; 2],
        #[serde(default)]
        min: [u128; 2],
        to: Option<String>,
        /// Seconds relative to the scripted clock; negative values script
        /// an already-expired deadline.
        deadline_offset: Option<i64>,
    },
    RemoveLiquidity {
        caller: String,
        pair: [String; 2],
        shares: u128,
        #[serde(default)]
        min: [u128; 2],
        to: Option<String>,
        deadline_offset: Option<i64>,
    },
    Swap {
        caller: String,
        path: Vec<String>,
        amount_in: u128,
        #[serde(default)]
        min_out: u128,
        to: Option<String>,
        deadline_offset: Option<i64>,
    },
    Price {
        pair: [String; 2],
    },
    Quote {
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    },
    Advance {
        seconds: u64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scenario: ScenarioCfg,
    #[serde(default)]
    pub assets: Vec<AssetCfg>,
    #[serde(default)]
    pub accounts: Vec<AccountCfg>,
    #[serde(default)]
    pub steps: Vec<StepCfg>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse scenario config")?;
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse scenario config")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario_config() {
        let cfg = Config::from_toml_str(
            r#"
            [scenario]
            name = "bootstrap"

            [[assets]]
            symbol = "GOLD"
            decimals = 0

            [[assets]]
            symbol = "SILVER"

            [[accounts]]
            name = "alice"
            balances = [{ asset = "GOLD", amount = 1000 }]

            [[steps]]
            op = "add-liquidity"
            caller = "alice"
            pair = ["GOLD", "SILVER"]
            desired = [100, 400]

            [[steps]]
            op = "advance"
            seconds = 60

            [[steps]]
            op = "price"
            pair = ["GOLD", "SILVER"]
        "#,
        )
        .unwrap();

        assert_eq!(cfg.scenario.name, "bootstrap");
        assert_eq!(cfg.scenario.start_time, default_start_time());
        assert_eq!(cfg.assets.len(), 2);
        assert_eq!(cfg.assets[1].decimals, 6);
        assert_eq!(cfg.steps.len(), 3);
        assert!(matches!(
            cfg.steps[0],
            StepCfg::AddLiquidity { ref caller, desired: [100, 400], min: [0, 0], .. }
                if caller == "alice"
        ));
        assert!(matches!(cfg.steps[1], StepCfg::Advance { seconds: 60 }));
    }
}
