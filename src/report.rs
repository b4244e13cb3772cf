// src/report.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::exchange::ExchangeEvent;
use crate::domain::pair::PairKey;
use crate::domain::pool::Pool;
use crate::shared::utils::generate_id;

/// Outcome of one scripted step.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: String,
    pub ok: bool,
    pub detail: String,
}

impl StepReport {
    pub fn succeeded(index: usize, op: &str, detail: String) -> Self {
        Self {
            index,
            op: op.to_string(),
            ok: true,
            detail,
        }
    }

    pub fn failed(index: usize, op: &str, detail: String) -> Self {
        Self {
            index,
            op: op.to_string(),
            ok: false,
            detail,
        }
    }
}

/// Final state of one pool at the end of a run.
#[derive(Debug, Serialize)]
pub struct PoolSnapshot {
    pub pair_key: PairKey,
    pub pool: Pool,
}

/// Full record of a scenario run: step outcomes, every emitted event,
/// and the closing state of every pool.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub run_id: String,
    pub scenario: String,
    pub timestamp: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    pub events: Vec<ExchangeEvent>,
    pub pools: Vec<PoolSnapshot>,
}

impl ScenarioReport {
    pub fn new(scenario: &str) -> Self {
        Self {
            run_id: generate_id(),
            scenario: scenario.to_string(),
            timestamp: Utc::now(),
            steps: Vec::new(),
            events: Vec::new(),
            pools: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = ScenarioReport::new("demo");
        report
            .steps
            .push(StepReport::succeeded(0, "price", "4.0".to_string()));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"scenario\": \"demo\""));
        assert!(json.contains("\"ok\": true"));
    }
}
