// src/app.rs
use anyhow::Result;
use tracing::info;

use crate::application::ScenarioService;
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config_path: String,
    pub pretty: bool,
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("loading scenario from {}", app_cfg.config_path);
    let cfg = Config::from_file(&app_cfg.config_path)?;

    let service = ScenarioService::new(cfg)?;
    let report = service.run().await?;

    let failed = report.steps.iter().filter(|step| !step.ok).count();
    info!(
        steps = report.steps.len(),
        failed,
        events = report.events.len(),
        "scenario finished"
    );

    let json = if app_cfg.pretty {
        report.to_json()?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
