//! Finsync ledger replay
//!
//! Loads a ledger file, seeds a sync engine with it, logs the resulting
//! summary and writes the change log as CSV.
//!
//! Usage: FINSYNC__REPLAY__INPUT=ledger.json cargo run --bin finsync-replay

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsync_core::ledger::{Expense, Income, MonthlyData};
use finsync_core::sync::{ConsolidatedSpreadsheet, SyncEngine};
use finsync_shared::types::{format_percent, Money};
use finsync_shared::{AppConfig, AppError, LoggingConfig};

/// Persisted ledger, as exported by the persistence layer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerFile {
    #[serde(default)]
    income: Income,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    history: Vec<MonthlyData>,
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load();
    let filter = config
        .as_ref()
        .map_or_else(|_| LoggingConfig::default().filter, |c| c.logging.filter.clone());

    // Logs go to stderr; stdout carries the CSV
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = config
        .context("Failed to load configuration")
        .and_then(|config| run(&config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, exit) = err
                .downcast_ref::<AppError>()
                .map_or(("INTERNAL_ERROR", 70), |e| (e.error_code(), e.exit_code()));
            error!(code, error = %format!("{err:#}"), "Replay failed");
            ExitCode::from(u8::try_from(exit).unwrap_or(1))
        }
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let ledger = load_ledger(&config.replay.input)?;
    info!(
        input = %config.replay.input.display(),
        expenses = ledger.expenses.len(),
        months = ledger.history.len(),
        "Ledger loaded"
    );

    let mut engine = SyncEngine::create(&config.sync).map_err(AppError::from)?;
    engine.subscribe(|snapshot: &ConsolidatedSpreadsheet| {
        debug!(
            net_balance = %snapshot.summary.net_balance,
            logs = snapshot.logs.len(),
            "Snapshot updated"
        );
    });

    engine
        .initialize_with_data(&ledger.income, &ledger.expenses, &ledger.history)
        .map_err(AppError::from)?;

    log_summary(engine.consolidated_data());

    let csv = engine.export_csv().map_err(AppError::from)?;
    match &config.replay.output {
        Some(path) => {
            std::fs::write(path, csv)
                .map_err(AppError::from)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), "Change log written");
        }
        None => println!("{csv}"),
    }

    engine.dispose();
    Ok(())
}

fn load_ledger(path: &Path) -> anyhow::Result<LedgerFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(AppError::from)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let ledger = serde_json::from_str(&raw)
        .map_err(|e| AppError::Serialization(e.to_string()))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(ledger)
}

fn log_summary(data: &ConsolidatedSpreadsheet) {
    let summary = &data.summary;
    info!(
        total_income = %Money::brl(summary.total_income),
        total_expenses = %Money::brl(summary.total_expenses),
        total_investments = %Money::brl(summary.total_investments),
        net_balance = %Money::brl(summary.net_balance),
        salary_usage = %format_percent(summary.income_usage.salary_usage_percent),
        "Ledger summary"
    );

    for position in &data.sections.investments.consolidated {
        let performance = position
            .performance
            .map_or_else(|| "n/a".to_string(), format_percent);
        info!(
            name = %position.name,
            total_invested = %Money::brl(position.total_invested),
            current_balance = %Money::brl(position.current_balance),
            performance = %performance,
            "Investment position"
        );
    }

    for year in &data.sections.history.yearly_totals {
        info!(
            year = year.year,
            net_balance = %Money::brl(year.net_balance),
            total_investments = %Money::brl(year.total_investments),
            "Yearly totals"
        );
    }
}
