//! Schema migration runner.
//!
//! Connects to `DATABASE_URL` only; migrations never run against the read
//! endpoint. Prints a JSON report on stdout and exits non-zero on failure.
//!
//! ```bash
//! scenery-migrate                      # deploy
//! scenery-migrate status
//! scenery-migrate reset --force-reset
//! ```

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use scenery_db::{DbClient, MigrationEntry, MigrationStatus, PoolRole, migrate};
use scenery_server::{AppConfig, telemetry};
use serde::Serialize;

/// Apply, inspect, or reset the database schema.
#[derive(Parser, Debug)]
#[command(name = "scenery-migrate", version, about)]
struct Cli {
    /// What to do.
    #[arg(value_enum, default_value_t = Action::Deploy)]
    action: Action,

    /// Required for `reset`, which destroys all data.
    #[arg(long)]
    force_reset: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    /// Apply pending migrations.
    Deploy,
    /// List applied and pending migrations.
    Status,
    /// Drop the schema and apply every migration.
    Reset,
}

#[derive(Debug, Serialize)]
struct Report {
    success: bool,
    action: Action,
    timestamp: DateTime<Utc>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<Vec<MigrationEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending: Option<Vec<MigrationEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Report {
    fn success(action: Action, message: String, status: MigrationStatus) -> Self {
        Self {
            success: true,
            action,
            timestamp: Utc::now(),
            message,
            applied: Some(status.applied),
            pending: Some(status.pending),
            error: None,
        }
    }

    fn failure(action: Action, err: &anyhow::Error) -> Self {
        Self {
            success: false,
            action,
            timestamp: Utc::now(),
            message: format!("{action:?} failed"),
            applied: None,
            pending: None,
            error: Some(format!("{err:#}")),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let report = match run(&cli).await {
        Ok(report) => report,
        Err(e) => Report::failure(cli.action, &e),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to encode report: {e}"),
    }

    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: &Cli) -> anyhow::Result<Report> {
    if cli.action == Action::Reset && !cli.force_reset {
        bail!("reset destroys all data; pass --force-reset to confirm");
    }

    let config = AppConfig::from_env().context("loading configuration")?;
    telemetry::init(config.log_format);

    let client = DbClient::new(PoolRole::Write, &config.data.write)?;
    tracing::info!(
        target_url = %client.config().redacted_url(),
        action = ?cli.action,
        "Running migrations"
    );
    run_on(cli.action, &client, config.data.shutdown_timeout).await
}

/// Connect, run `action`, and close the pool whatever the outcome.
async fn run_on(action: Action, client: &DbClient, timeout: Duration) -> anyhow::Result<Report> {
    let outcome = match client.connect().await {
        Ok(()) => execute(action, client).await,
        Err(e) => Err(anyhow::Error::from(e).context("connecting to database")),
    };
    let closed = client.close(timeout).await;

    let report = outcome?;
    closed.context("closing database connection")?;
    Ok(report)
}

async fn execute(action: Action, client: &DbClient) -> anyhow::Result<Report> {
    let pool = client.pool();
    let report = match action {
        Action::Deploy => {
            let status = migrate::deploy(pool).await.context("applying migrations")?;
            let message = format!("{} migration(s) applied", status.applied.len());
            Report::success(action, message, status)
        }
        Action::Status => {
            let status = migrate::status(pool).await.context("reading migration status")?;
            let message = format!(
                "{} applied, {} pending",
                status.applied.len(),
                status.pending.len()
            );
            Report::success(action, message, status)
        }
        Action::Reset => {
            let status = migrate::reset(pool).await.context("resetting schema")?;
            let message = format!(
                "schema reset, {} migration(s) applied",
                status.applied.len()
            );
            Report::success(action, message, status)
        }
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use scenery_db::ConnectionConfig;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deploy_is_the_default_action() {
        let cli = Cli::parse_from(["scenery-migrate"]);
        assert_eq!(cli.action, Action::Deploy);
        assert!(!cli.force_reset);
    }

    #[test]
    fn reset_flag_parses() {
        let cli = Cli::parse_from(["scenery-migrate", "reset", "--force-reset"]);
        assert_eq!(cli.action, Action::Reset);
        assert!(cli.force_reset);
    }

    #[tokio::test]
    async fn reset_without_force_is_refused_before_connecting() {
        let cli = Cli::parse_from(["scenery-migrate", "reset"]);
        let err = run(&cli).await.err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("reset destroys all data; pass --force-reset to confirm")
        );
    }

    #[tokio::test]
    async fn failed_connect_still_closes_the_pool() {
        let config = ConnectionConfig::new("postgres://u:p@127.0.0.1:1/app")
            .with_acquire_timeout(Duration::from_millis(300));
        let client =
            DbClient::new(PoolRole::Write, &config).unwrap_or_else(|e| panic!("{e}"));

        let result = run_on(Action::Status, &client, Duration::from_secs(1)).await;
        assert!(result.is_err());
        assert!(client.is_closed());
    }

    #[test]
    fn failure_report_omits_migration_lists() {
        let report = Report::failure(Action::Status, &anyhow::anyhow!("boom"));
        let json = serde_json::to_value(&report).unwrap_or_default();
        assert_eq!(json["success"], false);
        assert_eq!(json["action"], "status");
        assert_eq!(json["error"], "boom");
        assert!(json.get("applied").is_none());
    }
}
