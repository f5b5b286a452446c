use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use graduate_stage_tracker::config::{DataSource, Overrides, Settings};
use graduate_stage_tracker::db::PgStore;
use graduate_stage_tracker::models::DelayedFilters;
use graduate_stage_tracker::semester::{current_semester, semester_date_range};
use graduate_stage_tracker::snapshot::MemoryStore;
use graduate_stage_tracker::{
    get_delayed_students, get_duration_analysis, get_stage_distribution, get_summary, report,
    StageStore,
};

#[derive(Parser)]
#[command(name = "stage-tracker")]
#[command(about = "Graduate program stage tracking analytics", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./stage-tracker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,
    #[arg(long, env = "STAGE_TRACKER_MAX_CONNECTIONS", global = true)]
    max_connections: Option<u32>,
    /// Read a CSV snapshot directory instead of Postgres
    #[arg(long, env = "STAGE_TRACKER_SNAPSHOT_DIR", global = true)]
    snapshot_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Program-wide summary
    Summary {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Student count per stage
    Distribution,
    /// Expected vs actual time in thesis writing and coursework
    Durations,
    /// Most delayed students
    Delayed {
        #[arg(long)]
        program_id: Option<Uuid>,
        #[arg(long)]
        advisor_id: Option<Uuid>,
        #[arg(long)]
        semester: Option<String>,
    },
    /// Current semester label and its date range
    Semester {
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SemesterOutput {
    semester: String,
    start: NaiveDate,
    end: NaiveDate,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_store(settings: &Settings) -> anyhow::Result<Box<dyn StageStore>> {
    match settings.data_source()? {
        DataSource::Snapshot(dir) => {
            let store = MemoryStore::load_dir(&dir)
                .with_context(|| format!("failed to load snapshot from {}", dir.display()))?;
            Ok(Box::new(store))
        }
        DataSource::Postgres(_) => {
            let store = PgStore::connect(settings)
                .await
                .context("failed to connect to Postgres")?;
            Ok(Box::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = Local::now().date_naive();

    if let Commands::Semester { as_of } = &cli.command {
        let label = current_semester(as_of.unwrap_or(today));
        let (start, end) = semester_date_range(&label)?;
        return print_json(&SemesterOutput {
            semester: label.to_string(),
            start,
            end,
        });
    }

    let settings = Settings::resolve(
        cli.config.as_deref(),
        Overrides {
            database_url: cli.database_url,
            max_connections: cli.max_connections,
            snapshot_dir: cli.snapshot_dir,
        },
    )?;
    let store = open_store(&settings).await?;
    let store = store.as_ref();

    match cli.command {
        Commands::Summary { as_of } => {
            print_json(&get_summary(store, as_of.unwrap_or(today)).await?)?;
        }
        Commands::Distribution => {
            print_json(&get_stage_distribution(store).await?)?;
        }
        Commands::Durations => {
            print_json(&get_duration_analysis(store).await?)?;
        }
        Commands::Delayed {
            program_id,
            advisor_id,
            semester,
        } => {
            let filters = DelayedFilters {
                program_id,
                advisor_id,
                semester,
            };
            print_json(&get_delayed_students(store, &filters).await?)?;
        }
        Commands::Report { as_of, out } => {
            let as_of = as_of.unwrap_or(today);
            let filters = DelayedFilters::default();
            let (summary, distribution, durations, delayed) = tokio::try_join!(
                get_summary(store, as_of),
                get_stage_distribution(store),
                get_duration_analysis(store),
                get_delayed_students(store, &filters),
            )?;
            let report =
                report::build_report(as_of, &summary, &distribution, &durations, &delayed);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), "report written");
        }
        Commands::Semester { .. } => {}
    }

    Ok(())
}
