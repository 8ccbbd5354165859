mod bootstrap;
mod commands;
mod report;

use anyhow::Result;
use ev_core::config::RangePolicy;
use ev_core::settings::Settings;
use ev_runtime::dashboard::Dashboard;
use ev_runtime::data_manager::DataManager;
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::{Command, HELP};
use report::{OutputFormat, Report};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("EV dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.engine_config()?;
    let format = OutputFormat::from_name(&settings.format);

    // Ingestion must finish before any filtering or aggregation starts.
    let mut manager = DataManager::new(settings.data.clone(), config.fields.clone());
    let state = tokio::task::spawn_blocking(move || manager.load()).await?;
    let ingest_error = state.failure().map(str::to_string);

    let mut dashboard = Dashboard::new(state.into_records(), &config)?;
    if let Err(e) = dashboard.select_group(&settings.group) {
        eprintln!("{e}; showing all counties");
    }
    dashboard.go_to_page(settings.page);

    print_report(&mut dashboard, format, &config.range_policy, ingest_error.clone())?;

    if settings.interactive && ingest_error.is_none() {
        run_interactive(&mut dashboard, format, &config.range_policy).await?;
    }

    if let Some(reason) = ingest_error {
        anyhow::bail!("ingestion failed: {reason}");
    }

    Ok(())
}

fn print_report(
    dashboard: &mut Dashboard,
    format: OutputFormat,
    policy: &RangePolicy,
    ingest_error: Option<String>,
) -> Result<()> {
    let report = Report {
        snapshot: dashboard.snapshot(),
        ingest_error,
    };
    println!("{}", report.render(format, policy)?);
    Ok(())
}

/// Read commands from stdin until `quit`, end of input or Ctrl+C.
async fn run_interactive(
    dashboard: &mut Dashboard,
    format: OutputFormat,
    policy: &RangePolicy,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{HELP}");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received; leaving interactive mode");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Next => dashboard.next_page(),
            Command::Previous => dashboard.previous_page(),
            Command::Page(page) => dashboard.go_to_page(page),
            Command::Group(name) => {
                if let Err(e) = dashboard.select_group(&name) {
                    eprintln!("{e}");
                    continue;
                }
            }
            Command::Groups => {
                println!("{}", dashboard.available_groups().join(", "));
                continue;
            }
            Command::Help => {
                eprintln!("{HELP}");
                continue;
            }
            Command::Quit => break,
            Command::Show => {}
        }

        print_report(dashboard, format, policy, None)?;
    }

    Ok(())
}
