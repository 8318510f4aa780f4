use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fte_planner::config::{Config, ConfigOverrides};
use fte_planner::output::csv::{plan_to_csv, sweep_to_csv};
use fte_planner::output::json::{render_json, render_plan_json};
use fte_planner::output::table::{render_plan_table, render_sweep_table, render_whatif_table};
use fte_planner::scenario::{parse_targets, parse_volumes, PartialWorkload, ScenarioFile};
use fte_planner::server::run_server;
use fte_planner::staffing::calculator::compute_plan;
use fte_planner::staffing::summary::summarize_plan;
use fte_planner::staffing::whatif::{
    simulate_whatif, sweep_tat_targets, TatSweepPoint, WhatIfChange, WhatIfResult,
};
use fte_planner::staffing::{StaffingParameters, StaffingPlan, WorkloadInput};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "fte-planner",
    about = "Hourly and total FTE staffing plans from case inflow and TAT targets"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// First planned hour as HH:MM, used for table labels
    #[arg(long = "shift-start")]
    shift_start: Option<String>,
    #[command(flatten)]
    input: InputArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct InputArgs {
    /// JSON or TOML scenario file
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Hourly case volumes, e.g. "10,20,30"
    #[arg(long)]
    volumes: Option<String>,
    #[arg(long)]
    hours: Option<usize>,
    #[arg(long)]
    aht: Option<f64>,
    #[arg(long)]
    tat: Option<u32>,
    #[arg(long)]
    compliance: Option<u32>,
    #[arg(long)]
    spillover: Option<i64>,
    #[arg(long = "staffed-minutes")]
    staffed_minutes: Option<f64>,
    #[arg(long = "productive-minutes")]
    productive_minutes: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Plan {
        /// Add a bar column scaled to the peak hour
        #[arg(long)]
        chart: bool,
    },
    Whatif {
        #[arg(long)]
        aht: Option<f64>,
        #[arg(long)]
        tat: Option<u32>,
        #[arg(long)]
        spillover: Option<i64>,
        #[arg(long = "productive-minutes")]
        productive_minutes: Option<f64>,
        #[arg(long = "staffed-minutes")]
        staffed_minutes: Option<f64>,
    },
    Sweep {
        #[arg(long, default_value = "60,120,180,240")]
        targets: String,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        staffed_minutes_per_fte: cli.input.staffed_minutes,
        productive_minutes_per_fte: cli.input.productive_minutes,
        shift_start: cli.shift_start.clone(),
        chart: match cli.command {
            Commands::Plan { chart: true } => Some(true),
            _ => None,
        },
    });
    let shift_start = config.shift_start()?;

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let (params, input) = resolve_scenario(&cli.input, &config)?;
    debug!(
        hours = input.hour_count,
        tat = input.tat_target_minutes,
        "resolved planning scenario"
    );

    match &cli.command {
        Commands::Plan { .. } => {
            let plan = compute_plan(&params, &input)?;
            info!(
                peak = plan.peak_hourly_fte,
                total = plan.total_fte,
                "computed staffing plan"
            );
            print_plan(&plan, &params, &input, cli.output, &config, shift_start)?;
        }
        Commands::Whatif {
            aht,
            tat,
            spillover,
            productive_minutes,
            staffed_minutes,
        } => {
            let mut changes = Vec::new();
            if let Some(v) = aht {
                changes.push(WhatIfChange::AhtMinutes(*v));
            }
            if let Some(v) = tat {
                changes.push(WhatIfChange::TatTargetMinutes(*v));
            }
            if let Some(v) = spillover {
                changes.push(WhatIfChange::SpilloverVolume(*v));
            }
            if let Some(v) = productive_minutes {
                changes.push(WhatIfChange::ProductiveMinutes(*v));
            }
            if let Some(v) = staffed_minutes {
                changes.push(WhatIfChange::StaffedMinutes(*v));
            }
            if changes.is_empty() {
                return Err(anyhow!(
                    "at least one --<field> change is required for whatif"
                ));
            }
            let result = simulate_whatif(&params, &input, &changes)?;
            print_whatif(&result, cli.output, shift_start)?;
        }
        Commands::Sweep { targets } => {
            let targets = parse_targets(targets)?;
            let points = sweep_tat_targets(&params, &input, &targets)?;
            print_sweep(&points, cli.output)?;
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(
    command: &Commands,
    config: &Config,
    config_path: &PathBuf,
) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        if config_path.exists() {
            warn!("overwriting existing config at {}", config_path.display());
        }
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

/// Layers CLI flags over the scenario file over config defaults.
fn resolve_scenario(
    args: &InputArgs,
    config: &Config,
) -> Result<(StaffingParameters, WorkloadInput)> {
    let scenario = match &args.input {
        Some(path) => {
            info!("loading scenario from {}", path.display());
            ScenarioFile::load(path)?
        }
        None => ScenarioFile::default(),
    };

    let mut params = scenario
        .staffing
        .unwrap_or_else(|| config.staffing_parameters());
    if let Some(v) = args.staffed_minutes {
        params.staffed_minutes_per_fte = v;
    }
    if let Some(v) = args.productive_minutes {
        params.productive_minutes_per_fte = v;
    }

    let cli_workload = PartialWorkload {
        hour_count: args.hours,
        average_handling_time_minutes: args.aht,
        hourly_volume: args.volumes.as_deref().map(parse_volumes).transpose()?,
        tat_target_minutes: args.tat,
        tat_compliance_percent: args.compliance,
        spillover_volume: args.spillover,
    };
    let merged = scenario.workload.merge(cli_workload);
    if merged.hourly_volume.is_none() {
        warn!("no hourly volumes given, using the demo ramp");
    }
    Ok((params, merged.resolve(&config.defaults)))
}

fn print_plan(
    plan: &StaffingPlan,
    params: &StaffingParameters,
    input: &WorkloadInput,
    format: OutputFormat,
    config: &Config,
    shift_start: Option<chrono::NaiveTime>,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_plan_table(plan, shift_start, config.output.chart));
            println!("{}", summarize_plan(plan));
        }
        OutputFormat::Json => println!("{}", render_plan_json(input, params, plan)?),
        OutputFormat::Csv => print!("{}", plan_to_csv(plan)?),
    }
    Ok(())
}

fn print_whatif(
    result: &WhatIfResult,
    format: OutputFormat,
    shift_start: Option<chrono::NaiveTime>,
) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_whatif_table(result, shift_start)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => {
            warn!("CSV output for whatif not implemented, using the changed plan");
            print!("{}", plan_to_csv(&result.after)?);
        }
    }
    Ok(())
}

fn print_sweep(points: &[TatSweepPoint], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_sweep_table(points)),
        OutputFormat::Json => println!("{}", render_json(points)?),
        OutputFormat::Csv => print!("{}", sweep_to_csv(points)?),
    }
    Ok(())
}
