//! TypeBalancer CLI
//!
//! Reorders a JSON array of objects so that item types are spread evenly,
//! and exposes the position calculator for inspection.

mod config;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use config::{DEFAULT_LOG_LEVEL, FileConfig};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typebalancer_common::{BalancerConfig, GapFillKind, StrategyKind};
use typebalancer_placement::{AccessorCache, Balancer, DistributionReport, calculate_positions};

#[derive(Parser, Debug)]
#[command(name = "typebalancer")]
#[command(about = "Spread item types evenly through a sequence")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Balance a JSON array of objects and print it to stdout
    Balance(BalanceArgs),
    /// Print the positions a ratio selects in a sequence
    Positions {
        /// Sequence length
        total: u64,
        /// Share of the sequence, in [0, 1]
        ratio: f64,
        /// Restrict the choice to these slots
        #[arg(long, value_delimiter = ',')]
        available: Vec<u64>,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct BalanceArgs {
    /// Input file; reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Key holding each item's type
    #[arg(long)]
    type_field: Option<String>,

    /// Type priority, comma separated
    #[arg(long, value_delimiter = ',')]
    order: Option<Vec<String>>,

    /// Window size; selects the sliding window strategy
    #[arg(long)]
    window_size: Option<usize>,

    /// Items per batch for the sliding window strategy
    #[arg(long)]
    batch_size: Option<usize>,

    /// Strategy (distributor, sliding_window)
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Minimum share per present type
    #[arg(long)]
    min_ratio: Option<f64>,

    /// Gap filler for the distributor (sequential, alternating)
    #[arg(long)]
    gap_fill: Option<GapFillKind>,

    /// Print a distribution report to stderr
    #[arg(long)]
    report: bool,

    /// Window size for the report's diversity figure
    #[arg(long)]
    report_window: Option<usize>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

impl BalanceArgs {
    /// Apply command line overrides on top of the file configuration
    fn merge(&self, mut config: BalancerConfig) -> BalancerConfig {
        if let Some(order) = &self.order {
            config.type_order = Some(order.iter().map(|s| s.trim().to_string()).collect());
        }
        if let Some(window_size) = self.window_size {
            config.window_size = Some(window_size);
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(min_ratio) = self.min_ratio {
            config.min_ratio = min_ratio;
        }
        if let Some(gap_fill) = self.gap_fill {
            config.gap_fill = gap_fill;
        }
        config
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    let file = FileConfig::load(args.config.as_deref())?;

    let log_level = if args.log_level == DEFAULT_LOG_LEVEL {
        file.logging.level.clone()
    } else {
        args.log_level.clone()
    };

    // Initialize logging; stdout carries the JSON output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Commands::Balance(cmd) => run_balance(&cmd, file),
        Commands::Positions {
            total,
            ratio,
            available,
        } => {
            let available = (!available.is_empty()).then_some(available.as_slice());
            let positions = calculate_positions(total, ratio, available)?;
            println!("{}", serde_json::to_string(&positions)?);
            Ok(())
        }
    }
}

fn run_balance(cmd: &BalanceArgs, file: FileConfig) -> Result<()> {
    let config = cmd.merge(file.balancer);
    config.validate().context("invalid balancer configuration")?;

    let type_field = cmd
        .type_field
        .clone()
        .unwrap_or(file.input.type_field);
    let items = read_items(cmd.input.as_deref())?;
    info!(
        items = items.len(),
        strategy = %config.effective_strategy(),
        type_field = %type_field,
        "balancing input"
    );

    let mut accessors = AccessorCache::new();
    let report_window = cmd
        .report_window
        .unwrap_or_else(|| config.effective_window_size());
    let balanced = match Balancer::from_config(config).balance_by_field(
        items,
        &type_field,
        &mut accessors,
    ) {
        Ok(balanced) => balanced,
        Err(e) if e.is_input_error() => anyhow::bail!("input rejected: {e}"),
        Err(e) => return Err(e).context("failed to balance input"),
    };

    if cmd.report {
        let report = DistributionReport::from_items(&balanced, accessors.get(&type_field), report_window)?;
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    let out = if cmd.pretty {
        serde_json::to_string_pretty(&balanced)?
    } else {
        serde_json::to_string(&balanced)?
    };
    println!("{out}");
    debug!(items = balanced.len(), "wrote output");
    Ok(())
}

/// Read a JSON array from `path`, or from stdin for `None` / `-`
fn read_items(path: Option<&Path>) -> Result<Vec<Value>> {
    let text = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    parse_items(&text)
}

fn parse_items(text: &str) -> Result<Vec<Value>> {
    serde_json::from_str(text).context("input must be a JSON array")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance_args() {
        let args = Args::try_parse_from([
            "typebalancer",
            "balance",
            "items.json",
            "--order",
            "image,video",
            "--strategy",
            "window",
            "--gap-fill",
            "alternating",
            "--report",
        ])
        .unwrap();

        let Commands::Balance(cmd) = args.command else {
            panic!("expected balance");
        };
        assert_eq!(cmd.input.as_deref(), Some(Path::new("items.json")));
        assert_eq!(cmd.order, Some(vec!["image".to_string(), "video".to_string()]));
        assert_eq!(cmd.strategy, Some(StrategyKind::SlidingWindow));
        assert_eq!(cmd.gap_fill, Some(GapFillKind::Alternating));
        assert!(cmd.report);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_parse_positions_args() {
        let args =
            Args::try_parse_from(["typebalancer", "positions", "10", "0.5", "--available", "0,1,2"])
                .unwrap();
        let Commands::Positions {
            total,
            ratio,
            available,
        } = args.command
        else {
            panic!("expected positions");
        };
        assert_eq!((total, available), (10, vec![0, 1, 2]));
        assert!((ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Args::try_parse_from(["typebalancer", "balance", "--strategy", "random"]).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = BalancerConfig {
            batch_size: 200,
            min_ratio: 0.2,
            type_order: Some(vec!["video".to_string()]),
            ..BalancerConfig::default()
        };
        let cmd = BalanceArgs {
            order: Some(vec![" image".to_string(), "video ".to_string()]),
            window_size: Some(4),
            ..BalanceArgs::default()
        };

        let merged = cmd.merge(file);
        assert_eq!(
            merged.type_order,
            Some(vec!["image".to_string(), "video".to_string()])
        );
        assert_eq!(merged.window_size, Some(4));
        assert_eq!(merged.batch_size, 200);
        assert!((merged.min_ratio - 0.2).abs() < f64::EPSILON);
        assert_eq!(merged.effective_strategy(), StrategyKind::SlidingWindow);
    }

    #[test]
    fn test_parse_items() {
        let items = parse_items(r#"[{"type": "video"}, {"type": "image"}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert!(parse_items(r#"{"type": "video"}"#).is_err());
    }
}
