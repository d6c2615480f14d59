//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{self, CsvDataAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::text_report_adapter::{self, TextReportAdapter};
use crate::domain::backtest::run_backtest;
use crate::domain::config_validation::{
    backtest_config_from, confidence_from, data_range_from, monte_carlo_config_from,
    signal_config_from,
};
use crate::domain::error::MatraderError;
use crate::domain::metrics::risk_report;
use crate::domain::montecarlo;
use crate::domain::options::{black_scholes, OptionKind};
use crate::domain::signal::generate_signals;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "matrader", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a crossover backtest over a close-price CSV
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding {code}.csv price files
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        code: String,
        /// Write a report here (.json gets the JSON adapter)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export the equity curve as CSV
        #[arg(long)]
        equity_csv: Option<PathBuf>,
    },
    /// Monte Carlo weight search over a returns-matrix CSV
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV with one column per asset, one row per observation
        #[arg(long)]
        returns: PathBuf,
    },
    /// Price a European option
    Price {
        #[arg(long)]
        spot: f64,
        #[arg(long)]
        strike: f64,
        /// Time to expiry in years
        #[arg(long)]
        expiry: f64,
        #[arg(long, default_value_t = 0.05)]
        rate: f64,
        #[arg(long)]
        volatility: f64,
        /// Price a put instead of a call
        #[arg(long)]
        put: bool,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging();

    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            code,
            output,
            equity_csv,
        } => run_backtest_command(&config, &data, &code, output.as_deref(), equity_csv.as_deref()),
        Command::Optimize { config, returns } => run_optimize(&config, &returns),
        Command::Price {
            spot,
            strike,
            expiry,
            rate,
            volatility,
            put,
        } => run_price(spot, strike, expiry, rate, volatility, put),
        Command::ListSymbols { data } => run_list_symbols(&data),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, MatraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| MatraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_backtest_command(
    config_path: &Path,
    data: &Path,
    code: &str,
    output: Option<&Path>,
    equity_csv: Option<&Path>,
) -> Result<(), MatraderError> {
    let config = load_config(config_path)?;
    let signal_config = signal_config_from(&config)?;
    let backtest_config = backtest_config_from(&config)?;
    let confidence = confidence_from(&config)?;
    let (start_date, end_date) = data_range_from(&config)?;

    let adapter = CsvDataAdapter::new(data.to_path_buf());
    let series = adapter.fetch_closes(code, start_date, end_date)?;
    let signals = generate_signals(&series, &signal_config);
    let result = run_backtest(&series, &signals, &backtest_config)?;
    let report = risk_report(&result, backtest_config.risk_free_rate, confidence)?;

    print!("{}", text_report_adapter::render(&result, &report));

    if let Some(path) = output {
        if path.extension().is_some_and(|ext| ext == "json") {
            JsonReportAdapter.write(&result, &report, path)?;
        } else {
            TextReportAdapter.write(&result, &report, path)?;
        }
    }
    if let Some(path) = equity_csv {
        csv_adapter::write_equity_curve(path, &result.equity_curve)?;
    }
    Ok(())
}

fn run_optimize(config_path: &Path, returns: &Path) -> Result<(), MatraderError> {
    let config = load_config(config_path)?;
    let mc_config = monte_carlo_config_from(&config)?;
    let (codes, matrix) = csv_adapter::read_returns_matrix(returns)?;

    let outcome = montecarlo::optimize(&matrix, &mc_config);

    println!(
        "=== Monte Carlo Weight Search ({} trials, seed {}) ===",
        mc_config.trials(),
        mc_config.seed()
    );
    println!("Max Sharpe portfolio:");
    print_weights(&codes, &outcome.max_sharpe_weights);
    println!("Min volatility portfolio:");
    print_weights(&codes, &outcome.min_volatility_weights);
    Ok(())
}

fn print_weights(codes: &[String], weights: &[f64]) {
    for (code, weight) in codes.iter().zip(weights) {
        println!("  {code}: {weight:.4}");
    }
}

fn run_price(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    volatility: f64,
    put: bool,
) -> Result<(), MatraderError> {
    let kind = if put { OptionKind::Put } else { OptionKind::Call };
    let price = black_scholes(spot, strike, expiry, rate, volatility, kind)?;
    println!("{price:.6}");
    Ok(())
}

fn run_list_symbols(data: &Path) -> Result<(), MatraderError> {
    let adapter = CsvDataAdapter::new(data.to_path_buf());
    for code in adapter.list_symbols()? {
        println!("{code}");
    }
    Ok(())
}
