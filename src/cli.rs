//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{Analyzer, DateRange};
use crate::domain::error::FoliostatError;
use crate::domain::series::InstrumentSeries;
use crate::domain::settings::{self, AnalysisSettings};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "foliostat", about = "Portfolio time-series analytics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full analysis and export result tables
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for the exported tables (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured instrument list
        #[arg(long)]
        instruments: Option<String>,
        /// Override the window start (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Override the window end (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Also print the pairs with negative correlation
        #[arg(long)]
        negative_only: bool,
    },
    /// Show data range for one or all instruments
    Info {
        #[arg(long)]
        id: Option<String>,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments available in the data directory
    ListInstruments {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            output,
            instruments,
            start,
            end,
            negative_only,
        } => run_analyze(
            &config,
            output.as_deref(),
            instruments.as_deref(),
            start.as_deref(),
            end.as_deref(),
            negative_only,
        ),
        Command::Info { id, config } => run_info(id.as_deref(), &config),
        Command::ListInstruments { config } => run_list_instruments(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_settings(path: &Path) -> Result<AnalysisSettings, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FoliostatError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })?;

    settings::build_settings(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn apply_overrides(
    mut settings: AnalysisSettings,
    instruments: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<AnalysisSettings, FoliostatError> {
    if let Some(list) = instruments {
        settings.instruments = settings::parse_instruments(list)?;
    }
    if start.is_some() || end.is_some() {
        settings.range = settings::build_range(start, end)?;
    }
    Ok(settings)
}

/// Fetch every configured instrument, skipping ones with no usable data.
fn load_instruments(
    data_port: &dyn DataPort,
    ids: &[String],
) -> Result<Vec<InstrumentSeries>, FoliostatError> {
    let mut series = Vec::new();

    for id in ids {
        let points = match data_port.fetch_prices(id) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", id, e);
                continue;
            }
        };
        if points.is_empty() {
            eprintln!("Warning: skipping {} (no data found)", id);
            continue;
        }
        eprintln!("  {}: {} rows", id, points.len());
        series.push(InstrumentSeries::from_points(id.clone(), points));
    }

    if series.is_empty() {
        return Err(FoliostatError::Data {
            reason: "no instrument has usable data".into(),
        });
    }
    Ok(series)
}

fn run_analyze(
    config_path: &Path,
    output: Option<&Path>,
    instruments: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    negative_only: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let settings = match apply_overrides(settings, instruments, start, end) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match analyze_and_export(&settings, output, negative_only) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn analyze_and_export(
    settings: &AnalysisSettings,
    output: Option<&Path>,
    negative_only: bool,
) -> Result<(), FoliostatError> {
    let data_port = CsvAdapter::new(settings.csv_path.clone());
    let series = load_instruments(&data_port, &settings.instruments)?;
    let loaded_ids: Vec<String> = series.iter().map(|s| s.id.clone()).collect();

    let mut analyzer = Analyzer::new();
    analyzer.set_risk_free_rate(settings.risk_free_rate)?;
    analyzer.load_series(series)?;
    if let DateRange::Between { start, end } = settings.range {
        analyzer.set_range(start, end)?;
    }
    if let Some(combo) = settings.combo.clone() {
        let available: Vec<&str> = loaded_ids.iter().map(String::as_str).collect();
        for id in combo.unmatched(&available) {
            eprintln!("Warning: combo weight for {} matches no loaded instrument", id);
        }
        analyzer.set_combo(combo)?;
    }

    let snapshot = analyzer.snapshot().ok_or_else(|| FoliostatError::Data {
        reason: "analysis produced no snapshot".into(),
    })?;

    println!(
        "{} dates, {} instruments, {} sampling",
        snapshot.merged.date_count(),
        snapshot.merged.instrument_count(),
        snapshot.periodicity.label()
    );
    println!();
    print_stats(snapshot);

    if negative_only {
        if let Some(matrix) = &snapshot.correlation {
            println!();
            println!("negatively correlated pairs:");
            for (a, b, c) in matrix.negative_pairs() {
                println!("  {} / {}: {:.4}", a, b, c);
            }
        }
    }

    let out_dir = output.unwrap_or_else(|| Path::new("."));
    let report = CsvReportAdapter;
    report.write_series_table(snapshot, &out_dir.join("series.csv"))?;
    report.write_stats_table(snapshot, &out_dir.join("stats.csv"))?;
    report.write_correlation_table(snapshot, &out_dir.join("correlation.csv"))?;
    eprintln!("Wrote series.csv, stats.csv, correlation.csv to {}", out_dir.display());

    Ok(())
}

fn print_stats(snapshot: &crate::domain::analysis::Snapshot) {
    println!(
        "{:<10} {:>10} {:>10} {:>8} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "id", "cagr", "vol", "sharpe", "sortino", "max_dd", "ulcer", "calmar", "pf"
    );
    for record in &snapshot.stats {
        println!(
            "{:<10} {:>10} {:>10} {:>8} {:>8} {:>10} {:>8} {:>8} {:>8}",
            record.id,
            short(record.cagr),
            short(record.volatility),
            short(record.sharpe),
            short(record.sortino),
            short(record.max_drawdown),
            short(record.ulcer_index),
            short(record.calmar),
            short(record.profit_factor),
        );
    }
}

fn short(metric: crate::domain::stats::Metric) -> String {
    match metric.value() {
        Some(v) if v.is_infinite() => "inf".into(),
        Some(v) => format!("{v:.4}"),
        None => "-".into(),
    }
}

fn run_info(id: Option<&str>, config_path: &Path) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let data_port = CsvAdapter::new(settings.csv_path.clone());

    let ids: Vec<String> = match id {
        Some(id) => vec![id.to_uppercase()],
        None => settings.instruments.clone(),
    };

    for id in &ids {
        match data_port.get_data_range(id) {
            Ok(Some((first, last, rows))) => {
                println!("{}: {} .. {} ({} rows)", id, first, last, rows)
            }
            Ok(None) => println!("{}: no data", id),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_list_instruments(config_path: &Path) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let data_port = CsvAdapter::new(settings.csv_path.clone());

    match data_port.list_instruments() {
        Ok(ids) => {
            for id in ids {
                println!("{id}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    match load_settings(config_path) {
        Ok(settings) => {
            // Combo weights naming instruments outside the configured set
            // would silently never contribute; call that out here.
            if let Some(combo) = &settings.combo {
                let available: Vec<&str> =
                    settings.instruments.iter().map(String::as_str).collect();
                for id in combo.unmatched(&available) {
                    eprintln!("Warning: combo weight for {} is not in instruments", id);
                }
            }
            println!("config OK: {} instrument(s)", settings.instruments.len());
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}
