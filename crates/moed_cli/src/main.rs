use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use moed_calendar::{CalendarEngine, FeastKind};
use moed_config::MoedConfig;
use moed_eclipse::{
    EclipseEngine, EclipseEvent, FeastAlignment, RecordedAltitudes, RecordedEclipses,
    TetradSequence,
};
use moed_events::{CloseApproach, DisasterEvent, EventType};
use moed_match::match_events;
use moed_stats::{
    CorrelationEngine, HistoricalPattern, PatternPrediction, Season, SeasonalAggregate,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moed", about = "Feast calendar, eclipse and event correlation CLI")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feast dates for one year or an inclusive range of years
    Feasts {
        /// Gregorian year (defaults to the current year)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        year: Option<i32>,
        /// First year of a range
        #[arg(long, requires = "to")]
        from: Option<i32>,
        /// Last year of a range
        #[arg(long, requires = "from")]
        to: Option<i32>,
    },
    /// Feasts starting within a horizon of a date
    Upcoming {
        /// Start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Horizon in days
        #[arg(long, default_value_t = 365)]
        days: u32,
    },
    /// Feast covering a date, if any
    On {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Eclipses, blood-moon tetrads and feast alignments from recorded data
    Tetrads {
        /// JSON array of recorded contact markers
        #[arg(long)]
        contacts: PathBuf,
        /// JSON array of recorded altitude samples
        #[arg(long)]
        altitudes: PathBuf,
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Predictions, correlation matrix and seasonal aggregates from patterns
    Correlate {
        /// JSON array of historical patterns
        #[arg(long)]
        patterns: PathBuf,
        /// Year of the upcoming feasts (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Pearson/Spearman significance of two paired series
    Significance {
        /// JSON object {"a": [...], "b": [...]}
        #[arg(long)]
        input: PathBuf,
    },
    /// Isolation-forest anomaly scores of feature rows
    Anomalies {
        /// JSON array of equal-length numeric rows
        #[arg(long)]
        input: PathBuf,
    },
    /// Temporal matching of disaster events with close approaches
    Match {
        /// JSON array of disaster events
        #[arg(long)]
        disasters: PathBuf,
        /// JSON array of close approaches
        #[arg(long)]
        approaches: PathBuf,
    },
}

#[derive(Deserialize)]
struct SamplePair {
    a: Vec<f64>,
    b: Vec<f64>,
}

#[derive(Serialize)]
struct EclipseReport {
    eclipses: Vec<EclipseEvent>,
    tetrads: Vec<TetradSequence>,
    alignments: Vec<FeastAlignment>,
}

#[derive(Serialize)]
struct CorrelationReport {
    predictions: Vec<PatternPrediction>,
    matrix: BTreeMap<FeastKind, BTreeMap<EventType, f64>>,
    seasons: BTreeMap<Season, SeasonalAggregate>,
}

#[derive(Serialize)]
struct AnomalyReport {
    scores: Vec<f64>,
    anomalies: Vec<bool>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MoedConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => MoedConfig::default(),
    };
    run(cli.command, &config)
}

fn run(command: Commands, config: &MoedConfig) -> Result<()> {
    let calendar = CalendarEngine::arithmetic();

    match command {
        Commands::Feasts { year, from, to } => {
            let (start, end) = match (from, to) {
                (Some(from), Some(to)) => (from, to),
                _ => {
                    let year = year.unwrap_or_else(current_year);
                    (year, year)
                }
            };
            emit(&calendar.feasts_for_range(start, end)?)
        }

        Commands::Upcoming { from, days } => {
            let from = from.unwrap_or_else(|| Utc::now().date_naive());
            emit(&calendar.upcoming_feasts(from, days)?)
        }

        Commands::On { date } => emit(&calendar.feast_on(date)?),

        Commands::Tetrads {
            contacts,
            altitudes,
            from,
            to,
        } => {
            let source: RecordedEclipses = read_json(&contacts)?;
            let altitude: RecordedAltitudes = read_json(&altitudes)?;
            let engine = EclipseEngine::new(source, altitude, config.observer.location()?)
                .with_tetrad_config(config.tetrad)?;
            let report = EclipseReport {
                eclipses: engine.all_eclipses(from, to)?,
                tetrads: engine.blood_moon_tetrads(from, to)?,
                alignments: engine.aligned_eclipses(from, to, &calendar)?,
            };
            info!(
                eclipses = report.eclipses.len(),
                tetrads = report.tetrads.len(),
                "eclipse report"
            );
            emit(&report)
        }

        Commands::Correlate { patterns, year } => {
            let patterns: Vec<HistoricalPattern> = read_json(&patterns)?;
            let year = year.unwrap_or_else(current_year);
            let upcoming: Vec<_> = calendar.feasts_for_year(year)?.into_values().collect();
            let engine = CorrelationEngine::new(config.stats.clone())?;
            emit(&CorrelationReport {
                predictions: engine.predict_future_patterns(&upcoming, &patterns),
                matrix: engine.correlation_matrix(&patterns),
                seasons: engine.seasonal_patterns(&patterns),
            })
        }

        Commands::Significance { input } => {
            let pair: SamplePair = read_json(&input)?;
            let engine = CorrelationEngine::new(config.stats.clone())?;
            emit(&engine.statistical_significance(&pair.a, &pair.b)?)
        }

        Commands::Anomalies { input } => {
            let rows: Vec<Vec<f64>> = read_json(&input)?;
            let engine = CorrelationEngine::new(config.stats.clone())?;
            let scores = engine.anomaly_scores(&rows)?;
            let anomalies = engine.flag_anomalies(&scores);
            emit(&AnomalyReport { scores, anomalies })
        }

        Commands::Match {
            disasters,
            approaches,
        } => {
            let disasters: Vec<DisasterEvent> = read_json(&disasters)?;
            let approaches: Vec<CloseApproach> = read_json(&approaches)?;
            emit(&match_events(&disasters, &approaches, &config.matching)?)
        }
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feasts_range_requires_both_ends() {
        assert!(Cli::try_parse_from(["moed", "feasts", "--from", "2024"]).is_err());
        let both = ["moed", "feasts", "--year", "2024", "--from", "2020", "--to", "2021"];
        assert!(Cli::try_parse_from(both).is_err());
        let cli =
            Cli::try_parse_from(["moed", "feasts", "--from", "2020", "--to", "2021"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Feasts {
                from: Some(2020),
                to: Some(2021),
                ..
            }
        ));
    }

    #[test]
    fn dates_parse_as_iso() {
        let cli = Cli::try_parse_from(["moed", "on", "2025-04-12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::On { date } if date == NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
        ));
        assert!(Cli::try_parse_from(["moed", "on", "12/04/2025"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["moed", "significance", "--input", "s.json", "--config", "m.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("m.toml")));
    }

    #[test]
    fn feasts_command_runs() {
        let command = Commands::Feasts {
            year: Some(2025),
            from: None,
            to: None,
        };
        assert!(run(command, &MoedConfig::default()).is_ok());
    }

    #[test]
    fn inverted_range_is_an_error() {
        let command = Commands::Feasts {
            year: None,
            from: Some(2030),
            to: Some(2020),
        };
        assert!(run(command, &MoedConfig::default()).is_err());
    }
}
