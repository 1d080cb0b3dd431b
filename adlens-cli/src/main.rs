use std::path::{Path, PathBuf};

use adlens::planner::Planner;
use adlens::{prioritize, Analyst, AnalystConfig, AnalystError, Dataset, HypothesisGenerator};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_QUERY: &str = "Analyze ROAS fluctuations and recommend creative improvements";

#[derive(Parser)]
#[command(name = "adlens", about = "Generate and validate hypotheses about ad performance")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Dataset file: a JSON array of rows or JSON Lines
    #[arg(long, env = "ADLENS_DATA", global = true)]
    data: Option<PathBuf>,

    /// Config file (.json, .yaml or .yml). Defaults apply when omitted.
    #[arg(long, env = "ADLENS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and print the report
    Analyze {
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Print generated hypotheses only
    Hypotheses {
        /// Sort by priority (HIGH first, stable)
        #[arg(long)]
        prioritize: bool,
    },
    /// Print the task plan for a query; needs no dataset
    Plan {
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> adlens::Result<()> {
    match &cli.command {
        Command::Analyze { query } => {
            let config = load_config(cli.config.as_deref())?;
            let dataset = load_dataset(cli.data.as_deref())?;
            let report = Analyst::new(config).run(&resolve_query(query), &dataset);
            print_json(&report, cli.pretty)
        }
        Command::Hypotheses { prioritize: sort } => {
            let config = load_config(cli.config.as_deref())?;
            let dataset = load_dataset(cli.data.as_deref())?;
            let mut hypotheses = HypothesisGenerator::new(&config).generate_hypotheses(&dataset);
            if *sort {
                hypotheses = prioritize(hypotheses);
            }
            print_json(&hypotheses, cli.pretty)
        }
        Command::Plan { query } => {
            let tasks = Planner::parse_query(&resolve_query(query));
            print_json(&Planner::execution_plan(&tasks), cli.pretty)
        }
    }
}

fn resolve_query(words: &[String]) -> String {
    let query = words.join(" ");
    if query.trim().is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        query
    }
}

fn load_config(path: Option<&Path>) -> adlens::Result<AnalystConfig> {
    match path {
        Some(p) => AnalystConfig::load(p),
        None => Ok(AnalystConfig::default()),
    }
}

fn load_dataset(path: Option<&Path>) -> adlens::Result<Dataset> {
    let path = path.ok_or_else(|| {
        AnalystError::Config("--data (or ADLENS_DATA) is required for this command".to_string())
    })?;
    Dataset::from_path(path)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> adlens::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ArgMatches;

    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn parse_cli(args: &[&str]) -> (Cli, ArgMatches) {
        let matches = Cli::command()
            .try_get_matches_from(args)
            .expect("args should parse");
        let cli = Cli::from_arg_matches(&matches).expect("matches should parse into Cli");
        (cli, matches)
    }

    #[test]
    fn analyze_without_query_uses_default() {
        let (cli, _) = parse_cli(&["adlens", "--data", "rows.json", "analyze"]);
        match cli.command {
            Command::Analyze { query } => assert_eq!(resolve_query(&query), DEFAULT_QUERY),
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn query_words_are_joined() {
        let (cli, _) = parse_cli(&["adlens", "plan", "Why", "did", "ROAS", "drop?"]);
        match cli.command {
            Command::Plan { query } => assert_eq!(resolve_query(&query), "Why did ROAS drop?"),
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let (cli, _) = parse_cli(&[
            "adlens",
            "hypotheses",
            "--prioritize",
            "--pretty",
            "--data",
            "d.jsonl",
        ]);
        assert!(cli.pretty);
        assert_eq!(cli.data, Some(PathBuf::from("d.jsonl")));
        assert!(matches!(cli.command, Command::Hypotheses { prioritize: true }));
    }

    #[test]
    fn data_path_falls_back_to_env() {
        let _guard = ENV_MUTEX.lock().expect("lock env mutex");
        std::env::set_var("ADLENS_DATA", "/tmp/from-env.json");
        let (cli, _) = parse_cli(&["adlens", "hypotheses"]);
        std::env::remove_var("ADLENS_DATA");
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/from-env.json")));
    }

    #[test]
    fn missing_data_is_config_error() {
        let err = load_dataset(None).unwrap_err();
        assert!(matches!(err, AnalystError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), AnalystConfig::default());
    }
}
