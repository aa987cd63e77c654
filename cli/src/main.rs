//! Decirank CLI: rank the nodes of an edge list file
//!
//! Prints one `[<id>]\t<rank>` line per node on stdout; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use decirank::{parse_params, rank_file, write_report, OutputFormat, RankConfig};
use std::path::PathBuf;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "decirank", version, about = "Fixed-point PageRank over a plain-text edge list")]
struct Cli {
    /// Edge list file, one `source destination` pair per line
    file: PathBuf,

    /// Damping factor as a plain decimal (e.g. 0.85; exponent forms like 8.5e-1 are rejected)
    #[arg(allow_hyphen_values = true)]
    alpha: String,

    /// Offset added to every node's rank each round, as a plain decimal (no exponent form);
    /// pass (1 - alpha) / N for classical PageRank
    #[arg(allow_hyphen_values = true)]
    beta: String,

    /// YAML configuration file
    #[arg(long, env = "DECIRANK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long)]
    format: Option<CliFormat>,

    /// Compute each round on all cores
    #[arg(long)]
    parallel: bool,

    /// Rounds allowed per node (max rounds = bound * N)
    #[arg(long)]
    iteration_bound: Option<usize>,

    /// Convergence tolerance is 1 / (scale * N)
    #[arg(long)]
    epsilon_scale: Option<u64>,

    /// Reject edge lines with more than two tokens
    #[arg(long)]
    strict: bool,

    /// Skip lines starting with this prefix (e.g. '#'); by default every line is an edge
    #[arg(long)]
    comment_prefix: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Text,
    Csv,
    Json,
    Table,
}

impl From<CliFormat> for OutputFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Text => OutputFormat::Text,
            CliFormat::Csv => OutputFormat::Csv,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Table => OutputFormat::Table,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<RankConfig> {
    let mut config = match &cli.config {
        Some(path) => RankConfig::from_yaml_file(path)?,
        None => RankConfig::default(),
    };

    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if cli.parallel {
        config.engine.parallel = true;
    }
    if let Some(bound) = cli.iteration_bound {
        config.engine.base_iteration_bound = bound;
    }
    if let Some(scale) = cli.epsilon_scale {
        config.engine.epsilon_scale = scale;
    }
    if cli.strict {
        config.parse.strict_tokens = true;
    }
    if let Some(prefix) = &cli.comment_prefix {
        config.parse.comment_prefix = Some(prefix.clone());
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let params = parse_params(&cli.alpha, &cli.beta)?;

    let report = rank_file(&cli.file, params, &config)
        .with_context(|| format!("ranking {}", cli.file.display()))?;

    if !report.converged() {
        warn!(
            "No convergence within {} rounds (max residual {}, epsilon {})",
            report.max_rounds, report.max_residual, report.epsilon
        );
    }

    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), &report, config.format)?;
    Ok(())
}
