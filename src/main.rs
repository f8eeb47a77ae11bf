// Only compile the preview module when the TUI feature is enabled
#[cfg(feature = "tui")]
mod preview;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use statement_report::config::{DEFAULT_BASE_URL, DEFAULT_SCALE, DEFAULT_TICKER, DEFAULT_TIMEOUT_SECS, DEFAULT_YEARS};
use statement_report::reshape::{reshape, ReshapeOptions};
use statement_report::{
    generate_report, FmpClient, JsonDirSource, ProviderConfig, ReportConfig, RuleBook, StatementKind,
    StatementSource,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Build a sectioned, styled workbook from a company's annual statements
#[derive(Parser)]
#[command(name = "statement-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Company ticker (shown in sheet titles)
    #[arg(short, long, default_value = DEFAULT_TICKER)]
    ticker: String,

    /// Annual periods to include
    #[arg(short, long, default_value_t = DEFAULT_YEARS)]
    years: usize,

    /// Divide every figure by this (1000 = $000s)
    #[arg(short, long, default_value_t = DEFAULT_SCALE)]
    scale: u64,

    /// Read <endpoint>.json files from this directory instead of the provider
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Provider API key
    #[arg(long, env = "FMP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// JSON rules file replacing the built-in keyword rules
    #[arg(short, long)]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all three statements and write the workbook
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output path (default: <TICKER>_Financials_Styled.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print how each line item of one statement is classified (CSV)
    Classify {
        /// income | balance-sheet | cash-flow
        statement: StatementKind,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Browse the rendered sheets in the terminal without writing a file
    Preview {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Build { source, output } => run_build(&source, output),
        Commands::Classify { statement, source } => run_classify(statement, &source),
        Commands::Preview { source } => run_preview_mode(&source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

impl SourceArgs {
    fn report_config(&self) -> ReportConfig {
        ReportConfig::new(&self.ticker)
            .with_years(self.years)
            .with_scale(self.scale)
    }

    fn rule_book(&self) -> Result<RuleBook> {
        match &self.rules {
            Some(path) => RuleBook::from_file(path)
                .with_context(|| format!("loading rules from {}", path.display())),
            None => Ok(RuleBook::builtin()),
        }
    }

    fn open_source(&self, config: &ReportConfig) -> Result<Box<dyn StatementSource>> {
        if let Some(dir) = &self.input_dir {
            debug!("Using offline records from {}", dir.display());
            return Ok(Box::new(JsonDirSource::new(dir)));
        }

        let mut provider = ProviderConfig::new(self.api_key.as_deref().unwrap_or_default());
        provider.base_url = self.base_url.clone();
        provider.timeout = Duration::from_secs(self.timeout_secs);
        debug!("{:?}", provider);

        let client = FmpClient::new(&provider, config).context("configuring provider client")?;
        Ok(Box::new(client))
    }
}

fn run_build(args: &SourceArgs, output: Option<PathBuf>) -> Result<()> {
    let mut config = args.report_config();
    if let Some(output) = output {
        config = config.with_output(output);
    }
    let rules = args.rule_book()?;
    let source = args.open_source(&config)?;

    let report = generate_report(source.as_ref(), &config, &rules)
        .with_context(|| format!("building report for {}", config.ticker))?;

    println!("Wrote {}.", report.output.display());
    print!("{}", report.summary());
    Ok(())
}

#[derive(Serialize)]
struct ClassifiedLine<'a> {
    section: &'a str,
    rule_keyword: &'a str,
    label: &'a str,
}

fn run_classify(kind: StatementKind, args: &SourceArgs) -> Result<()> {
    let config = args.report_config();
    config.validate()?;
    let rules = args.rule_book()?;
    let source = args.open_source(&config)?;

    let records = source
        .fetch(kind)
        .with_context(|| format!("fetching {}", kind))?;
    let options = ReshapeOptions::new(config.scale).with_max_periods(config.years);
    let table = reshape(&records, &options).with_context(|| format!("reshaping {}", kind))?;

    let rule_set = rules.get(kind);
    let mut writer = csv::Writer::from_writer(io::stdout());
    let mut matched = 0;
    for label in table.labels() {
        let line = match rule_set.match_label(label) {
            Some(m) => {
                matched += 1;
                ClassifiedLine {
                    section: m.section,
                    rule_keyword: m.keyword,
                    label,
                }
            }
            None => ClassifiedLine {
                section: rule_set.other_label(),
                rule_keyword: "",
                label,
            },
        };
        writer.serialize(line)?;
    }
    writer.flush()?;

    info!("{}: {} of {} line items matched a rule", kind, matched, table.len());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_preview_mode(args: &SourceArgs) -> Result<()> {
    let config = args.report_config();
    let rules = args.rule_book()?;
    let source = args.open_source(&config)?;

    let (sheets, _) = statement_report::assemble_report(source.as_ref(), &config, &rules)
        .with_context(|| format!("building report for {}", config.ticker))?;

    let mut app = preview::App::new(sheets);
    preview::run_preview(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_preview_mode(_args: &SourceArgs) -> Result<()> {
    anyhow::bail!("preview is not available in this build (rebuild with --features tui)")
}
