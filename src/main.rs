use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use fonx::cli::analyze::{AnalyzeOptions, OutputFormat};
use fonx::core::analysis::{EscalationKind, EscalationRule, StartDatePreset};
use fonx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Simulate a monthly investment plan for one or more funds
    Analyze(AnalyzeArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum IncreaseType {
    Percentage,
    Amount,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Fund codes, e.g. AFT TTE (at most 5)
    #[arg(required = true, num_args = 1..)]
    codes: Vec<String>,

    /// Window start: 5_years_ago, 3_years_ago, 1_year_ago, year_start,
    /// 6_months_ago, 3_months_ago or 1_month_ago
    #[arg(short, long, default_value = "1_year_ago")]
    start_date: StartDatePreset,

    /// Lump sum invested on the first sampled day
    #[arg(long, default_value_t = 0.0)]
    initial: f64,

    /// Base monthly contribution
    #[arg(long, default_value_t = 1000.0)]
    monthly: f64,

    /// How the monthly contribution grows each year
    #[arg(long, value_enum, default_value = "percentage")]
    increase_type: IncreaseType,

    /// Yearly increase in percent or currency units
    #[arg(long, default_value_t = 0.0)]
    increase_value: f64,

    /// Show the month-by-month breakdown
    #[arg(short, long)]
    details: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl From<AnalyzeArgs> for AnalyzeOptions {
    fn from(args: AnalyzeArgs) -> Self {
        let kind = match args.increase_type {
            IncreaseType::Percentage => EscalationKind::Percentage,
            IncreaseType::Amount => EscalationKind::Amount,
        };
        AnalyzeOptions {
            codes: args.codes,
            start_date: args.start_date,
            initial_investment: args.initial,
            monthly_investment: args.monthly,
            yearly_increase: EscalationRule {
                kind,
                value: args.increase_value,
            },
            include_monthly_details: args.details,
            format: if args.json {
                OutputFormat::Json
            } else {
                OutputFormat::Table
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fonx::cli::setup::setup_at_path(path),
            None => fonx::cli::setup::setup(),
        },
        Some(Commands::Analyze(args)) => {
            let command = fonx::AppCommand::Analyze(args.into());
            fonx::run_command(command, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
