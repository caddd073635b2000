pub mod cli;
pub mod settings;
pub mod toml_config;

pub use settings::{ReportOverrides, ReportSettings};
pub use toml_config::DashboardConfig;

#[cfg(feature = "cli")]
use crate::core::navigation::{PortfolioView, Section};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bsm")]
#[command(about = "BSM loan portfolio dashboard")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the dashboard home page
    Home,
    /// Open a dashboard section
    Open {
        section: Section,
        #[command(flatten)]
        args: PortfolioArgs,
    },
    /// Portfolio Management section
    Portfolio(PortfolioArgs),
    /// List the reporting months in a data file
    Months {
        #[arg(long)]
        data: Option<String>,
    },
    /// Check paths against the repository ignore policy
    CheckIgnore {
        #[arg(long, help = "Policy file (defaults to the built-in policy)")]
        policy: Option<String>,
        #[arg(short = 'r', long, help = "Show the matching rule")]
        show_rule: bool,
        #[arg(short = 'n', long, help = "Also list paths no rule matched")]
        non_matching: bool,
        #[arg(long, help = "Treat every path as a directory")]
        dir: bool,
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct PortfolioArgs {
    #[arg(long, help = "main or total-book")]
    pub view: Option<PortfolioView>,

    #[arg(long, help = "Loan data file (.csv or .parquet)")]
    pub data: Option<String>,

    #[arg(long, help = "Reporting month, YYYY-MM")]
    pub month: Option<String>,

    #[arg(long = "franchise")]
    pub franchises: Vec<String>,

    #[arg(long = "sector")]
    pub sectors: Vec<String>,

    #[arg(long = "rating")]
    pub ratings: Vec<String>,

    #[arg(long = "product")]
    pub products: Vec<String>,

    #[arg(long)]
    pub min_balance: Option<i64>,

    #[arg(long)]
    pub max_balance: Option<i64>,

    #[arg(long, help = "Output directory for exports")]
    pub output: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Export formats: csv, tsv, json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle exports into a ZIP archive")]
    pub zip: bool,
}

#[cfg(feature = "cli")]
impl From<&PortfolioArgs> for ReportOverrides {
    fn from(args: &PortfolioArgs) -> Self {
        Self {
            data: args.data.clone(),
            month: args.month.clone(),
            franchises: args.franchises.clone(),
            sectors: args.sectors.clone(),
            ratings: args.ratings.clone(),
            products: args.products.clone(),
            min_balance: args.min_balance,
            max_balance: args.max_balance,
            output: args.output.clone(),
            formats: args.formats.clone(),
            zip: args.zip,
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portfolio_command() {
        let cli = CliConfig::try_parse_from([
            "bsm",
            "-v",
            "portfolio",
            "--view",
            "total-book",
            "--franchise",
            "Corporate",
            "--franchise",
            "SME",
            "--formats",
            "csv,json",
            "--zip",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Portfolio(args) => {
                assert_eq!(args.view, Some(PortfolioView::TotalBook));
                let overrides = ReportOverrides::from(&args);
                assert_eq!(overrides.franchises, vec!["Corporate", "SME"]);
                assert_eq!(overrides.formats, vec!["csv", "json"]);
                assert!(overrides.zip);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_open_and_check_ignore() {
        let cli = CliConfig::try_parse_from(["bsm", "open", "portfolio-management"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Open {
                section: Section::PortfolioManagement,
                ..
            }
        ));

        let cli =
            CliConfig::try_parse_from(["bsm", "check-ignore", "-r", "--dir", "venv"]).unwrap();
        match cli.command {
            Command::CheckIgnore {
                show_rule,
                dir,
                paths,
                ..
            } => {
                assert!(show_rule);
                assert!(dir);
                assert_eq!(paths, vec!["venv"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(CliConfig::try_parse_from(["bsm", "open", "treasury"]).is_err());
    }
}
