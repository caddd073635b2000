use bsm_portfolio::config::{Command, PortfolioArgs};
use bsm_portfolio::core::ignore_policy::{check_line, IgnorePolicy};
use bsm_portfolio::core::loader::load_loan_book;
use bsm_portfolio::core::months::available_months;
use bsm_portfolio::core::navigation::{PortfolioView, Session};
use bsm_portfolio::core::render::{render_home, render_months, render_overview, render_report};
use bsm_portfolio::utils::error::{DashError, ErrorSeverity};
use bsm_portfolio::utils::{logger, validation::Validate};
use bsm_portfolio::{
    CliConfig, DashboardConfig, LocalStorage, PortfolioPipeline, ReportEngine, ReportOverrides,
    ReportSettings, Result,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let config = DashboardConfig::from_file(path)?;
            config.validate()?;
            Some(config)
        }
        None => None,
    };

    match cli.command {
        Command::Home => print!("{}", render_home()),
        Command::Open { section, args } => {
            let section = section.open()?;
            tracing::info!("Opening section: {}", section);
            portfolio(&args, file_config.as_ref()).await?;
        }
        Command::Portfolio(args) => portfolio(&args, file_config.as_ref()).await?,
        Command::Months { data } => {
            let overrides = ReportOverrides {
                data,
                ..Default::default()
            };
            let settings = ReportSettings::resolve(&overrides, file_config.as_ref())?;
            settings.validate()?;

            let storage = LocalStorage::new(".");
            let book = load_loan_book(&storage, &settings.data_path).await?;
            print!("{}", render_months(&available_months(&book.records)));
        }
        Command::CheckIgnore {
            policy,
            show_rule,
            non_matching,
            dir,
            paths,
        } => {
            let policy_path = policy.or_else(|| {
                file_config
                    .as_ref()
                    .and_then(|c| c.policy_file())
                    .map(str::to_string)
            });
            check_ignore(policy_path.as_deref(), show_rule, non_matching, dir, &paths)?;
        }
    }

    Ok(())
}

async fn portfolio(args: &PortfolioArgs, file_config: Option<&DashboardConfig>) -> Result<()> {
    let mut session = Session::new();
    if let Some(view) = args.view {
        session.set_view(view);
    }

    match session.view() {
        PortfolioView::Main => print!("{}", render_overview()),
        PortfolioView::TotalBook => {
            let settings = ReportSettings::resolve(&ReportOverrides::from(args), file_config)?;
            settings.validate()?;

            // 創建存儲和管道
            let storage = LocalStorage::new(".");
            let pipeline = PortfolioPipeline::new(storage, settings);
            let engine = ReportEngine::new(pipeline);

            let outcome = engine.run().await?;
            print!("{}", render_report(&outcome.report));
            if let Some(path) = outcome.output {
                println!("📁 Output saved to: {}", path);
            }
        }
    }

    Ok(())
}

fn check_ignore(
    policy_path: Option<&str>,
    show_rule: bool,
    non_matching: bool,
    is_dir: bool,
    paths: &[String],
) -> Result<()> {
    let (policy, source) = match policy_path {
        Some(path) => (IgnorePolicy::from_file(path)?, path.to_string()),
        None => (IgnorePolicy::default(), "<default>".to_string()),
    };
    tracing::debug!("Loaded {} ignore rules from {}", policy.rules().len(), source);

    for path in paths {
        if path.is_empty() {
            return Err(DashError::SelectionError {
                message: "empty path given to check-ignore".to_string(),
            });
        }

        let matched = policy.matched(path, is_dir);
        if let Some(line) = check_line(&source, &matched, path, show_rule, non_matching) {
            println!("{}", line);
        }
    }

    Ok(())
}
