use clap::Parser;
use gitclean::core::checklist;
use gitclean::core::session::BANNER;
use gitclean::core::workspace::create_work_dir;
use gitclean::utils::{logger, validation::Validate};
use gitclean::{
    CleanError, CliConfig, Executor, GitCleanSession, RepoLayout, StdinPrompt, SystemRunner,
    ToolConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.checklist {
        print!("{}", checklist::render_markdown());
        return Ok(());
    }

    println!("{}", BANNER);

    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    let tools = match ToolConfig::load(config.config.as_deref()) {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("❌ Failed to load tool configuration: {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let repo_url = config.repo_url.clone().unwrap_or_default();
    let layout = match RepoLayout::new(&repo_url, &std::env::current_dir()?) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    create_work_dir(&layout)?;
    logger::init_cli_logger(config.verbose, Some(&layout.log_path()))?;

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
        tracing::debug!("Tool config: {:?}", tools);
    }

    let exec = Executor::new(Arc::new(SystemRunner::new()), Arc::new(StdinPrompt::new()));
    let mut session = GitCleanSession::new(layout, tools, exec, config.dry_run, config.bfg.clone());

    let outcome = tokio::select! {
        result = session.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Exiting gitclean due to keyboard interrupt.");
            Err(CleanError::Interrupted)
        }
    };

    session.shutdown().await;

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            match e.severity() {
                gitclean::utils::error::ErrorSeverity::Low => {
                    tracing::info!("{}", e.user_friendly_message());
                }
                _ => {
                    tracing::error!(
                        "❌ gitclean failed: {} (Category: {:?}, Severity: {:?})",
                        e,
                        e.category(),
                        e.severity()
                    );
                    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                    eprintln!("❌ {}", e.user_friendly_message());
                    eprintln!(
                        "Check the log file for details: {}",
                        session.layout().log_path().display()
                    );
                }
            }
            // exit here: a blocked stdin read would otherwise hold the runtime open
            std::process::exit(e.exit_code());
        }
    }
}
