use anyhow::Result;
use clap::{CommandFactory, Parser};
use duckhunter::output::OutputManager;
use duckhunter::{config, utils, Args, ScanEngine, VERSION};
use log::{error, info, warn};
use std::io;
use std::process;

const BANNER: &str = r#"
    ____             __   __  __            __
   / __ \__  _______/ /__/ / / /_  ______  / /____  _____
  / / / / / / / ___/ //_/ /_/ / / / / __ \/ __/ _ \/ ___/
 / /_/ / /_/ / /__/ ,< / __  / /_/ / / / / /_/  __/ /
/_____/\__,_/\___/_/|_/_/ /_/\__,_/_/ /_/\__/\___/_/

        Subdomain Takeover Checker
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else if args.silent {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if !args.silent {
        println!("{}", BANNER);
        println!("DuckHunter version {} ({}, built {})\n", VERSION, env!("GIT_HASH"), env!("BUILD_TIME"));
    }

    if std::env::args_os().len() == 1 && !args.use_stdin() {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let mut config = config::load_config(args.config_path.as_deref())?;
    config::apply_args(&mut config, &args);
    config::validate_config(&config)?;

    let subdomains = get_subdomains_from_args(&args)?;
    if subdomains.is_empty() {
        error!("No subdomains provided. Use -d <domain>, -l <file>, or pipe subdomains to stdin");
        process::exit(1);
    }

    let engine = ScanEngine::from_config(&config)?;

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding lookups");
            token.cancel();
        }
    });

    let report = engine.run(subdomains).await;

    let output_manager = OutputManager::new(config.output.clone());
    output_manager.print_summary(&report);
    output_manager
        .write_report(&report)
        .map_err(|e| anyhow::anyhow!("Report generation failed: {}", e))?;

    info!("Report written to {}", output_manager.report_path());
    Ok(())
}

fn get_subdomains_from_args(args: &Args) -> Result<Vec<String>> {
    let mut subdomains = Vec::new();

    if let Some(file_path) = &args.list_file {
        let lines = utils::read_subdomain_file(file_path)
            .map_err(|e| anyhow::anyhow!("Error reading subdomain list: {}", e))?;
        subdomains.extend(lines);
    }

    subdomains.extend(utils::normalize_subdomains(&args.domain));

    if args.use_stdin() {
        let lines = utils::read_lines_from(io::stdin().lock())?;
        subdomains.extend(utils::normalize_subdomains(lines));
    }

    Ok(subdomains)
}
