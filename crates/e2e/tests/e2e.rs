//! Acceptance harness entry point
//!
//! Runs the built-in scenarios against the configured application.
//! Run with: cargo test --package hrm-e2e --test e2e -- --tag smoke

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use hrm_common::HarnessConfig;
use hrm_e2e::catalog;
use hrm_e2e::{DriverKind, E2eResult, Tag, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "hrm-e2e")]
#[command(about = "Acceptance runner for OrangeHRM")]
struct Args {
    /// Path to harness config
    #[arg(short, long, default_value = "hrm-e2e.toml")]
    config: PathBuf,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Browser backend (sim, playwright)
    #[arg(long, default_value = "sim")]
    driver: String,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Scenarios run concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let filter = match "info".parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // libtest flags land here when invoked through cargo test
    let args = Args::parse_from(std::env::args().filter(|a| !is_libtest_flag(a)));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn is_libtest_flag(arg: &str) -> bool {
    matches!(arg, "--nocapture" | "--show-output" | "--quiet" | "--ignored" | "--include-ignored")
        || arg.starts_with("--test-threads")
        || arg.starts_with("--format")
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let mut config = HarnessConfig::load(&args.config)?;
    if let Some(browser) = args.browser {
        config.browser = browser;
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(output) = args.output {
        config.artifacts_dir = output;
    }
    config.validate()?;

    let tag = args.tag.as_deref().map(str::parse::<Tag>).transpose()?;
    let scenarios = catalog::select(tag, args.name.as_deref());
    if scenarios.is_empty() {
        eprintln!("No scenarios match the given filters");
        return Ok(false);
    }

    let kind: DriverKind = args.driver.parse()?;
    let runner = TestRunner::with_driver(kind, Arc::new(config)).await?;

    let results = runner.run(scenarios).await;
    runner.write_results(&results)?;

    Ok(results.success())
}
