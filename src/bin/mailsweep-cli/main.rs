mod args;
mod output;

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use mailsweep::{
    Blacklist, CancelToken, NoProgress, Pipeline, PipelineConfig, ProgressObserver, Scheduler,
    SmtpProber, SystemResolver, read_list,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Cli;
use crate::output::{ProgressLine, write_report};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_addresses(cli: &Cli) -> Result<Vec<String>> {
    match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("open {path}"))?;
            read_list(BufReader::new(file)).with_context(|| format!("read {path}"))
        }
        None => read_list(io::stdin().lock()).context("read stdin"),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mode = cli.parsed_mode()?;

    let addresses = read_addresses(&cli)?;
    let blacklist = match &cli.blacklist {
        Some(path) => Blacklist::load(path)?,
        None => Blacklist::default(),
    };
    info!(
        addresses = addresses.len(),
        blacklisted_domains = blacklist.len(),
        "inputs loaded"
    );

    let resolver = SystemResolver::from_system_conf(&cli.dns_options())?;
    let prober = SmtpProber::new(cli.probe_options());
    let pipeline = Pipeline::new(
        PipelineConfig {
            validation_mode: mode,
        },
        blacklist,
        resolver,
        prober,
    );
    let scheduler = Scheduler::new(pipeline, cli.run_options())?;

    let progress = ProgressLine::new();
    let observer: &dyn ProgressObserver = if cli.quiet { &NoProgress } else { &progress };
    let mut report = scheduler.run(&addresses, observer, &CancelToken::new());
    progress.finish();

    if cli.sorted {
        report = report.into_sorted();
    }
    write_report(&report, &cli)?;

    // codes de sortie : 0 OK, 2 adresses rejetées, 1 fatal
    if report.has_rejections() {
        std::process::exit(2);
    }
    Ok(())
}
