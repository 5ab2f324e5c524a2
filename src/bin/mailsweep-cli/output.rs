#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::args::Cli;
use mailsweep::{Progress, ProgressObserver, RunReport, Status};

/// Progress line on stderr, redrawn at most once per percent.
pub struct ProgressLine {
    last_percent: AtomicUsize,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self {
            last_percent: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn finish(&self) {
        if self.last_percent.load(Ordering::Relaxed) != usize::MAX {
            eprintln!();
        }
    }
}

impl Default for ProgressLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressLine {
    fn on_progress(&self, progress: Progress) {
        let percent = (progress.fraction() * 100.0) as usize;
        if self.last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }
        let mut err = std::io::stderr().lock();
        // affichage seulement
        let _ = write!(
            err,
            "\r[{}/{}] {percent:>3}%",
            progress.completed, progress.total
        );
        let _ = err.flush();
    }
}

pub fn write_report(report: &RunReport, cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(report, cli),
        "csv" => write_csv(report, cli),
        "json" => write_json(report, cli),
        "ndjson" => write_ndjson(report, cli),
        other => bail!("unknown --format '{other}', use: human|csv|json|ndjson"),
    }
}

fn human_tag(status: Status) -> &'static str {
    match status {
        Status::Valid => "[VALID]",
        Status::Invalid => "[INVALID]",
        Status::Greylisted => "[GREYLISTED]",
        Status::Blacklisted => "[BLACKLISTED]",
    }
}

fn write_human(report: &RunReport, cli: &Cli) -> Result<()> {
    if cli.out.is_some() {
        bail!("--out nécessite --format csv|json|ndjson");
    }
    for row in &report.results {
        println!("{} {} :: {}", human_tag(row.status), row.address, row.detail);
    }
    for address in &report.unsubmitted {
        println!("[SKIPPED] {address}");
    }
    println!("{}", report.summary());
    Ok(())
}

#[cfg(feature = "with-csv")]
fn write_csv(report: &RunReport, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let data = report.to_csv_bytes()?;
        write_all_atomically(path, &data)?;
    } else {
        report.write_csv(std::io::stdout().lock())?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &RunReport, _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-serde")]
fn write_json(report: &RunReport, cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(report)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &RunReport, _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(report: &RunReport, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in &report.results {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in &report.results {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &RunReport, _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
