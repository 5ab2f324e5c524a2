use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use mailsweep::{DEFAULT_SENDER, DnsOptions, ProbeOptions, RunOptions, ValidationMode};

/// Vérifie en masse la délivrabilité d'adresses e-mail (syntaxe, liste noire,
/// MX, sonde SMTP RCPT TO).
///
/// Heuristique : un domaine catch-all accepte toute adresse, et un serveur qui
/// vérifie l'expéditeur ou pratique le greylisting peut refuser la sonde.
/// Valid/Invalid ne sont donc que des indications.
#[derive(Parser)]
#[command(name = "mailsweep-cli", version)]
pub struct Cli {
    /// fichier d'adresses (une par ligne, `#` pour les commentaires)
    #[arg(long, conflicts_with = "stdin", required_unless_present = "stdin")]
    pub input: Option<String>,

    /// lit des adresses depuis stdin (une par ligne)
    #[arg(long)]
    pub stdin: bool,

    /// fichier de domaines à exclure (un par ligne)
    #[arg(long)]
    pub blacklist: Option<String>,

    /// nombre maximum de vérifications simultanées
    #[arg(long, default_value_t = 20)]
    pub workers: usize,

    /// nombre d'adresses soumises par lot
    #[arg(long = "batch-size", default_value_t = 100)]
    pub batch_size: usize,

    /// timeout DNS et SMTP (ms)
    #[arg(long = "timeout", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// enveloppe MAIL FROM
    #[arg(long = "from", default_value = DEFAULT_SENDER)]
    pub sender: String,

    /// nom annoncé dans HELO
    #[arg(long, default_value = "localhost")]
    pub helo: String,

    /// port SMTP
    #[arg(long, default_value_t = 25)]
    pub port: u16,

    /// mode: strict|relaxed
    #[arg(long, default_value = "strict")]
    pub mode: String,

    /// format: human|csv|json|ndjson
    #[arg(long, default_value = "human")]
    pub format: String,

    /// write report to file (CSV/JSON/NDJSON selon --format)
    #[arg(long)]
    pub out: Option<String>,

    /// trie les résultats par adresse
    #[arg(long)]
    pub sorted: bool,

    /// n'affiche pas la progression
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn parsed_mode(&self) -> Result<ValidationMode> {
        mode_from_str(&self.mode)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn dns_options(&self) -> DnsOptions {
        DnsOptions {
            timeout: self.timeout(),
            ..DnsOptions::default()
        }
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            helo_domain: self.helo.clone(),
            sender: self.sender.clone(),
            port: self.port,
            timeout: self.timeout(),
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            workers: self.workers,
            batch_size: self.batch_size,
        }
    }
}

pub fn mode_from_str(s: &str) -> Result<ValidationMode> {
    match s {
        "strict" => Ok(ValidationMode::Strict),
        "relaxed" => Ok(ValidationMode::Relaxed),
        other => bail!("unknown --mode '{other}', use: strict|relaxed"),
    }
}
