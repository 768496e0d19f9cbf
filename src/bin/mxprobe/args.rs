use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use mxprobe::ProbeOptions;
use mxprobe::probe::{DEFAULT_SENDER, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT};

#[derive(Parser)]
#[command(name = "mxprobe", version, about = "Probe SMTP recipient acceptance without sending mail")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// logs détaillés sur stderr (-v debug, -vv trace); sinon RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// enveloppe MAIL FROM
    #[arg(long = "from", env = "MXPROBE_FROM", default_value = DEFAULT_SENDER)]
    pub sender: String,
    /// timeout par connexion et par commande (s)
    #[arg(
        long = "timeout",
        env = "MXPROBE_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT.as_secs()
    )]
    pub timeout_secs: u64,
    /// port SMTP
    #[arg(long, env = "MXPROBE_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub port: u16,
    /// nom utilisé pour EHLO/HELO (par défaut le domaine de --from)
    #[arg(long, env = "MXPROBE_HELO")]
    pub helo: Option<String>,
}

impl ProbeArgs {
    pub fn to_options(&self) -> ProbeOptions {
        ProbeOptions {
            sender_address: self.sender.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            smtp_port: self.port,
            helo_domain: self.helo.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// teste une adresse (code de sortie 0 acceptée, 2 sinon)
    Verify {
        email: String,
        #[command(flatten)]
        probe: ProbeArgs,
        /// format de sortie (human|json)
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// affiche les serveurs candidats d'un domaine, dans l'ordre d'essai
    Resolve {
        domain: String,
        /// timeout DNS (s)
        #[arg(long = "timeout")]
        timeout_secs: Option<u64>,
    },
    /// traite un fichier d'adresses (une par ligne), reprise automatique
    Batch {
        input: PathBuf,
        /// les adresses acceptées y sont ajoutées au fil de l'eau
        output: PathBuf,
        #[command(flatten)]
        probe: ProbeArgs,
        /// ignore le curseur existant et repart du début
        #[arg(long)]
        restart: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["mxprobe", "verify", "user@example.com"]).expect("parse");
        match cli.cmd {
            Commands::Verify { email, probe, format } => {
                assert_eq!(email, "user@example.com");
                assert_eq!(format, "human");
                assert_eq!(probe.to_options(), ProbeOptions::default());
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn batch_accepts_probe_flags() {
        let cli = Cli::try_parse_from([
            "mxprobe", "-v", "batch", "in.txt", "out.txt", "--from", "probe@example.net",
            "--timeout", "5", "--port", "2525", "--restart",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 1);
        match cli.cmd {
            Commands::Batch {
                input,
                output,
                probe,
                restart,
            } => {
                assert_eq!(input, PathBuf::from("in.txt"));
                assert_eq!(output, PathBuf::from("out.txt"));
                assert!(restart);
                let options = probe.to_options();
                assert_eq!(options.sender_address, "probe@example.net");
                assert_eq!(options.timeout, Duration::from_secs(5));
                assert_eq!(options.smtp_port, 2525);
            }
            _ => panic!("expected batch"),
        }
    }
}
