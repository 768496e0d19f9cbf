mod args;
mod batch;
mod output;

use std::io;
use std::time::Duration;

use anyhow::{Result, bail};
use mxprobe::inspect_address;
use mxprobe::mx::resolve_candidates;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Verify {
            email,
            probe,
            format,
        } => {
            let report = inspect_address(&email, &probe.to_options());
            match format.as_str() {
                "human" => print!("{}", output::render_human(&report, cli.verbose > 0)),
                "json" => {
                    #[cfg(feature = "with-serde")]
                    {
                        println!("{}", output::render_json(&report)?);
                    }
                    #[cfg(not(feature = "with-serde"))]
                    {
                        bail!("format=json nécessite la feature 'with-serde'");
                    }
                }
                other => bail!("format inconnu '{other}', utilisez human|json"),
            }
            // codes de sortie : 0 acceptée, 2 non acceptée, 1 fatal
            if !report.is_accepted() {
                std::process::exit(2);
            }
        }
        Commands::Resolve {
            domain,
            timeout_secs,
        } => {
            let candidates = resolve_candidates(&domain, timeout_secs.map(Duration::from_secs));
            if candidates.is_empty() {
                eprintln!("{domain}: no mail server");
                std::process::exit(2);
            }
            for host in &candidates.hosts {
                println!("{host}");
            }
        }
        Commands::Batch {
            input,
            output,
            probe,
            restart,
        } => {
            let options = probe.to_options();
            let addresses = batch::read_addresses(&input)?;
            let cursor = batch::Cursor::for_output(&output);
            let start = if restart { 0 } else { cursor.load()? };
            let summary = batch::run_batch(
                &addresses,
                start,
                &output,
                &cursor,
                |email| mxprobe::verify_address_with_options(email, &options),
                &mut io::stdout().lock(),
            )?;
            eprintln!(
                "checked {} address(es), {} accepted",
                summary.checked, summary.accepted
            );
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
