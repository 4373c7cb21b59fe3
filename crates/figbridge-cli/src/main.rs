//! figbridge: tagging collector and host/UI bridge tooling.

use std::path::PathBuf;

use figbridge_cli::{run_session, CliHost};
use figbridge_collect::{decode_launch_url, decode_payload_param, run, DocumentSnapshot, RunOutcome};
use figbridge_core::FigBridgeConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("figbridge: tagging collector and host/UI bridge tooling");
    println!();
    println!("Usage: figbridge <command>");
    println!();
    println!("Commands:");
    println!("  collect <snapshot.json> [--open]   Collect tagging frames and print the launch URL");
    println!("  decode <url-or-base64>             Print the payload carried by a launch URL");
    println!("  bridge                             Run an in-process bridge session");
    println!("  help                               Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = FigBridgeConfig::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("collect") => {
            let Some(path) = args.get(2).map(PathBuf::from) else {
                eprintln!("Usage: figbridge collect <snapshot.json> [--open]");
                std::process::exit(1);
            };
            let open = args.iter().skip(3).any(|a| a == "--open");

            let doc = DocumentSnapshot::load(&path)?;
            info!("Loaded document {:?} from {}", doc.name, path.display());

            let host = CliHost::new(open);
            match run(&doc, &host, &config.collector).await {
                RunOutcome::Sent(report) => println!("{}", report.url),
                RunOutcome::Failed(message) => {
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
            }
        }
        Some("decode") => {
            let Some(input) = args.get(2) else {
                eprintln!("Usage: figbridge decode <url-or-base64>");
                std::process::exit(1);
            };
            let decoded = if input.contains('#') {
                decode_launch_url(input)?
            } else {
                decode_payload_param(input)?
            };
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Some("bridge") => {
            let report = run_session(&config.bridge, "figbridge session").await?;
            for hop in &report.hops {
                println!("{}", hop);
            }
            for created in &report.rectangles {
                println!(
                    "rectangle {} created ({}x{})",
                    created.id, created.width, created.height
                );
            }
            println!("rejected: {}", report.rejected.len());
        }
        Some("help") | Some("--help") | Some("-h") | None => print_help(),
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'figbridge help' for usage.", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
