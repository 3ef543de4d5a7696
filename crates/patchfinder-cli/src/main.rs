use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::Term;
use patchfinder_core::{
    CaptureTransport, Credentials, DeviceTarget, PollConfig, Poller, SshTransport, SwitchReport,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod credentials;
mod exporter;
mod render;
mod server;
mod viewer;
#[cfg(test)]
mod credentials_tests;
#[cfg(test)]
mod server_tests;

#[derive(Debug, Parser)]
#[command(name = "patchfinder")]
#[command(about = "Find unused Cisco switchports, ranked by traffic")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, default_value_t = 22)]
    port: u16,

    #[arg(long, global = true, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    #[arg(long, global = true, default_value_t = 30_000)]
    command_timeout_ms: u64,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll one or more switches over SSH. Prompts for hosts when none are given.
    Poll {
        hosts: Vec<String>,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Run the report over command output captured from a switch.
    Replay {
        #[arg(long)]
        capture_dir: PathBuf,
        #[arg(long, default_value = "replay")]
        host: String,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Interactive table view of one switch.
    View {
        host: String,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Serve the report over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
        #[arg(long, default_value = "http://localhost:5173")]
        allowed_origin: String,
        /// Bearer token required on API calls; falls back to PF_API_TOKEN.
        #[arg(long)]
        api_token: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Ndjson,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = PollConfig {
        ssh_port: cli.port,
        connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
        command_timeout: Duration::from_millis(cli.command_timeout_ms),
    };

    let term = Term::stdout();

    match cli.command {
        Command::Poll {
            hosts,
            username,
            password,
            format,
            export_dir,
        } => {
            let interactive = hosts.is_empty();
            let targets = if interactive {
                let hosts = credentials::prompt_hosts(&term)?;
                credentials::prompt_targets(&term, hosts)?
            } else {
                let credentials = credentials::resolve(&term, username, password)?;
                info!(username = %credentials.username, "using credentials");
                hosts
                    .into_iter()
                    .map(|host| DeviceTarget::new(host, credentials.clone()))
                    .collect()
            };

            let mut poller = Poller::new(SshTransport::new(&config));
            for target in &targets {
                if interactive {
                    credentials::wait_for_enter(&term, &target.host)?;
                }
                match poller.poll(target).await {
                    Ok(report) => {
                        print_report(&report, format)?;
                        let export_to = match &export_dir {
                            Some(dir) => Some(dir.clone()),
                            None if interactive => credentials::confirm(
                                &term,
                                &format!(
                                    "Would you like to export a text file summary for {}?",
                                    report.hostname
                                ),
                            )?
                            .then(|| PathBuf::from(".")),
                            None => None,
                        };
                        if let Some(dir) = export_to {
                            export(&report, &dir)?;
                        }
                    }
                    Err(err) => eprintln!("{}", render::failure_line(&target.host, &err)),
                }
            }
        }
        Command::Replay {
            capture_dir,
            host,
            format,
            export_dir,
        } => {
            let mut poller = Poller::new(CaptureTransport::new(capture_dir));
            let target = DeviceTarget::new(host, Credentials::new("", ""));
            let report = poller.poll(&target).await?;
            print_report(&report, format)?;
            if let Some(dir) = export_dir {
                export(&report, &dir)?;
            }
        }
        Command::View {
            host,
            username,
            password,
        } => {
            let credentials = credentials::resolve(&term, username, password)?;
            let mut poller = Poller::new(SshTransport::new(&config));
            viewer::run_viewer(&mut poller, &DeviceTarget::new(host, credentials)).await?;
        }
        Command::Serve {
            bind,
            allowed_origin,
            api_token,
        } => {
            let server_config = server::ServerConfig {
                bind,
                allowed_origin,
                api_token: api_token.or_else(|| std::env::var("PF_API_TOKEN").ok()),
            };
            server::serve(server_config, move || SshTransport::new(&config)).await?;
        }
    }

    Ok(())
}

fn export(report: &SwitchReport, dir: &Path) -> Result<()> {
    let path = exporter::export_report(report, dir)?;
    println!("[+] Summary exported to {}", path.display());
    Ok(())
}

fn print_report(report: &SwitchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Ndjson => {
            println!("{}", serde_json::to_string(report)?);
        }
        OutputFormat::Human => {
            for notice in &report.notices {
                warn!(host = %report.host, ?notice, "report notice");
            }
            println!("{}", render::render_report(report, true));
        }
    }

    Ok(())
}
