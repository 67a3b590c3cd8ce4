//! Veracode MCP tool host CLI
//!
//! Drives the built-in tool set without a protocol transport: list the
//! tools, inspect credential resolution, or invoke a single handler.
//!
//! # Usage
//!
//! ```bash
//! veracode-mcp tools
//! veracode-mcp credentials
//! veracode-mcp call api-health
//! veracode-mcp call pipeline-static-scan --params '{"application_path": "/work/app"}'
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `veracode_mcp=info`)
//! - `VERACODE_API_ID`, `VERACODE_API_KEY`, `VERACODE_API_BASE_URL`:
//!   credentials used when `~/.veracode/veracode.yml` does not supply them
//!
//! Results go to stdout, logs go to stderr.

use clap::{Parser, Subcommand};
use serde_json::Value;
use veracode_credentials::{ConfigFileStatus, CredentialResolver};
use veracode_mcp::bootstrap;
use veracode_tools::{Collaborators, RequestContext};

/// Tool host for the Veracode MCP server
#[derive(Parser)]
#[command(name = "veracode-mcp")]
#[command(about = "Tool host for the Veracode MCP server")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered tools and their handlers
    Tools,

    /// Show how credentials resolve (the secret is never printed)
    Credentials,

    /// Invoke one handler and print its payload
    Call {
        /// Handler name, e.g. `api-health`
        handler: String,

        /// Handler parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout carries command output)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("veracode_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Tools => list_tools()?,
        Command::Credentials => show_credentials()?,
        Command::Call { handler, params } => call_handler(&handler, &params)?,
    }

    Ok(())
}

fn list_tools() -> veracode_mcp::Result<()> {
    let mut host = bootstrap(&Collaborators::detached())?;

    for summary in host.summaries() {
        println!("{:<24} {}", summary.name, summary.description);
        for handler in &summary.handlers {
            println!("  - {handler}");
        }
    }

    for failure in host.failures() {
        println!("{:<24} failed: {}", failure.tool, failure.reason);
    }

    host.shutdown_all()
}

fn show_credentials() -> veracode_mcp::Result<()> {
    let resolver = CredentialResolver::new();

    match resolver.config_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no home directory)"),
    }

    let status = match resolver.config_file_status() {
        ConfigFileStatus::Absent => "absent".to_string(),
        ConfigFileStatus::Unreadable { reason } => format!("unreadable ({reason})"),
        ConfigFileStatus::Malformed { reason } => format!("malformed ({reason})"),
        ConfigFileStatus::Incomplete => "incomplete (key-id or key-secret empty)".to_string(),
        ConfigFileStatus::Usable => "usable".to_string(),
    };
    println!("Config status: {status}");

    let credentials = resolver.resolve()?;
    println!("Source: {}", credentials.source());
    println!("API id: {}", credentials.api_id());
    println!("Base URL: {}", credentials.base_url());
    Ok(())
}

fn call_handler(handler: &str, params: &str) -> veracode_mcp::Result<()> {
    let params: Value = serde_json::from_str(params)?;
    let mut host = bootstrap(&Collaborators::detached())?;

    let result = host.call_json(&RequestContext::new(), handler, params);
    let shutdown = host.shutdown_all();

    let payload = result?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    shutdown
}
