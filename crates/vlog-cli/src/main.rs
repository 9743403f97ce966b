//! vlog CLI - digest, verify and project behavior log streams.

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod output;

use commands::{canonicalize, digest, project, verify};

#[derive(Parser)]
#[command(name = "vlog")]
#[command(about = "Verifiable behavior log: digest, verify and project event streams")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Print per-event digests and the stream digest
    Digest {
        /// Stream file (JSON array or JSON Lines)
        stream: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the verification suite over a stream
    Verify {
        /// Stream file (JSON array or JSON Lines)
        stream: String,
        /// Previous version of the stream; checks that `stream` only appends to it
        #[arg(long)]
        prev: Option<String>,
        /// Ordering policy file (JSON); flags below override it
        #[arg(long)]
        policy: Option<String>,
        /// Deterministic field holding the correlation id
        #[arg(long)]
        id_key: Option<String>,
        /// Require an INTENT before the first DECISION of each id
        #[arg(long)]
        require_intent: bool,
        /// Allow a DECISION after an EXECUTION or PROOF for the same id
        #[arg(long)]
        allow_decision_after_execution: bool,
        /// Maximum DECISION events per id (0 = unlimited)
        #[arg(long)]
        max_decisions: Option<u32>,
        /// Skip identity-field checks
        #[arg(long)]
        skip_identity: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the DECISION-only projection as JSON Lines
    Project {
        /// Stream file (JSON array or JSON Lines)
        stream: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::Digest { stream, json } => digest::run(stream, json),
        Commands::Verify {
            stream,
            prev,
            policy,
            id_key,
            require_intent,
            allow_decision_after_execution,
            max_decisions,
            skip_identity,
            json,
        } => verify::run(verify::VerifyArgs {
            stream,
            prev,
            policy,
            id_key,
            require_intent,
            allow_decision_after_execution,
            max_decisions,
            skip_identity,
            json,
        }),
        Commands::Project { stream } => project::run(stream),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
