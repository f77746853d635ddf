mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tenex_feed::tracing_setup::init_tracing;
use tenex_feed::FeedConfig;

#[derive(Parser)]
#[command(name = "tenex-feed")]
#[command(about = "Thread lists and activity feeds for TENEX projects")]
struct Cli {
    /// Path to JSON config file (relays, credentials, upload and list tuning)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List threads in a project
    Threads {
        /// Project coordinate (31933:<pubkey>:<d>)
        project: String,
        /// Time filter: 1h, 4h, 1d, needs-response-1h, needs-response-4h, needs-response-1d
        #[arg(long, short)]
        filter: Option<String>,
        /// Whose replies count as "mine" (defaults to the configured key)
        #[arg(long)]
        pubkey: Option<String>,
        /// First row to show
        #[arg(long, default_value_t = 0)]
        scroll: u64,
        /// Rows that fit on screen
        #[arg(long, default_value_t = 20)]
        rows: u64,
        /// Keep running and reprint the list as events arrive
        #[arg(long)]
        follow: bool,
    },

    /// Show a project's activity feed, newest first
    Feed {
        /// Project coordinate (31933:<pubkey>:<d>)
        project: String,
        /// Only the latest event per conversation
        #[arg(long)]
        group: bool,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Upload files to the configured Blossom server
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage agent voice assignments
    Voice {
        #[command(subcommand)]
        action: VoiceAction,
    },
}

#[derive(Subcommand)]
enum VoiceAction {
    /// Show which voice an agent gets
    Assign { pubkey: String, name: String },
    /// Show stored voice settings
    List,
    /// Replace the voice pool used for hash-based assignment
    SetVoices {
        #[arg(required = true)]
        voices: Vec<String>,
    },
    /// Pin a voice to an agent
    Override { pubkey: String, voice: String },
    /// Remove an agent's pinned voice
    ClearOverride { pubkey: String },
    /// Assign a voice to agents whose name contains a pattern
    Rule { pattern: String, voice: String },
}

#[tokio::main]
async fn main() {
    // stderr only, so --json output stays machine-readable
    init_tracing();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Threads {
            project,
            filter,
            pubkey,
            scroll,
            rows,
            follow,
        } => {
            let args = commands::ThreadsArgs {
                project,
                filter,
                pubkey,
                scroll,
                rows,
                follow,
            };
            commands::threads(&config, args, cli.json).await
        }
        Commands::Feed {
            project,
            group,
            limit,
        } => commands::feed(&config, &project, group, limit, cli.json).await,
        Commands::Upload { files } => commands::upload(&config, files, cli.json).await,
        Commands::Voice { action } => {
            let action = match action {
                VoiceAction::Assign { pubkey, name } => commands::VoiceCommand::Assign { pubkey, name },
                VoiceAction::List => commands::VoiceCommand::List,
                VoiceAction::SetVoices { voices } => commands::VoiceCommand::SetVoices { voices },
                VoiceAction::Override { pubkey, voice } => {
                    commands::VoiceCommand::Override { pubkey, voice }
                }
                VoiceAction::ClearOverride { pubkey } => {
                    commands::VoiceCommand::ClearOverride { pubkey }
                }
                VoiceAction::Rule { pattern, voice } => commands::VoiceCommand::Rule { pattern, voice },
            };
            commands::voice(&config, action, cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FeedConfig> {
    match cli.config.as_deref() {
        Some(path) => FeedConfig::load(path),
        None => Ok(FeedConfig::default()),
    }
}
