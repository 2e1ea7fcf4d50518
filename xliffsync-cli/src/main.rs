use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xliffsync::TranslationMode;
use xliffsync_cli::format::{run_clear_notes_command, run_format_command, run_import_command};
use xliffsync_cli::refresh::{RefreshOptions, run_refresh_command, run_update_master_command};
use xliffsync_cli::status::{run_locate_command, run_status_command};
use xliffsync_cli::{Workspace, load_settings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace root containing app.json
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Regenerate the .g.xlf master document from the AL sources.
    UpdateMaster {
        /// Print the counters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Synchronize every language file with the master document.
    Refresh {
        /// Only reorder units into master order
        #[arg(long)]
        sort_only: bool,

        /// Peer .xlf file used as the highest-priority suggestion source
        #[arg(long)]
        match_file: Option<PathBuf>,

        /// Folder with <lang>.json reference translations
        #[arg(long)]
        base_app: Option<PathBuf>,

        /// Print the counters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many units in each language file still need attention.
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Find the source line that produces a trans-unit id.
    Locate {
        /// The trans-unit id, e.g. "Table 2328808854 - Property 2879900210"
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Rewrite the language files for a translation mode.
    Format {
        /// tokens, external or managed; defaults to the configured mode
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Import a translated file returned by the managed translation service.
    Import {
        /// The translated .xlf file
        file: PathBuf,

        /// State given to exact matches, e.g. "translated" or "signed-off"
        #[arg(long)]
        exact_match_state: Option<String>,
    },

    /// Remove hint notes from language files without translation tokens.
    ClearNotes,
}

fn init_tracing(verbose: u8, configured: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), String> {
    let settings = load_settings(&args.workspace)?;
    init_tracing(args.verbose, &settings.log_level);
    let ws = Workspace::open(&args.workspace, &settings)?;

    match args.commands {
        Commands::UpdateMaster { json } => run_update_master_command(&ws, &settings, json),
        Commands::Refresh {
            sort_only,
            match_file,
            base_app,
            json,
        } => run_refresh_command(
            &ws,
            &settings,
            &RefreshOptions {
                sort_only,
                match_file,
                base_app,
                json,
            },
        ),
        Commands::Status { json } => run_status_command(&ws, json),
        Commands::Locate { id, json } => run_locate_command(&ws, &id, json),
        Commands::Format { mode } => {
            let mode = match mode {
                Some(mode) => mode.parse::<TranslationMode>().map_err(|e| e.to_string())?,
                None => settings.translation_mode,
            };
            run_format_command(&ws, &settings, mode)
        }
        Commands::Import {
            file,
            exact_match_state,
        } => run_import_command(&ws, &settings, &file, exact_match_state.as_deref()),
        Commands::ClearNotes => run_clear_notes_command(&ws, &settings),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
