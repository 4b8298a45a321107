use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use promptvc::cli::{checkout, commit, diff, display, list, log, status, tag};
use promptvc::config::Config;
use promptvc::logging::init_logging;
use promptvc::store::PromptStore;
use promptvc::StoreError;

#[derive(Parser)]
#[command(name = "promptvc", version)]
#[command(about = "Version control for LLM prompts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<String>,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new version of a prompt from a file
    Commit {
        /// Prompt name
        prompt: String,
        /// File holding the prompt text
        file: PathBuf,
        /// Short description of this version
        #[arg(short, long)]
        message: String,
        /// Target LLM model (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Comma-separated labels, e.g. 'prod,stable'
        #[arg(long)]
        tags: Option<String>,
    },

    /// Show commit history for a prompt
    Log {
        /// Prompt name
        prompt: String,
        /// Maximum number of commits to display
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print commits as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two versions of a prompt
    Diff {
        /// Prompt name
        prompt: String,
        /// Old version (full or partial hash, at least 4 chars)
        hash_a: String,
        /// New version (full or partial hash, at least 4 chars)
        hash_b: String,
        /// Lines of context around each change
        #[arg(short, long)]
        context: Option<usize>,
    },

    /// Restore a prompt version to a file
    Checkout {
        /// Prompt name
        prompt: String,
        /// Version to restore (full or partial hash)
        hash: String,
        /// Destination file (defaults to <prompt>.txt in the configured directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the latest version of a prompt
    Status {
        /// Prompt name
        prompt: String,
        /// Print the commit as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all tracked prompts
    Ls,

    /// Attach a label to a commit
    Tag {
        /// Prompt name
        prompt: String,
        /// Version to label (full or partial hash)
        hash: String,
        /// Tag label (asked for interactively if omitted)
        #[arg(short, long)]
        label: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", display::error_line(&format!("{:#}", err)));
            let code = err
                .downcast_ref::<StoreError>()
                .map_or(1, StoreError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load(cli.config.as_deref())?;

    // Initialize store
    let db_path = cli.db.unwrap_or_else(|| config.database_path());
    debug!(path = %db_path.display(), "opening prompt store");
    let store = PromptStore::open(&db_path)?;

    match cli.command {
        Commands::Commit {
            prompt,
            file,
            message,
            model,
            tags,
        } => {
            commit::run(
                &store,
                &config,
                &prompt,
                &file,
                &message,
                model.as_deref(),
                tags.as_deref(),
            )?;
        }
        Commands::Log {
            prompt,
            limit,
            json,
        } => {
            log::run(
                &store,
                &prompt,
                limit.unwrap_or(config.defaults.log_limit),
                json,
            )?;
        }
        Commands::Diff {
            prompt,
            hash_a,
            hash_b,
            context,
        } => {
            diff::run(
                &store,
                &prompt,
                &hash_a,
                &hash_b,
                context.unwrap_or(config.defaults.diff_context),
            )?;
        }
        Commands::Checkout {
            prompt,
            hash,
            output,
        } => {
            checkout::run(&store, &config, &prompt, &hash, output.as_deref())?;
        }
        Commands::Status { prompt, json } => {
            status::run(&store, &prompt, json)?;
        }
        Commands::Ls => {
            list::run(&store)?;
        }
        Commands::Tag {
            prompt,
            hash,
            label,
        } => {
            tag::run(&store, &prompt, &hash, label.as_deref())?;
        }
    }

    Ok(())
}
