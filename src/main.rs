use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diffpack::cli::commands;
use diffpack::cli::{CommandContext, SourceArgs};
use diffpack::config::ConfigLoader;

#[derive(Parser)]
#[command(name = "diffpack")]
#[command(version, about = "Shrink git diffs to fit commit-message prompts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,

    #[arg(long, global = true, help = "Disable colored output")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the diff, compressed when it exceeds the thresholds
    Compress {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(
            short = 's',
            long,
            help = "Strategy override: stat, compact, filtered, function-context, smart"
        )]
        strategy: Option<String>,
        #[arg(long, help = "Compress even when the diff is within thresholds")]
        force: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Show diff size metrics and whether compression would run
    Stats {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Show the priority score of file paths
    Score {
        #[arg(required = true, help = "Paths to score")]
        paths: Vec<String>,
        #[arg(long, help = "Read each file to detect generated content")]
        read_content: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Build a commit-message prompt from the diff
    Prompt {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short = 'b', long, help = "Branch name override")]
        branch: Option<String>,
        #[arg(long, help = "Print the fallback commit template instead")]
        template: bool,
    },

    /// Extract a commit message from a model reply
    Extract {
        #[arg(help = "Reply file (default: stdin)")]
        input: Option<PathBuf>,
        #[arg(short = 'b', long, help = "Branch used for the fallback template")]
        branch: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check git availability and the effective configuration
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdiffpack encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Default hook prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let config = ConfigLoader::load()?;

    let filter = if cli.verbose {
        "debug".to_string()
    } else if cli.quiet {
        "error".to_string()
    } else {
        config.logging.level.clone()
    };

    // stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = CommandContext::new(config);

    match cli.command {
        Commands::Compress {
            source,
            strategy,
            force,
            format,
        } => {
            commands::compress::run(&ctx, &source, strategy.as_deref(), force, &format)?;
        }
        Commands::Stats { source, format } => {
            commands::stats::run(&ctx, &source, &format)?;
        }
        Commands::Score {
            paths,
            read_content,
            format,
        } => {
            commands::score::run(&paths, read_content, &format)?;
        }
        Commands::Prompt {
            source,
            branch,
            template,
        } => {
            commands::prompt::run(&ctx, &source, branch, template)?;
        }
        Commands::Extract { input, branch } => {
            commands::extract::run(&ctx, input.as_deref(), branch)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&ctx.config, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force)?;
            }
        },
        Commands::Doctor => {
            commands::doctor::run(&ctx)?;
        }
    }

    Ok(())
}
