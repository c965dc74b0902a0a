use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;

use rm_inkml_tools::{OutputFormat, commands, utils};

#[derive(Parser)]
#[command(name = "rm-inkml")]
#[command(about = "Convert reMarkable notebook pages to InkML", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a scene file to an InkML document
    Convert {
        /// Scene file (.json or zstd-compressed .json.zst)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Output InkML file (defaults to the input path with an .inkml extension)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show strokes, extents and brushes of a scene
    Info {
        /// Scene file to inspect
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize color handling (respects NO_COLOR)
    utils::color::init_color();

    // Initialize logger with default level (overridden by RUST_LOG)
    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Convert { input, output } => {
            commands::convert::execute(&input, output.as_deref())
        }
        Commands::Info { input, format } => commands::info::execute(&input, format),
    }
}
