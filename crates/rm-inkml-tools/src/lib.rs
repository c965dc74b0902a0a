use clap::ValueEnum;

pub mod commands;
pub mod utils;

// Re-export the converter library for external use
pub use rm_inkml;

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}
