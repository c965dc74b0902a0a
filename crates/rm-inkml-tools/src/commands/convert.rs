use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::utils::file as file_utils;

pub fn execute(input: &Path, output: Option<&Path>) -> Result<()> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => file_utils::default_output_path(input),
    };

    log::debug!("Resolved output path {}", output.display());

    rm_inkml::convert_file(input, &output).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            input.display(),
            output.display()
        )
    })?;

    eprintln!(
        "{} Wrote {}",
        "✓".green().bold(),
        output.display().to_string().bold()
    );
    Ok(())
}
