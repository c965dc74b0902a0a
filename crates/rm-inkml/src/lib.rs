// reMarkable scene tree to InkML conversion
mod emitter;
pub mod mapper;
pub mod types;

pub use emitter::{BrushTable, ExportOptions, Exporter, export, export_to_string};
pub use mapper::{BoundingBox, Canvas, CoordinateMapper, InkPoint, ScreenPoint};
pub use types::*;

use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InkmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown pen color id {0}: no palette entry")]
    UnknownColor(u32),

    #[error("Unknown pen tool id {0}")]
    UnknownTool(u32),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

pub type Result<T> = std::result::Result<T, InkmlError>;

/// Convert a scene file into an InkML file
///
/// The scene is loaded with [`SceneTree::from_file`], rendered fully in memory
/// and only then written to `output`. The destination is replaced atomically,
/// so a failed conversion never leaves a truncated document behind.
pub fn convert_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    convert_file_with(input, output, &ExportOptions::default())
}

/// Same as [`convert_file`] with explicit export options
pub fn convert_file_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    log::info!("Converting {} to {}", input.display(), output.display());

    let scene = SceneTree::from_file(input)?;
    let mut rendered = Vec::new();
    Exporter::new(&scene, options).write(&mut rendered)?;

    let file = atomicwrites::AtomicFile::new(output, atomicwrites::AllowOverwrite);
    file.write(|f| f.write_all(&rendered))
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
        })?;

    log::info!("Conversion complete.");
    Ok(())
}
