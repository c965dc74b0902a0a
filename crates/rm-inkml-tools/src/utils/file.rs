use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rm_inkml::SceneTree;

/// Load a scene file, automatically decompressing if it's a .zst file
pub fn load_scene(path: &Path) -> Result<SceneTree> {
    SceneTree::from_file(path).with_context(|| format!("Failed to read scene: {:?}", path))
}

/// `page.json` -> `page.inkml`, `page.json.zst` -> `page.inkml`
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut output = input.to_path_buf();
    if output.extension().and_then(|s| s.to_str()) == Some("zst") {
        output.set_extension("");
    }
    output.with_extension("inkml")
}
