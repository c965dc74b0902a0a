use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, Table};
use rm_inkml::{BrushTable, Canvas, CoordinateMapper, Pen, SceneTree};
use serde::Serialize;
use serde_json::json;

use crate::OutputFormat;
use crate::utils::file as file_utils;

/// Brush summary row
#[derive(Debug, Clone, Serialize)]
pub struct BrushInfo {
    pub id: String,
    pub tool: &'static str,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub line_cap: &'static str,
    pub strokes: usize,
}

pub fn execute(file: &Path, format: OutputFormat) -> Result<()> {
    let scene = file_utils::load_scene(file)?;
    let mapper = CoordinateMapper::for_scene(&scene, Canvas::default());
    let brushes = brush_infos(&scene)?;

    match format {
        OutputFormat::Text => output_text(&scene, &mapper, &brushes),
        OutputFormat::Json => output_json(&scene, &mapper, &brushes),
    }
}

/// Distinct brushes of the scene with the number of strokes drawn with each
pub fn brush_infos(scene: &SceneTree) -> Result<Vec<BrushInfo>> {
    let table = BrushTable::collect(scene)?;
    let mut counts = vec![0usize; table.len()];
    for stroke in scene.strokes() {
        let pen = Pen::derive(stroke.tool, stroke.color, stroke.thickness_scale)?;
        if let Some(pos) = table.position(&pen) {
            counts[pos] += 1;
        }
    }

    Ok(table
        .iter()
        .zip(counts)
        .map(|((id, pen), strokes)| BrushInfo {
            id,
            tool: pen.name(),
            color: pen.color.rgb().to_string(),
            width: pen.width,
            opacity: pen.opacity,
            line_cap: pen.line_cap.as_str(),
            strokes,
        })
        .collect())
}

fn output_text(scene: &SceneTree, mapper: &CoordinateMapper, brushes: &[BrushInfo]) -> Result<()> {
    let stats = scene.stats();
    let bbox = mapper.bounding_box();
    let fitted = mapper.fitted_bounds();

    println!("{}", "Scene Summary".bold());

    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL_CONDENSED);
    summary.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    summary.add_row(vec![
        Cell::new("Strokes").fg(Color::Cyan),
        Cell::new(stats.strokes),
    ]);
    summary.add_row(vec![
        Cell::new("Points").fg(Color::Cyan),
        Cell::new(stats.points),
    ]);
    summary.add_row(vec![
        Cell::new("Text blocks").fg(Color::Cyan),
        Cell::new(format!("{} (not exported)", stats.texts)),
    ]);
    summary.add_row(vec![
        Cell::new("Groups").fg(Color::Cyan),
        Cell::new(stats.groups),
    ]);
    summary.add_row(vec![
        Cell::new("Bounding box").fg(Color::Cyan),
        Cell::new(format!(
            "x {:.1} .. {:.1}, y {:.1} .. {:.1}",
            bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y
        )),
    ]);
    summary.add_row(vec![
        Cell::new("Viewport").fg(Color::Cyan),
        Cell::new(format!(
            "x {:.1} .. {:.1}, y {:.1} .. {:.1}",
            fitted.min_x, fitted.max_x, fitted.min_y, fitted.max_y
        )),
    ]);
    println!("{summary}");

    if brushes.is_empty() {
        println!("\n{}", "No brushes (document has no strokes)".dimmed());
        return Ok(());
    }

    println!("\n{}", "Brushes".bold());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Id", "Tool", "Color", "Width", "Opacity", "Cap", "Strokes"]);
    for brush in brushes {
        table.add_row(vec![
            Cell::new(&brush.id),
            Cell::new(brush.tool),
            Cell::new(&brush.color),
            Cell::new(format!("{:.2}", brush.width)),
            Cell::new(format!("{:.2}", brush.opacity)),
            Cell::new(brush.line_cap),
            Cell::new(brush.strokes),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn output_json(scene: &SceneTree, mapper: &CoordinateMapper, brushes: &[BrushInfo]) -> Result<()> {
    let output = json!({
        "stats": scene.stats(),
        "bounding_box": mapper.bounding_box(),
        "viewport": mapper.fitted_bounds(),
        "brushes": brushes,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
