use std::collections::HashMap;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::mapper::{Canvas, CoordinateMapper};
use crate::types::{Node, Pen, SceneTree, Stroke};
use crate::{InkmlError, Result};

pub const WIDTH_CONV_CONSTANT: f64 = 10.0;
pub const HEIGHT_CONV_CONSTANT: f64 = 10.0;

const CONTEXT_ID: &str = "ctxCoordinatesWithPressure";
const CONTEXT_REF: &str = "#ctxCoordinatesWithPressure";
const INK_SOURCE_ID: &str = "inkSrcCoordinatesWithPressure";

const NS_EMMA: &str = "http://www.w3.org/2003/04/emma";
const NS_MSINK: &str = "http://schemas.microsoft.com/ink/2010/main";
const NS_INKML: &str = "http://www.w3.org/2003/InkML";

/// Channels declared by the trace format: (name, type, max, units)
const CHANNELS: [(&str, &str, &str, &str); 3] = [
    ("X", "integer", "32767", "himetric"),
    ("Y", "integer", "32767", "himetric"),
    ("F", "integer", "32767", "dev"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportOptions {
    pub canvas: Canvas,
}

/// Distinct pens of a document in first-seen order
#[derive(Debug, Clone, Default)]
pub struct BrushTable {
    pens: Vec<Pen>,
    index: HashMap<Pen, usize>,
}

impl BrushTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every distinct pen used by the scene's strokes
    pub fn collect(scene: &SceneTree) -> Result<Self> {
        let mut table = Self::new();
        for stroke in scene.strokes() {
            table.insert(stroke_pen(stroke)?);
        }
        Ok(table)
    }

    /// Insert a pen, returning its position. Known pens keep their first position.
    pub fn insert(&mut self, pen: Pen) -> usize {
        if let Some(&pos) = self.index.get(&pen) {
            return pos;
        }
        let pos = self.pens.len();
        self.pens.push(pen);
        self.index.insert(pen, pos);
        pos
    }

    pub fn position(&self, pen: &Pen) -> Option<usize> {
        self.index.get(pen).copied()
    }

    pub fn id_of(&self, pen: &Pen) -> Option<String> {
        self.position(pen).map(brush_id)
    }

    pub fn len(&self) -> usize {
        self.pens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pens.is_empty()
    }

    /// (brush id, pen) pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (String, &Pen)> {
        self.pens.iter().enumerate().map(|(i, pen)| (brush_id(i), pen))
    }
}

fn brush_id(pos: usize) -> String {
    format!("br{}", pos + 1)
}

fn stroke_pen(stroke: &Stroke) -> Result<Pen> {
    Pen::derive(stroke.tool, stroke.color, stroke.thickness_scale)
}

/// Single-document InkML exporter.
///
/// Owns the projection state for one export; build a new one per document.
pub struct Exporter<'a> {
    scene: &'a SceneTree,
    mapper: CoordinateMapper,
}

impl<'a> Exporter<'a> {
    pub fn new(scene: &'a SceneTree, options: &ExportOptions) -> Self {
        Self {
            scene,
            mapper: CoordinateMapper::for_scene(scene, options.canvas),
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Render the document and write it to `out` in one piece.
    ///
    /// Nothing reaches `out` unless the whole document rendered.
    pub fn write(&self, mut out: impl Write) -> Result<()> {
        let rendered = self.render()?;
        out.write_all(&rendered)?;
        out.flush()?;
        Ok(())
    }

    pub fn render(&self) -> Result<Vec<u8>> {
        self.scene.validate()?;
        log::debug!("Exporting {} items to InkML", self.scene.walk().count());

        let brushes = BrushTable::collect(self.scene)?;
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        let root = BytesStart::new("inkml:ink").with_attributes([
            ("xmlns:emma", NS_EMMA),
            ("xmlns:msink", NS_MSINK),
            ("xmlns:inkml", NS_INKML),
        ]);
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("inkml:definitions")))?;
        write_context(&mut writer)?;
        for (id, pen) in brushes.iter() {
            write_brush(&mut writer, &id, pen)?;
        }
        writer.write_event(Event::End(BytesEnd::new("inkml:definitions")))?;

        writer.write_event(Event::Start(BytesStart::new("inkml:traceGroup")))?;
        let mut trace_id = 0usize;
        for node in self.scene.walk() {
            match node {
                Node::Stroke(stroke) => {
                    trace_id += 1;
                    self.write_trace(&mut writer, &brushes, stroke, trace_id)?;
                }
                Node::Text(text) => {
                    log::debug!("Skipping text block ({} chars)", text.text.chars().count());
                }
                Node::Group(_) => {}
            }
        }
        writer.write_event(Event::End(BytesEnd::new("inkml:traceGroup")))?;
        writer.write_event(Event::End(BytesEnd::new("inkml:ink")))?;

        let mut rendered = writer.into_inner();
        rendered.push(b'\n');

        log::debug!("Finished InkML export: {} traces", trace_id);
        Ok(rendered)
    }

    fn write_trace(
        &self,
        writer: &mut Writer<Vec<u8>>,
        brushes: &BrushTable,
        stroke: &Stroke,
        trace_id: usize,
    ) -> Result<()> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Drawing stroke {} ({:?}) with {} points",
                trace_id,
                stroke.tool,
                stroke.points.len()
            );
        }

        let pen = stroke_pen(stroke)?;
        let brush_ref = brushes
            .id_of(&pen)
            .map(|id| format!("#{}", id))
            .ok_or_else(|| {
                InkmlError::InvalidScene(format!("no brush for stroke {}", trace_id))
            })?;

        let body = stroke
            .points
            .iter()
            .map(|point| {
                let p = self.mapper.map(point);
                format!("{} {} {}", p.x, p.y, p.force)
            })
            .collect::<Vec<_>>()
            .join(",");

        let trace_id = trace_id.to_string();
        let start = BytesStart::new("inkml:trace").with_attributes([
            ("xml:id", trace_id.as_str()),
            ("contextRef", CONTEXT_REF),
            ("brushRef", brush_ref.as_str()),
        ]);

        if body.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&body)))?;
            writer.write_event(Event::End(BytesEnd::new("inkml:trace")))?;
        }
        Ok(())
    }
}

fn write_context(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    writer.write_event(Event::Start(
        BytesStart::new("inkml:context").with_attributes([("xml:id", CONTEXT_ID)]),
    ))?;
    writer.write_event(Event::Start(
        BytesStart::new("inkml:inkSource").with_attributes([("xml:id", INK_SOURCE_ID)]),
    ))?;

    writer.write_event(Event::Start(BytesStart::new("inkml:traceFormat")))?;
    for (name, kind, max, units) in CHANNELS {
        writer.write_event(Event::Empty(BytesStart::new("inkml:channel").with_attributes([
            ("name", name),
            ("type", kind),
            ("max", max),
            ("units", units),
        ])))?;
    }
    writer.write_event(Event::End(BytesEnd::new("inkml:traceFormat")))?;

    writer.write_event(Event::Start(BytesStart::new("inkml:channelProperties")))?;
    for (name, _, _, units) in CHANNELS {
        let resolution_units = format!("1/{}", units);
        writer.write_event(Event::Empty(
            BytesStart::new("inkml:channelProperty").with_attributes([
                ("channel", name),
                ("name", "resolution"),
                ("value", "1"),
                ("units", resolution_units.as_str()),
            ]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("inkml:channelProperties")))?;

    writer.write_event(Event::End(BytesEnd::new("inkml:inkSource")))?;
    writer.write_event(Event::End(BytesEnd::new("inkml:context")))?;
    Ok(())
}

fn write_brush(writer: &mut Writer<Vec<u8>>, id: &str, pen: &Pen) -> Result<()> {
    let width = ((pen.width * WIDTH_CONV_CONSTANT) as i64).to_string();
    let height = ((pen.width * HEIGHT_CONV_CONSTANT) as i64).to_string();
    let color = pen.color.rgb().to_string();
    let transparency = format_fraction(1.0 - pen.opacity);
    let raster_op = if pen.is_highlighter() {
        "maskPen"
    } else {
        "copyPen"
    };

    writer.write_event(Event::Start(
        BytesStart::new("inkml:brush").with_attributes([("xml:id", id)]),
    ))?;

    let properties: [(&str, &str, Option<&str>); 9] = [
        ("width", width.as_str(), Some("himetric")),
        ("height", height.as_str(), Some("himetric")),
        ("color", color.as_str(), None),
        ("transparency", transparency.as_str(), None),
        ("tip", "ellipse", None),
        ("rasterOp", raster_op, None),
        ("ignorePressure", "false", None),
        ("antiAliased", "true", None),
        ("fitToCurve", "false", None),
    ];
    for (name, value, units) in properties {
        let mut elem = BytesStart::new("inkml:brushProperty");
        elem.push_attribute(("name", name));
        elem.push_attribute(("value", value));
        if let Some(units) = units {
            elem.push_attribute(("units", units));
        }
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new("inkml:brush")))?;
    Ok(())
}

/// Print a [0, 1] value with at most three decimals ("0", "0.7", "0.125")
fn format_fraction(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // normalize -0
    format!("{}", rounded + 0.0)
}

/// Render a scene into `out` with default options
pub fn export(scene: &SceneTree, out: impl Write) -> Result<()> {
    Exporter::new(scene, &ExportOptions::default()).write(out)
}

/// Render a scene into an InkML string with default options
pub fn export_to_string(scene: &SceneTree) -> Result<String> {
    let rendered = Exporter::new(scene, &ExportOptions::default()).render()?;
    // quick-xml only ever emits the UTF-8 we give it
    Ok(String::from_utf8_lossy(&rendered).into_owned())
}
