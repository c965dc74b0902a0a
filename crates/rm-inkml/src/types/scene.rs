use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::pen::Tool;
use crate::{InkmlError, Result};

/// One sampled stylus position in device units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Normalized stylus pressure in [0, 1]
    #[serde(default)]
    pub pressure: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure }
    }
}

/// A single continuous pen stroke (a "line" on the device)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: Tool,
    /// Raw palette id; resolved against the palette at export time
    pub color: u32,
    #[serde(default = "default_thickness")]
    pub thickness_scale: f64,
    /// Points in drawing order
    #[serde(default)]
    pub points: Vec<Point>,
}

fn default_thickness() -> f64 {
    1.0
}

/// Typed text block. Carried through the tree but never rendered to ink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
    #[serde(default)]
    pub width: f64,
}

/// Ordered container of child nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Stroke(Stroke),
    Text(Text),
    Group(Group),
}

/// Materialized tree of a single notebook page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneTree {
    pub root: Group,
}

/// Node counts of a scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub strokes: usize,
    pub points: usize,
    pub texts: usize,
    pub groups: usize,
}

impl SceneTree {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            root: Group {
                label: None,
                children,
            },
        }
    }

    /// Decode a scene from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    /// Load a scene file, decompressing it first if it has a `.zst` extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        if path.extension().and_then(|s| s.to_str()) == Some("zst") {
            let decoder = zstd::Decoder::new(file)?;
            Self::from_json_reader(decoder)
        } else {
            Self::from_json_reader(file)
        }
    }

    /// Depth-first, pre-order walk over every node in document order.
    /// The root group itself is not yielded.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![self.root.children.iter()],
        }
    }

    /// Stroke nodes in document order
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.walk().filter_map(|node| match node {
            Node::Stroke(stroke) => Some(stroke),
            _ => None,
        })
    }

    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        for node in self.walk() {
            match node {
                Node::Stroke(stroke) => {
                    stats.strokes += 1;
                    stats.points += stroke.points.len();
                }
                Node::Text(_) => stats.texts += 1,
                Node::Group(_) => stats.groups += 1,
            }
        }
        stats
    }

    /// Reject values the projection cannot handle: non-finite coordinates,
    /// and pressure outside [0, 1], which would leave the force channel range
    pub fn validate(&self) -> Result<()> {
        for (index, stroke) in self.strokes().enumerate() {
            for p in &stroke.points {
                if !p.x.is_finite() || !p.y.is_finite() || !p.pressure.is_finite() {
                    return Err(InkmlError::InvalidScene(format!(
                        "stroke {} has a non-finite point",
                        index + 1
                    )));
                }
                if !(0.0..=1.0).contains(&p.pressure) {
                    return Err(InkmlError::InvalidScene(format!(
                        "stroke {} has pressure {} outside [0, 1]",
                        index + 1,
                        p.pressure
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Iterator returned by [`SceneTree::walk`]
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    if let Node::Group(group) = node {
                        self.stack.push(group.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(x: f64) -> Node {
        Node::Stroke(Stroke {
            tool: Tool::Fineliner,
            color: 0,
            thickness_scale: 1.0,
            points: vec![Point::new(x, 0.0, 0.5)],
        })
    }

    #[test]
    fn walk_is_preorder() {
        let scene = SceneTree::new(vec![
            stroke(1.0),
            Node::Group(Group {
                label: Some("layer".into()),
                children: vec![
                    stroke(2.0),
                    Node::Text(Text {
                        text: "hello".into(),
                        pos_x: 0.0,
                        pos_y: 0.0,
                        width: 100.0,
                    }),
                    Node::Group(Group {
                        label: None,
                        children: vec![stroke(3.0)],
                    }),
                ],
            }),
            stroke(4.0),
        ]);

        let xs: Vec<f64> = scene.strokes().map(|s| s.points[0].x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0]);

        let kinds: Vec<&str> = scene
            .walk()
            .map(|n| match n {
                Node::Stroke(_) => "stroke",
                Node::Text(_) => "text",
                Node::Group(_) => "group",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["stroke", "group", "stroke", "text", "group", "stroke", "stroke"]
        );

        let stats = scene.stats();
        assert_eq!(stats.strokes, 4);
        assert_eq!(stats.points, 4);
        assert_eq!(stats.texts, 1);
        assert_eq!(stats.groups, 2);
    }

    #[test]
    fn empty_scene_walks_nothing() {
        let scene = SceneTree::default();
        assert_eq!(scene.walk().count(), 0);
        assert_eq!(scene.stats(), SceneStats::default());
    }

    #[test]
    fn decode_json() {
        let scene = SceneTree::from_json_str(
            r#"{"root": {"children": [
                {"type": "group", "label": "Layer 1", "children": [
                    {"type": "stroke", "tool": 17, "color": 6, "thickness_scale": 2.0,
                     "points": [{"x": 1.5, "y": -2.0, "pressure": 0.25}]}
                ]},
                {"type": "text", "text": "title"}
            ]}}"#,
        )
        .unwrap();

        let stroke = scene.strokes().next().unwrap();
        assert_eq!(stroke.tool, Tool::Fineliner);
        assert_eq!(stroke.color, 6);
        assert_eq!(stroke.points, vec![Point::new(1.5, -2.0, 0.25)]);
        assert_eq!(scene.stats().texts, 1);
    }

    #[test]
    fn decode_rejects_unknown_tool() {
        let err = SceneTree::from_json_str(
            r#"{"root": {"children": [
                {"type": "stroke", "tool": 99, "color": 0, "points": []}
            ]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InkmlError::Json(_)));
        assert!(err.to_string().contains("Unknown pen tool id 99"));
    }

    #[test]
    fn validate_rejects_nan() {
        let scene = SceneTree::new(vec![Node::Stroke(Stroke {
            tool: Tool::Pencil,
            color: 0,
            thickness_scale: 1.0,
            points: vec![Point::new(f64::NAN, 0.0, 0.0)],
        })]);
        assert!(matches!(
            scene.validate(),
            Err(InkmlError::InvalidScene(_))
        ));
    }

    #[test]
    fn validate_rejects_pressure_out_of_range() {
        for pressure in [300.0, -0.5, 1.0001] {
            let scene = SceneTree::new(vec![Node::Stroke(Stroke {
                tool: Tool::Ballpoint,
                color: 0,
                thickness_scale: 1.0,
                points: vec![Point::new(1.0, 1.0, 0.5), Point::new(2.0, 2.0, pressure)],
            })]);
            let err = scene.validate().unwrap_err();
            assert!(
                err.to_string().contains("outside [0, 1]"),
                "pressure {}: {}",
                pressure,
                err
            );
        }
    }

    #[test]
    fn validate_accepts_pressure_bounds() {
        let scene = SceneTree::new(vec![Node::Stroke(Stroke {
            tool: Tool::Ballpoint,
            color: 0,
            thickness_scale: 1.0,
            points: vec![Point::new(1.0, 1.0, 0.0), Point::new(2.0, 2.0, 1.0)],
        })]);
        assert!(scene.validate().is_ok());
    }
}
