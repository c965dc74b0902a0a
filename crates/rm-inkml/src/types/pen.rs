use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{InkmlError, Result};

/// Pen families available on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Tool {
    Paintbrush,
    Pencil,
    Ballpoint,
    Marker,
    Fineliner,
    Highlighter,
    Eraser,
    MechanicalPencil,
    EraseArea,
    Calligraphy,
    Shader,
}

impl Tool {
    pub fn from_id(id: u32) -> Result<Self> {
        // Second-generation firmware ids (12..=18) alias the original families
        match id {
            0 | 12 => Ok(Self::Paintbrush),
            1 | 14 => Ok(Self::Pencil),
            2 | 15 => Ok(Self::Ballpoint),
            3 | 16 => Ok(Self::Marker),
            4 | 17 => Ok(Self::Fineliner),
            5 | 18 => Ok(Self::Highlighter),
            6 => Ok(Self::Eraser),
            7 | 13 => Ok(Self::MechanicalPencil),
            8 => Ok(Self::EraseArea),
            21 => Ok(Self::Calligraphy),
            23 => Ok(Self::Shader),
            other => Err(InkmlError::UnknownTool(other)),
        }
    }

    /// Current-generation device id of this family
    pub fn id(self) -> u32 {
        match self {
            Self::Paintbrush => 12,
            Self::Pencil => 14,
            Self::Ballpoint => 15,
            Self::Marker => 16,
            Self::Fineliner => 17,
            Self::Highlighter => 18,
            Self::Eraser => 6,
            Self::MechanicalPencil => 13,
            Self::EraseArea => 8,
            Self::Calligraphy => 21,
            Self::Shader => 23,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Paintbrush => "Paintbrush",
            Self::Pencil => "Pencil",
            Self::Ballpoint => "Ballpoint",
            Self::Marker => "Marker",
            Self::Fineliner => "Fineliner",
            Self::Highlighter => "Highlighter",
            Self::Eraser => "Eraser",
            Self::MechanicalPencil => "MechanicalPencil",
            Self::EraseArea => "EraseArea",
            Self::Calligraphy => "Calligraphy",
            Self::Shader => "Shader",
        }
    }
}

impl TryFrom<u32> for Tool {
    type Error = InkmlError;

    fn try_from(id: u32) -> Result<Self> {
        Self::from_id(id)
    }
}

impl From<Tool> for u32 {
    fn from(tool: Tool) -> Self {
        tool.id()
    }
}

/// Device palette entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PenColor {
    Black,
    Gray,
    White,
    Yellow,
    Green,
    Pink,
    Blue,
    Red,
    GrayOverlap,
    Highlight,
    Green2,
    Cyan,
    Magenta,
    Yellow2,
}

impl PenColor {
    pub fn from_id(id: u32) -> Result<Self> {
        Ok(match id {
            0 => Self::Black,
            1 => Self::Gray,
            2 => Self::White,
            3 => Self::Yellow,
            4 => Self::Green,
            5 => Self::Pink,
            6 => Self::Blue,
            7 => Self::Red,
            8 => Self::GrayOverlap,
            9 => Self::Highlight,
            10 => Self::Green2,
            11 => Self::Cyan,
            12 => Self::Magenta,
            13 => Self::Yellow2,
            other => return Err(InkmlError::UnknownColor(other)),
        })
    }

    /// Color actually drawn for this palette entry.
    ///
    /// The device reports highlighter strokes with the generic `Highlight`
    /// id, which carries no RGB value of its own; it is drawn as yellow.
    pub fn effective(self) -> Self {
        match self {
            Self::Highlight => Self::Yellow,
            other => other,
        }
    }

    pub fn rgb(self) -> Rgb {
        let (r, g, b) = match self.effective() {
            Self::Black => (0, 0, 0),
            Self::Gray => (144, 144, 144),
            Self::White => (255, 255, 255),
            Self::Yellow | Self::Highlight => (251, 247, 25),
            Self::Green => (0, 255, 0),
            Self::Pink => (255, 192, 203),
            Self::Blue => (78, 105, 201),
            Self::Red => (179, 62, 57),
            Self::GrayOverlap => (125, 125, 125),
            Self::Green2 => (161, 216, 125),
            Self::Cyan => (139, 208, 229),
            Self::Magenta => (183, 130, 205),
            Self::Yellow2 => (247, 232, 81),
        };
        Rgb { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Visual style derived from a stroke's (tool, color, thickness)
///
/// Equality and hashing are structural over every field, floats compared by
/// bit pattern, so two strokes with the same inputs always collapse to one
/// brush.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pen {
    pub tool: Tool,
    pub line_cap: LineCap,
    /// Opacity in [0, 1]
    pub opacity: f64,
    /// Stroke width in device units
    pub width: f64,
    pub color: PenColor,
}

impl Pen {
    /// Derive the pen for a stroke. Fails on palette ids the device does not define.
    pub fn derive(tool: Tool, color_id: u32, thickness_scale: f64) -> Result<Self> {
        let color = PenColor::from_id(color_id)?.effective();
        let mut pen = Pen {
            tool,
            line_cap: LineCap::Round,
            opacity: 1.0,
            width: thickness_scale,
            color,
        };

        match tool {
            Tool::Fineliner => pen.width = thickness_scale.powf(2.1) * 1.3,
            Tool::Ballpoint | Tool::Marker | Tool::Pencil | Tool::Paintbrush => {}
            Tool::Calligraphy => pen.width = thickness_scale * 1.5,
            Tool::MechanicalPencil => {
                pen.width = thickness_scale.powi(2);
                pen.opacity = 0.7;
            }
            Tool::Highlighter => {
                pen.width = 15.0;
                pen.opacity = 0.3;
                pen.line_cap = LineCap::Square;
            }
            Tool::Shader => {
                pen.width = 12.0;
                pen.opacity = 0.1;
            }
            Tool::Eraser => {
                pen.width = thickness_scale * 2.0;
                pen.line_cap = LineCap::Square;
                pen.color = PenColor::White;
            }
            Tool::EraseArea => {
                pen.opacity = 0.0;
                pen.line_cap = LineCap::Square;
            }
        }

        Ok(pen)
    }

    pub fn name(&self) -> &'static str {
        self.tool.name()
    }

    pub fn is_highlighter(&self) -> bool {
        self.tool == Tool::Highlighter
    }

    fn key(&self) -> (Tool, LineCap, u64, u64, PenColor) {
        (
            self.tool,
            self.line_cap,
            self.opacity.to_bits(),
            self.width.to_bits(),
            self.color,
        )
    }
}

impl PartialEq for Pen {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pen {}

impl Hash for Pen {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
