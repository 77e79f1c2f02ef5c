use alloc::borrow::Cow;
use core::fmt;

/// A font descriptor. Only its identity matters here; rendering belongs to the host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    pub family: Cow<'static, str>,
    pub size: f32,
}

impl Font {
    pub fn new(family: impl Into<Cow<'static, str>>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("System", 17.0)
    }
}

/// Formats as `Family-Size`, e.g. `Arial-14`.
impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family, self.size)
    }
}

/// An RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 0xFF);
    pub const WHITE: Self = Self::rgba(0xFF, 0xFF, 0xFF, 0xFF);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Formats as `#RRGGBBAA`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justified,
    Natural,
}

impl fmt::Display for TextAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justified => "justified",
            Self::Natural => "natural",
        })
    }
}

/// Everything about a piece of text that can change its measured height.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    pub font: Font,
    pub color: Color,
    pub alignment: TextAlignment,
}

impl TextStyle {
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Vertical padding added around measured text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerticalInsets {
    pub top: f32,
    pub bottom: f32,
}

impl VerticalInsets {
    pub const fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn total(&self) -> f32 {
        self.top + self.bottom
    }
}
