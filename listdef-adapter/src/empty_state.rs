/// An axis-aligned rectangle, y growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height * 0.5
    }
}

/// Where the list surface sits, in the same coordinate space the keyboard frame is
/// reported in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceGeometry {
    pub frame: Rect,
    pub content_inset_top: f32,
    /// Height of a header view pinned above the list content, if any.
    pub header_height: Option<f32>,
}

/// Reports the on-screen keyboard frame. Injected by the host.
pub trait KeyboardMonitor {
    /// The keyboard frame, or `None` while it is hidden.
    fn keyboard_frame(&self) -> Option<Rect>;

    /// Called once when a controller starts relying on keyboard change notifications.
    fn start_observing(&mut self) {}
}

/// Shows the placeholder displayed while the list has no content.
pub trait EmptyStatePresenter {
    fn set_visible(&mut self, visible: bool);

    /// Centers the placeholder content in `area` (surface-local coordinates).
    fn place(&mut self, area: Rect);
}

/// The area an empty-state placeholder should be centered in.
///
/// Starts from the surface bounds, then shrinks to what stays uncovered by the keyboard
/// (and below any pinned header). An area that would collapse to nothing keeps the full
/// surface height.
pub fn empty_state_area(geometry: &SurfaceGeometry, keyboard: Option<Rect>) -> Rect {
    let mut area = Rect::new(0.0, 0.0, geometry.frame.width, geometry.frame.height);
    let below_header =
        geometry.frame.height - geometry.header_height.unwrap_or(geometry.content_inset_top);
    let height = match keyboard {
        Some(kb) => {
            let above_keyboard = kb.min_y() - geometry.frame.min_y() - geometry.content_inset_top;
            above_keyboard.min(below_header)
        }
        None => below_header,
    };
    if height > 0.0 {
        area.height = height;
    }
    area
}
