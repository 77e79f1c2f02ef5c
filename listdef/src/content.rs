//! Row content variants.
//!
//! A [`RowContent`] is the behavior half of a row: which view it needs, how it configures
//! that view, and how tall it is. The bookkeeping half (position, display state, bound view,
//! declarative hooks) lives on [`crate::Row`].

use alloc::format;
use alloc::string::String;

use crate::row::RowContext;
use crate::style::{TextStyle, VerticalInsets};
use crate::{IndexPath, ViewType};

/// Measures laid-out text. Provided by the host's text system.
pub trait TextMeasurer {
    /// Returns the height `text` occupies when wrapped to `width`.
    fn measure(&self, text: &str, style: &TextStyle, width: f32) -> f32;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &TextStyle, f32) -> f32,
{
    fn measure(&self, text: &str, style: &TextStyle, width: f32) -> f32 {
        self(text, style, width)
    }
}

/// A view able to show one label. Implemented by host views used with [`PlainRow`] and
/// [`TextRow`].
pub trait LabelView {
    fn set_text(&mut self, text: Option<&str>);

    fn set_text_style(&mut self, _style: &TextStyle) {}
}

/// Per-variant row behavior.
///
/// Every hook has a no-op default except [`RowContent::view_type`].
pub trait RowContent<V> {
    /// The view type this content is rendered with.
    fn view_type(&self) -> ViewType;

    /// Called when a recycled view is bound to the row.
    fn configure(&mut self, _cx: &mut RowContext<'_, V>) {}

    fn will_display(&mut self, _cx: &mut RowContext<'_, V>) {}

    fn did_end_display(&mut self, _cx: &mut RowContext<'_, V>) {}

    fn did_select(&mut self, _cx: &mut RowContext<'_, V>) {}

    fn did_deselect(&mut self, _cx: &mut RowContext<'_, V>) {}

    /// A string that changes whenever anything affecting the measured height changes.
    ///
    /// `None` opts out of measurement; the row's preferred height is used instead.
    fn height_signature(&self) -> Option<String> {
        None
    }

    /// Measures the row at `width`. Only called on a height cache miss.
    fn measure_height(&self, _width: f32, _measurer: &dyn TextMeasurer) -> Option<f32> {
        None
    }

    fn prefetch(&mut self, _index_path: IndexPath) {}

    fn cancel_prefetch(&mut self, _index_path: IndexPath) {}
}

fn text_signature(text: &str, style: &TextStyle, insets: &VerticalInsets) -> String {
    let mut signature = format!(
        "{}_{}_{}_{}",
        text, style.font, style.color, style.alignment
    );
    // Default insets keep the short form.
    if *insets != VerticalInsets::default() {
        signature.push_str(&format!("_insets:{}:{}", insets.top, insets.bottom));
    }
    signature
}

/// A single optional title, applied when the view is bound.
#[derive(Clone, Debug)]
pub struct PlainRow {
    pub title: Option<String>,
    pub style: TextStyle,
    pub insets: VerticalInsets,
    view_type: ViewType,
}

impl PlainRow {
    /// A plain row rendered with views of type `T`.
    pub fn new<T: 'static>(title: Option<String>) -> Self {
        Self {
            title,
            style: TextStyle::default(),
            insets: VerticalInsets::default(),
            view_type: ViewType::of::<T>(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_insets(mut self, insets: VerticalInsets) -> Self {
        self.insets = insets;
        self
    }
}

impl<V: LabelView> RowContent<V> for PlainRow {
    fn view_type(&self) -> ViewType {
        self.view_type
    }

    fn configure(&mut self, cx: &mut RowContext<'_, V>) {
        cx.view.set_text(self.title.as_deref());
        cx.view.set_text_style(&self.style);
    }

    fn height_signature(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(|t| text_signature(t, &self.style, &self.insets))
    }

    fn measure_height(&self, width: f32, measurer: &dyn TextMeasurer) -> Option<f32> {
        let title = self.title.as_deref()?;
        Some(measurer.measure(title, &self.style, width) + self.insets.total())
    }
}

/// Wrapping text whose height follows its content.
///
/// The label is filled in on will-display rather than on bind, so a view bound ahead of
/// time (prefetch) picks up the latest text.
#[derive(Clone, Debug)]
pub struct TextRow {
    pub text: String,
    pub style: TextStyle,
    pub insets: VerticalInsets,
    view_type: ViewType,
}

impl TextRow {
    pub fn new<T: 'static>(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            insets: VerticalInsets::default(),
            view_type: ViewType::of::<T>(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_insets(mut self, insets: VerticalInsets) -> Self {
        self.insets = insets;
        self
    }
}

impl<V: LabelView> RowContent<V> for TextRow {
    fn view_type(&self) -> ViewType {
        self.view_type
    }

    fn will_display(&mut self, cx: &mut RowContext<'_, V>) {
        cx.view.set_text(Some(&self.text));
        cx.view.set_text_style(&self.style);
    }

    fn height_signature(&self) -> Option<String> {
        Some(text_signature(&self.text, &self.style, &self.insets))
    }

    fn measure_height(&self, width: f32, measurer: &dyn TextMeasurer) -> Option<f32> {
        Some(measurer.measure(&self.text, &self.style, width) + self.insets.total())
    }
}
