use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::lifecycle::DisplayState;
use crate::row::Row;
use crate::tree::{RowKey, SectionKey};
use crate::{ReuseIdentifier, ViewId, ViewType};

/// What a header hook gets to work with.
pub struct HeaderContext<'a, V> {
    pub view: &'a mut V,
    pub section: usize,
    pub key: SectionKey,
}

pub type HeaderHook<V> = Box<dyn FnMut(&mut HeaderContext<'_, V>)>;

/// An ordered group of rows with optional header presentation.
///
/// Rows added with [`Section::with_row`] before the section joins a tree are moved into the
/// tree when it does.
pub struct Section<V> {
    pub(crate) position: Option<usize>,
    pub(crate) rows: Vec<RowKey>,
    pub(crate) pending: Vec<Row<V>>,
    pub(crate) display_state: DisplayState,
    pub(crate) header_view: Option<ViewId>,

    pub title: Option<String>,
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub header_height: f32,

    header_view_type: Option<ViewType>,
    header_identifier: Option<ReuseIdentifier>,
    configure_header: Option<HeaderHook<V>>,
    before_display: Option<HeaderHook<V>>,
    after_display: Option<HeaderHook<V>>,
}

impl<V> Default for Section<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Section<V> {
    pub fn new() -> Self {
        Self {
            position: None,
            rows: Vec::new(),
            pending: Vec::new(),
            display_state: DisplayState::Offscreen,
            header_view: None,
            title: None,
            header_text: None,
            footer_text: None,
            header_height: 0.0,
            header_view_type: None,
            header_identifier: None,
            configure_header: None,
            before_display: None,
            after_display: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = Some(text.into());
        self
    }

    pub fn with_footer_text(mut self, text: impl Into<String>) -> Self {
        self.footer_text = Some(text.into());
        self
    }

    pub fn with_header_height(mut self, height: f32) -> Self {
        self.header_height = height;
        self
    }

    /// Uses views of type `T` for the header, identified by the type name.
    pub fn with_header_view<T: 'static>(mut self) -> Self {
        let view_type = ViewType::of::<T>();
        self.header_identifier = Some(view_type.reuse_identifier());
        self.header_view_type = Some(view_type);
        self
    }

    /// Sets the header view type and its reuse identifier together.
    pub fn with_header_view_identified(
        mut self,
        view_type: ViewType,
        identifier: impl Into<ReuseIdentifier>,
    ) -> Self {
        self.header_view_type = Some(view_type);
        self.header_identifier = Some(identifier.into());
        self
    }

    /// Sets only the header view type. A tree containing the section fails validation until
    /// an identifier is set as well.
    pub fn set_header_view_type(&mut self, view_type: Option<ViewType>) {
        self.header_view_type = view_type;
    }

    /// Sets only the header reuse identifier.
    pub fn set_header_identifier(&mut self, identifier: Option<ReuseIdentifier>) {
        self.header_identifier = identifier;
    }

    pub fn on_configure_header(
        mut self,
        f: impl FnMut(&mut HeaderContext<'_, V>) + 'static,
    ) -> Self {
        self.configure_header = Some(Box::new(f));
        self
    }

    pub fn before_display(mut self, f: impl FnMut(&mut HeaderContext<'_, V>) + 'static) -> Self {
        self.before_display = Some(Box::new(f));
        self
    }

    pub fn after_display(mut self, f: impl FnMut(&mut HeaderContext<'_, V>) + 'static) -> Self {
        self.after_display = Some(Box::new(f));
        self
    }

    /// Queues a row to be attached when the section joins a tree.
    pub fn with_row(mut self, row: Row<V>) -> Self {
        self.pending.push(row);
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row<V>>) -> Self {
        self.pending.extend(rows);
        self
    }

    /// Position among sibling sections, `None` while detached.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Keys of the attached rows, in order.
    pub fn row_keys(&self) -> &[RowKey] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn display_state(&self) -> DisplayState {
        self.display_state
    }

    pub fn is_onscreen(&self) -> bool {
        self.display_state.is_onscreen()
    }

    /// The header view most recently handed out for this section.
    pub fn header_view(&self) -> Option<ViewId> {
        self.header_view
    }

    pub fn header_view_type(&self) -> Option<ViewType> {
        self.header_view_type
    }

    pub fn header_identifier(&self) -> Option<&ReuseIdentifier> {
        self.header_identifier.as_ref()
    }

    /// The registrable header pair, when both halves are present.
    pub fn header_registration(&self) -> Option<(&ReuseIdentifier, ViewType)> {
        match (&self.header_identifier, self.header_view_type) {
            (Some(identifier), Some(view_type)) => Some((identifier, view_type)),
            _ => None,
        }
    }

    pub(crate) fn configure_header(&mut self, cx: &mut HeaderContext<'_, V>) {
        if let Some(f) = self.configure_header.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn will_display_header(&mut self, cx: &mut HeaderContext<'_, V>) {
        if let Some(f) = self.before_display.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn did_end_display_header(&mut self, cx: &mut HeaderContext<'_, V>) {
        if let Some(f) = self.after_display.as_mut() {
            f(cx);
        }
    }
}

impl<V> fmt::Debug for Section<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("position", &self.position)
            .field("rows", &self.rows.len())
            .field("pending", &self.pending.len())
            .field("display_state", &self.display_state)
            .field("title", &self.title)
            .field("header_view_type", &self.header_view_type)
            .field("header_identifier", &self.header_identifier)
            .field("header_height", &self.header_height)
            .finish_non_exhaustive()
    }
}
