use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::content::{LabelView, PlainRow, RowContent, TextRow};
use crate::lifecycle::DisplayState;
use crate::scroll::{ScrollContext, ScrollEvent, ScrollHandler};
use crate::tree::{DefinitionTree, RowKey, SectionKey};
use crate::{IndexPath, ReuseIdentifier, SelectionStyle, ViewId, ViewType};

/// Height used for rows that cannot (or need not) be measured.
pub const DEFAULT_ROW_HEIGHT: f32 = 44.0;

/// What a row hook gets to work with.
pub struct RowContext<'a, V> {
    pub view: &'a mut V,
    pub index_path: IndexPath,
    pub row: RowKey,
}

/// A declarative row callback.
pub type RowHook<V> = Box<dyn FnMut(&mut RowContext<'_, V>)>;

/// One item of a [`crate::Section`].
///
/// A row is detached (no position, no section) until it is added to a
/// [`DefinitionTree`]; the tree keeps `position` and `section` in sync from then on.
pub struct Row<V> {
    pub(crate) position: Option<usize>,
    pub(crate) section: Option<SectionKey>,
    pub(crate) display_state: DisplayState,
    pub(crate) bound_view: Option<ViewId>,
    pub(crate) on_scroll: Option<ScrollHandler>,

    pub preferred_height: f32,
    pub selection_style: SelectionStyle,

    identifier: Option<ReuseIdentifier>,
    content: Box<dyn RowContent<V>>,
    configure: Option<RowHook<V>>,
    before_display: Option<RowHook<V>>,
    after_display: Option<RowHook<V>>,
    on_select: Option<RowHook<V>>,
    on_deselect: Option<RowHook<V>>,
}

impl<V> Row<V> {
    pub fn new(content: impl RowContent<V> + 'static) -> Self {
        Self {
            position: None,
            section: None,
            display_state: DisplayState::Offscreen,
            bound_view: None,
            on_scroll: None,
            preferred_height: DEFAULT_ROW_HEIGHT,
            selection_style: SelectionStyle::None,
            identifier: None,
            content: Box::new(content),
            configure: None,
            before_display: None,
            after_display: None,
            on_select: None,
            on_deselect: None,
        }
    }

    pub fn with_preferred_height(mut self, height: f32) -> Self {
        self.preferred_height = height;
        self
    }

    pub fn with_selection_style(mut self, style: SelectionStyle) -> Self {
        self.selection_style = style;
        self
    }

    /// Overrides the reuse identifier derived from the content's view type.
    pub fn with_reuse_identifier(mut self, identifier: impl Into<ReuseIdentifier>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Runs after the content variant has configured a freshly bound view.
    pub fn on_configure(mut self, f: impl FnMut(&mut RowContext<'_, V>) + 'static) -> Self {
        self.configure = Some(Box::new(f));
        self
    }

    pub fn before_display(mut self, f: impl FnMut(&mut RowContext<'_, V>) + 'static) -> Self {
        self.before_display = Some(Box::new(f));
        self
    }

    pub fn after_display(mut self, f: impl FnMut(&mut RowContext<'_, V>) + 'static) -> Self {
        self.after_display = Some(Box::new(f));
        self
    }

    pub fn on_select(mut self, f: impl FnMut(&mut RowContext<'_, V>) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    pub fn on_deselect(mut self, f: impl FnMut(&mut RowContext<'_, V>) + 'static) -> Self {
        self.on_deselect = Some(Box::new(f));
        self
    }

    /// Subscribes the row to scroll events once the data source first resolves it.
    pub fn on_scroll(mut self, f: impl FnMut(&ScrollEvent, &ScrollContext) + 'static) -> Self {
        self.on_scroll = Some(Box::new(f));
        self
    }

    /// Position within the owning section, `None` while detached.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn section(&self) -> Option<SectionKey> {
        self.section
    }

    pub fn is_attached(&self) -> bool {
        self.section.is_some() && self.position.is_some()
    }

    /// The row's index path in `tree`, or `None` if it is not attached there.
    pub fn try_index_path(&self, tree: &DefinitionTree<V>) -> Option<IndexPath> {
        let section = tree.section(self.section?)?.position()?;
        Some(IndexPath::new(section, self.position?))
    }

    /// The row's index path in `tree`.
    ///
    /// # Panics
    ///
    /// Panics if the row has no owning section. A row only has an index path once it is part
    /// of a tree.
    pub fn index_path(&self, tree: &DefinitionTree<V>) -> IndexPath {
        match self.try_index_path(tree) {
            Some(path) => path,
            None => panic!("row has no owning section (position {:?})", self.position),
        }
    }

    pub fn display_state(&self) -> DisplayState {
        self.display_state
    }

    pub fn is_onscreen(&self) -> bool {
        self.display_state.is_onscreen()
    }

    /// The view currently bound to this row, if the host has not recycled it since.
    pub fn bound_view(&self) -> Option<ViewId> {
        self.bound_view
    }

    pub fn has_scroll_handler(&self) -> bool {
        self.on_scroll.is_some()
    }

    pub fn view_type(&self) -> ViewType {
        self.content.view_type()
    }

    pub fn reuse_identifier(&self) -> ReuseIdentifier {
        match &self.identifier {
            Some(identifier) => identifier.clone(),
            None => self.content.view_type().reuse_identifier(),
        }
    }

    pub fn content(&self) -> &dyn RowContent<V> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> &mut dyn RowContent<V> {
        self.content.as_mut()
    }

    pub(crate) fn configure(&mut self, cx: &mut RowContext<'_, V>) {
        self.content.configure(cx);
        if let Some(f) = self.configure.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn will_display(&mut self, cx: &mut RowContext<'_, V>) {
        self.content.will_display(cx);
        if let Some(f) = self.before_display.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn did_end_display(&mut self, cx: &mut RowContext<'_, V>) {
        self.content.did_end_display(cx);
        if let Some(f) = self.after_display.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn did_select(&mut self, cx: &mut RowContext<'_, V>) {
        self.content.did_select(cx);
        if let Some(f) = self.on_select.as_mut() {
            f(cx);
        }
    }

    pub(crate) fn did_deselect(&mut self, cx: &mut RowContext<'_, V>) {
        self.content.did_deselect(cx);
        if let Some(f) = self.on_deselect.as_mut() {
            f(cx);
        }
    }
}

impl<V: LabelView> Row<V> {
    /// A row showing `title` in a view of type `T`.
    pub fn plain<T: 'static>(title: impl Into<String>) -> Self {
        Self::new(PlainRow::new::<T>(Some(title.into())))
    }

    /// A self-sizing text row rendered with views of type `T`.
    pub fn text<T: 'static>(text: impl Into<String>) -> Self {
        Self::new(TextRow::new::<T>(text))
    }
}

impl<V> fmt::Debug for Row<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("position", &self.position)
            .field("section", &self.section)
            .field("display_state", &self.display_state)
            .field("bound_view", &self.bound_view)
            .field("reuse_identifier", &self.reuse_identifier())
            .field("preferred_height", &self.preferred_height)
            .field("selection_style", &self.selection_style)
            .field("on_scroll", &self.on_scroll.is_some())
            .finish_non_exhaustive()
    }
}
