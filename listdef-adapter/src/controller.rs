use alloc::boxed::Box;

use listdef::{
    ConfigErrors, DataSource, DataSourceOptions, DefinitionTree, HostSurface, IndexPath,
    ReuseIdentifier, RowKey, ScrollEvent, ViewId,
};

use crate::{
    EmptyStatePresenter, KeyboardMonitor, QueueStats, SerialQueue, SurfaceGeometry,
    empty_state_area,
};

/// Builds the list content. Called once per content refresh.
pub trait ContentGenerator<V> {
    fn generate(&mut self) -> DefinitionTree<V>;
}

impl<V, F> ContentGenerator<V> for F
where
    F: FnMut() -> DefinitionTree<V>,
{
    fn generate(&mut self) -> DefinitionTree<V> {
        self()
    }
}

/// Deferred work a [`ListController`] coalesces until [`ListController::flush`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relayout {
    /// Recompute row heights (e.g. after a layout width change).
    Heights,
    /// Regenerate the whole tree. Implies [`Relayout::Heights`].
    Reload,
}

impl Relayout {
    /// The request that covers both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        self.max(other)
    }
}

struct EmptyState {
    presenter: Box<dyn EmptyStatePresenter>,
    visible: bool,
}

/// A framework-neutral controller that owns a host surface, a [`DataSource`] and the
/// content generator feeding it.
///
/// Adapters drive it by calling:
/// - `load` once the host surface exists, `reload`/`request_reload` when content changes
/// - the host notification methods (`bind_view`, `will_display_row`, `did_scroll`, ...)
///   as the surface reports them
/// - `flush` once per frame/run-loop turn to run coalesced relayouts
///
/// An optional empty-state placeholder is shown, and scrolling disabled, while the tree
/// has no sections. With a keyboard monitor the placeholder stays centered in the part of
/// the surface the keyboard leaves uncovered.
pub struct ListController<H: HostSurface, G> {
    host: H,
    data_source: DataSource<H::View>,
    generator: G,
    relayout: SerialQueue<Relayout>,
    empty_state: Option<EmptyState>,
    keyboard: Option<Box<dyn KeyboardMonitor>>,
    adjust_for_keyboard: bool,
    observing_keyboard: bool,
    geometry: Option<SurfaceGeometry>,
    content_height: f32,
    loaded: bool,
}

impl<H, G> ListController<H, G>
where
    H: HostSurface,
    G: ContentGenerator<H::View>,
{
    pub fn new(host: H, options: DataSourceOptions, generator: G) -> Self {
        Self {
            host,
            data_source: DataSource::new(options),
            generator,
            relayout: SerialQueue::new(),
            empty_state: None,
            keyboard: None,
            adjust_for_keyboard: true,
            observing_keyboard: false,
            geometry: None,
            content_height: 0.0,
            loaded: false,
        }
    }

    pub fn with_empty_state(mut self, presenter: impl EmptyStatePresenter + 'static) -> Self {
        self.empty_state = Some(EmptyState {
            presenter: Box::new(presenter),
            visible: false,
        });
        self
    }

    pub fn with_keyboard_monitor(mut self, monitor: impl KeyboardMonitor + 'static) -> Self {
        self.keyboard = Some(Box::new(monitor));
        self
    }

    /// Whether the empty-state placeholder avoids the keyboard. On by default.
    pub fn set_adjust_for_keyboard(&mut self, adjust: bool) {
        self.adjust_for_keyboard = adjust;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn data_source(&self) -> &DataSource<H::View> {
        &self.data_source
    }

    pub fn data_source_mut(&mut self) -> &mut DataSource<H::View> {
        &mut self.data_source
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Sum of all row heights, as of the last reload or height relayout.
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn is_empty_state_visible(&self) -> bool {
        self.empty_state.as_ref().is_some_and(|s| s.visible)
    }

    pub fn geometry(&self) -> Option<SurfaceGeometry> {
        self.geometry
    }

    /// Attaches the host and generates the first tree. Later calls do nothing.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.data_source.attach(&mut self.host);
        adebug!("list controller loaded");
        self.reload();
    }

    /// Regenerates and installs the tree now.
    ///
    /// # Panics
    ///
    /// Panics if the generated tree has configuration defects.
    pub fn reload(&mut self) {
        let tree = self.generator.generate();
        self.data_source.set_tree(&mut self.host, tree);
        self.after_tree_change();
    }

    /// Like [`ListController::reload`], but reports configuration defects instead of
    /// panicking. The previous tree stays in place on error.
    pub fn try_reload(&mut self) -> Result<(), ConfigErrors> {
        let tree = self.generator.generate();
        self.data_source.try_set_tree(&mut self.host, tree)?;
        self.after_tree_change();
        Ok(())
    }

    fn after_tree_change(&mut self) {
        // A fresh tree supersedes anything still queued.
        if self.relayout.cancel().is_some() {
            atrace!("pending relayout dropped by reload");
        }
        self.content_height = self.data_source.content_height();
        self.update_empty_state();
    }

    fn update_empty_state(&mut self) {
        let Some(state) = self.empty_state.as_mut() else {
            return;
        };
        if self.adjust_for_keyboard && !self.observing_keyboard {
            if let Some(monitor) = self.keyboard.as_mut() {
                monitor.start_observing();
                self.observing_keyboard = true;
            }
        }
        let empty = self.data_source.tree().is_empty();
        state.visible = empty;
        state.presenter.set_visible(empty);
        self.host.set_scroll_enabled(!empty);
        if empty {
            self.place_empty_state();
        }
    }

    fn place_empty_state(&mut self) {
        // Without geometry the surface is not on screen yet.
        let Some(geometry) = self.geometry else {
            return;
        };
        let keyboard = if self.adjust_for_keyboard {
            self.keyboard.as_ref().and_then(|m| m.keyboard_frame())
        } else {
            None
        };
        if let Some(state) = self.empty_state.as_mut() {
            if state.visible {
                state.presenter.place(empty_state_area(&geometry, keyboard));
            }
        }
    }

    /// Host: the surface moved or resized.
    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.geometry = Some(geometry);
        self.place_empty_state();
    }

    /// Host: the keyboard frame is about to change.
    pub fn keyboard_will_change(&mut self) {
        if self.adjust_for_keyboard {
            self.place_empty_state();
        }
    }

    /// Queues a reload for the next [`ListController::flush`].
    pub fn request_reload(&mut self) {
        self.relayout.push_merged(Relayout::Reload, Relayout::merge);
    }

    /// Queues a height relayout for the next [`ListController::flush`].
    pub fn request_relayout(&mut self) {
        self.relayout.push_merged(Relayout::Heights, Relayout::merge);
    }

    pub fn is_relayout_pending(&self) -> bool {
        self.relayout.is_pending()
    }

    pub fn relayout_stats(&self) -> QueueStats {
        self.relayout.stats()
    }

    /// Runs the pending relayout, if any. Returns what ran.
    pub fn flush(&mut self) -> Option<Relayout> {
        let work = self.relayout.take()?;
        match work {
            Relayout::Reload => self.reload(),
            Relayout::Heights => self.content_height = self.data_source.content_height(),
        }
        atrace!(?work, "relayout flushed");
        Some(work)
    }

    /// Changes the width available to rows and queues a height relayout if it differs.
    pub fn set_layout_width(&mut self, width: f32) {
        if self.data_source.layout_width() == width {
            return;
        }
        self.data_source.set_layout_width(width);
        self.request_relayout();
    }

    pub fn section_count(&self) -> usize {
        self.data_source.section_count()
    }

    pub fn row_count(&self, section: usize) -> usize {
        self.data_source.row_count(section)
    }

    pub fn reuse_identifier(&self, index_path: IndexPath) -> ReuseIdentifier {
        self.data_source.reuse_identifier(index_path)
    }

    pub fn bind_view(&mut self, index_path: IndexPath) -> H::View {
        self.data_source.bind_view(&mut self.host, index_path)
    }

    pub fn header_view(&mut self, section: usize) -> Option<H::View> {
        self.data_source.header_view_for(&mut self.host, section)
    }

    pub fn height_for(&mut self, index_path: IndexPath) -> f32 {
        self.data_source.height_for(index_path)
    }

    pub fn header_height_for(&self, section: usize) -> f32 {
        self.data_source.header_height_for(section)
    }

    /// Associates a view configured outside [`ListController::bind_view`] with `row`.
    pub fn link(&mut self, view: ViewId, row: RowKey) {
        self.data_source.link(view, row);
    }

    pub fn will_display_row(&mut self, index_path: IndexPath, view: &mut H::View) -> bool {
        self.data_source
            .will_display_row(&mut self.host, index_path, view)
    }

    pub fn did_end_display_row(&mut self, index_path: IndexPath, view: &mut H::View) -> bool {
        self.data_source.did_end_display_row(index_path, view)
    }

    pub fn will_display_header(&mut self, section: usize, view: &mut H::View) -> bool {
        self.data_source.will_display_header(section, view)
    }

    pub fn did_end_display_header(&mut self, section: usize, view: &mut H::View) -> bool {
        self.data_source.did_end_display_header(section, view)
    }

    pub fn did_select_row(&mut self, index_path: IndexPath) -> bool {
        self.data_source.did_select_row(&mut self.host, index_path)
    }

    pub fn did_deselect_row(&mut self, index_path: IndexPath) -> bool {
        self.data_source.did_deselect_row(&mut self.host, index_path)
    }

    pub fn prefetch(&mut self, index_paths: impl IntoIterator<Item = IndexPath>) {
        self.data_source.prefetch(index_paths);
    }

    pub fn cancel_prefetch(&mut self, index_paths: impl IntoIterator<Item = IndexPath>) {
        self.data_source.cancel_prefetch(index_paths);
    }

    pub fn did_scroll(&mut self, event: ScrollEvent) -> usize {
        self.data_source.did_scroll(event)
    }
}

impl<H: HostSurface, G> core::fmt::Debug for ListController<H, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListController")
            .field("data_source", &self.data_source)
            .field("relayout", &self.relayout.pending())
            .field(
                "empty_state_visible",
                &self.empty_state.as_ref().is_some_and(|s| s.visible),
            )
            .field("geometry", &self.geometry)
            .field("content_height", &self.content_height)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}
