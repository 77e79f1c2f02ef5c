use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::content::TextMeasurer;
use crate::height::{HeightCache, HeightKey};
use crate::host::{HostSurface, ViewHandle};
use crate::key::{KeyMap, KeySet};
use crate::registration::{RegistrationCache, RegistrationMode};
use crate::row::{Row, RowContext};
use crate::scroll::{ScrollEvent, ScrollRegistry};
use crate::section::{HeaderContext, Section};
use crate::tree::{DefinitionTree, RowKey, SectionKey};
use crate::validate::{self, ConfigErrors};
use crate::{DataSourceOptions, FallbackView, IndexPath, ReuseIdentifier, ViewId, ViewType};

/// Resolves host queries against a [`DefinitionTree`].
///
/// The host surface drives this type: it asks for counts, reuse identifiers, bound views and
/// heights, and reports display, selection, prefetch and scroll events. The data source
/// keeps the bookkeeping the host must not own:
/// - which reuse identifiers the host already knows ([`RegistrationCache`])
/// - which row (or section header) each live view currently belongs to
/// - which rows listen to scroll events
/// - memoized row heights ([`HeightCache`])
///
/// Everything runs on the host's thread; there is no internal synchronization.
pub struct DataSource<V> {
    pub(crate) options: DataSourceOptions,
    pub(crate) tree: DefinitionTree<V>,
    pub(crate) registered: RegistrationCache,
    pub(crate) attached: bool,
    pub(crate) view_rows: KeyMap<ViewId, RowKey>,
    pub(crate) header_views: KeyMap<ViewId, SectionKey>,
    pub(crate) scroll: ScrollRegistry,
    pub(crate) prefetching: KeySet<RowKey>,
    pub(crate) heights: HeightCache,
    pub(crate) measurer: Option<Arc<dyn TextMeasurer>>,
}

impl<V> DataSource<V> {
    pub fn new(options: DataSourceOptions) -> Self {
        ldebug!(
            automatic = options.registration.is_automatic(),
            height_cache_capacity = options.height_cache_capacity,
            "DataSource::new"
        );
        Self {
            heights: HeightCache::with_capacity(options.height_cache_capacity),
            options,
            tree: DefinitionTree::new(),
            registered: RegistrationCache::new(),
            attached: false,
            view_rows: KeyMap::new(),
            header_views: KeyMap::new(),
            scroll: ScrollRegistry::new(),
            prefetching: KeySet::new(),
            measurer: None,
        }
    }

    pub fn options(&self) -> &DataSourceOptions {
        &self.options
    }

    pub fn tree(&self) -> &DefinitionTree<V> {
        &self.tree
    }

    /// Direct structural access to the current tree.
    ///
    /// In automatic registration mode, call [`DataSource::register_all_known_types`] after
    /// adding rows or headers with view types the host has not seen yet.
    pub fn tree_mut(&mut self) -> &mut DefinitionTree<V> {
        &mut self.tree
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn registration_cache(&self) -> &RegistrationCache {
        &self.registered
    }

    pub fn heights(&self) -> &HeightCache {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut HeightCache {
        &mut self.heights
    }

    /// Snapshot of the height cache, oldest entry first.
    pub fn export_height_cache(&self) -> Vec<(HeightKey, f32)> {
        self.heights.export()
    }

    /// Seeds the height cache, e.g. with measurements persisted from an earlier session.
    pub fn import_height_cache(&mut self, entries: impl IntoIterator<Item = (HeightKey, f32)>) {
        self.heights.import(entries);
    }

    pub fn set_measurer(&mut self, measurer: impl TextMeasurer + 'static) {
        self.measurer = Some(Arc::new(measurer));
    }

    pub fn set_shared_measurer(&mut self, measurer: Option<Arc<dyn TextMeasurer>>) {
        self.measurer = measurer;
    }

    pub fn layout_width(&self) -> f32 {
        self.options.layout_width
    }

    /// Sets the width available to row content. Cached heights for other widths are kept.
    pub fn set_layout_width(&mut self, width: f32) {
        self.options.layout_width = width;
    }

    pub fn scroll_registry(&self) -> &ScrollRegistry {
        &self.scroll
    }

    pub fn section_count(&self) -> usize {
        self.tree.section_count()
    }

    pub fn row_count(&self, section: usize) -> usize {
        self.tree.row_count(section)
    }

    pub fn section(&self, index: usize) -> Option<&Section<V>> {
        self.tree.section_at(index)
    }

    /// Resolves `index_path` to a row key.
    ///
    /// The first resolution of a row with a scroll handler subscribes it to scroll events.
    pub fn row_key(&self, index_path: IndexPath) -> Option<RowKey> {
        let key = self.tree.row_key(index_path)?;
        if self.tree.row(key).is_some_and(Row::has_scroll_handler) && self.scroll.subscribe(key) {
            ltrace!(%index_path, "scroll subscriber added");
        }
        Some(key)
    }

    /// Resolves `index_path` to a row. See [`DataSource::row_key`].
    pub fn row(&self, index_path: IndexPath) -> Option<&Row<V>> {
        self.tree.row(self.row_key(index_path)?)
    }

    /// The reuse identifier for `index_path`, or the fallback identifier if nothing is there.
    pub fn reuse_identifier(&self, index_path: IndexPath) -> ReuseIdentifier {
        match self.row(index_path) {
            Some(row) => row.reuse_identifier(),
            None => self.options.fallback_identifier.clone(),
        }
    }

    /// The row `view` is currently bound to.
    pub fn row_for_view(&self, view: ViewId) -> Option<RowKey> {
        self.view_rows
            .get(&view)
            .copied()
            .filter(|key| self.tree.row(*key).is_some())
    }

    /// The section owning `view`, either as its header or through the row it is bound to.
    pub fn section_for_view(&self, view: ViewId) -> Option<SectionKey> {
        if let Some(section) = self.header_views.get(&view) {
            return self
                .tree
                .section(*section)
                .is_some()
                .then_some(*section);
        }
        self.tree.row(self.row_for_view(view)?)?.section()
    }

    /// Associates `view` with `row`, clearing whatever either side was linked to before.
    ///
    /// [`DataSource::bind_view`] and [`DataSource::will_display_row`] do this already; hosts
    /// that configure views through other paths call it directly.
    pub fn link(&mut self, view: ViewId, row: RowKey) {
        if let Some(previous) = self.view_rows.insert(view, row) {
            if previous != row {
                ltrace!(view = view.0, "stale view association cleared");
                self.clear_bound_view(previous, view);
            }
        }
        if let Some(r) = self.tree.row_mut(row) {
            if let Some(old) = r.bound_view.replace(view) {
                if old != view && self.view_rows.get(&old) == Some(&row) {
                    self.view_rows.remove(&old);
                }
            }
        }
    }

    /// Forgets the association of `view`. Returns the row it was bound to.
    pub fn unlink_view(&mut self, view: ViewId) -> Option<RowKey> {
        let row = self.view_rows.remove(&view)?;
        self.clear_bound_view(row, view);
        Some(row)
    }

    fn clear_bound_view(&mut self, row: RowKey, view: ViewId) {
        if let Some(r) = self.tree.row_mut(row) {
            if r.bound_view == Some(view) {
                r.bound_view = None;
            }
        }
    }

    pub(crate) fn link_header(&mut self, view: ViewId, section: SectionKey) {
        if let Some(previous) = self.header_views.insert(view, section) {
            if previous != section {
                if let Some(s) = self.tree.section_mut(previous) {
                    if s.header_view == Some(view) {
                        s.header_view = None;
                    }
                }
            }
        }
        if let Some(s) = self.tree.section_mut(section) {
            if let Some(old) = s.header_view.replace(view) {
                if old != view && self.header_views.get(&old) == Some(&section) {
                    self.header_views.remove(&old);
                }
            }
        }
    }

    /// Height of the row at `index_path`, or the default row height if there is none.
    pub fn height_for(&mut self, index_path: IndexPath) -> f32 {
        match self.row_key(index_path) {
            Some(key) => self.row_height(key),
            None => self.options.default_row_height,
        }
    }

    /// Computed height of `row`.
    ///
    /// Content with a height signature is measured once per (signature, layout width) and
    /// served from the height cache afterwards. Everything else, and everything while no
    /// measurer or no layout width is set, reports the row's preferred height.
    pub fn row_height(&mut self, row: RowKey) -> f32 {
        let Some(r) = self.tree.row(row) else {
            return self.options.default_row_height;
        };
        let width = self.options.layout_width;
        let (Some(measurer), Some(signature)) = (&self.measurer, r.content().height_signature())
        else {
            return r.preferred_height;
        };
        if width.is_nan() || width <= 0.0 {
            return r.preferred_height;
        }
        let key = HeightKey::new(signature, width);
        self.heights
            .get_or_measure(key, || r.content().measure_height(width, &**measurer))
            .unwrap_or(r.preferred_height)
    }

    pub fn header_height_for(&self, section: usize) -> f32 {
        self.section(section).map_or(0.0, |s| s.header_height)
    }

    /// Sum of every row's computed height.
    pub fn content_height(&mut self) -> f32 {
        let keys: Vec<RowKey> = self.tree.rows().map(|(key, _)| key).collect();
        keys.into_iter().map(|key| self.row_height(key)).sum()
    }

    /// Host: the rows at `index_paths` will likely be needed soon.
    ///
    /// A row already being prefetched is not asked again.
    pub fn prefetch(&mut self, index_paths: impl IntoIterator<Item = IndexPath>) {
        self.prune_prefetching();
        for index_path in index_paths {
            let Some(key) = self.row_key(index_path) else {
                continue;
            };
            if !self.prefetching.insert(key) {
                continue;
            }
            if let Some(row) = self.tree.row_mut(key) {
                row.content_mut().prefetch(index_path);
            }
        }
    }

    /// Host: the prefetches for `index_paths` are no longer wanted.
    ///
    /// Index paths that were never prefetched, or whose rows have since been bound, are
    /// ignored.
    pub fn cancel_prefetch(&mut self, index_paths: impl IntoIterator<Item = IndexPath>) {
        self.prune_prefetching();
        for index_path in index_paths {
            let Some(key) = self.row_key(index_path) else {
                continue;
            };
            if !self.prefetching.remove(&key) {
                continue;
            }
            if let Some(row) = self.tree.row_mut(key) {
                row.content_mut().cancel_prefetch(index_path);
            }
        }
    }

    pub fn is_prefetching(&self, row: RowKey) -> bool {
        self.prefetching.contains(&row) && self.tree.row(row).is_some()
    }

    // Rows removed through `tree_mut` leave their keys behind.
    fn prune_prefetching(&mut self) {
        let tree = &self.tree;
        self.prefetching.retain(|key| tree.row(*key).is_some());
    }

    /// Number of rows with a prefetch in flight.
    pub fn prefetch_count(&self) -> usize {
        self.prefetching
            .iter()
            .filter(|key| self.tree.row(**key).is_some())
            .count()
    }

    /// Host: the scroll position changed. Returns how many row handlers ran.
    pub fn did_scroll(&mut self, event: ScrollEvent) -> usize {
        self.scroll.dispatch(&mut self.tree, &event)
    }
}

impl<V: ViewHandle> DataSource<V> {
    /// Binds the data source to `host`.
    ///
    /// Resets the registration cache and view associations, registers the fallback view,
    /// then either the declared table (semi-automatic) or the current tree (automatic).
    pub fn attach<H: HostSurface<View = V>>(&mut self, host: &mut H) {
        self.registered.reset();
        self.view_rows.clear();
        self.header_views.clear();
        self.attached = true;

        let fallback = self.options.fallback_identifier.clone();
        if self.registered.insert_row(&fallback) {
            host.register_row_type(&fallback, ViewType::of::<FallbackView>());
        }

        let RegistrationMode::SemiAutomatic(table) = &self.options.registration else {
            self.register_all_known_types(host);
            return;
        };
        for (identifier, view_type) in &table.rows {
            if self.registered.insert_row(identifier) {
                host.register_row_type(identifier, *view_type);
            }
        }
        for (identifier, view_type) in &table.headers {
            if self.registered.insert_header(identifier) {
                host.register_header_type(identifier, *view_type);
            }
        }
        ldebug!(
            rows = self.registered.row_count(),
            headers = self.registered.header_count(),
            "registered declared view types"
        );
    }

    /// Replaces the tree.
    ///
    /// View associations, scroll subscriptions and prefetch state of the old tree are
    /// dropped. In automatic mode the new tree's view types are registered with `host` (if
    /// attached).
    ///
    /// # Panics
    ///
    /// Panics if the tree has configuration defects (see [`crate::validate`]). In
    /// semi-automatic mode the check only runs in debug builds.
    pub fn set_tree<H: HostSurface<View = V>>(&mut self, host: &mut H, tree: DefinitionTree<V>) {
        if self.options.registration.is_automatic() || cfg!(debug_assertions) {
            validate::enforce(&tree);
        }
        self.install(host, tree);
    }

    /// Like [`DataSource::set_tree`], but returns configuration defects instead of
    /// panicking. On error the current tree is left in place.
    pub fn try_set_tree<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        tree: DefinitionTree<V>,
    ) -> Result<(), ConfigErrors> {
        validate::validate(&tree)?;
        self.install(host, tree);
        Ok(())
    }

    fn install<H: HostSurface<View = V>>(&mut self, host: &mut H, mut tree: DefinitionTree<V>) {
        tree.set_generation(self.tree.generation().wrapping_add(1));
        self.tree = tree;
        // Keys from the previous tree could alias keys of the new one.
        self.view_rows.clear();
        self.header_views.clear();
        self.scroll.clear();
        self.prefetching.clear();
        if self.options.clear_heights_on_replace {
            self.heights.clear();
        }
        ldebug!(
            sections = self.tree.section_count(),
            rows = self.tree.total_row_count(),
            generation = self.tree.generation(),
            "tree installed"
        );
        if self.attached && self.options.registration.is_automatic() {
            self.register_types(host);
        }
    }

    /// Registers every row and header view type in the tree that `host` has not seen yet.
    /// Returns how many identifiers were newly registered.
    ///
    /// # Panics
    ///
    /// Panics if the tree has configuration defects, e.g. a header view type without an
    /// identifier.
    pub fn register_all_known_types<H: HostSurface<View = V>>(&mut self, host: &mut H) -> usize {
        validate::enforce(&self.tree);
        self.register_types(host)
    }

    fn register_types<H: HostSurface<View = V>>(&mut self, host: &mut H) -> usize {
        let mut added = 0usize;
        for (section_key, section) in self.tree.sections() {
            if let Some((identifier, view_type)) = section.header_registration() {
                if self.registered.insert_header(identifier) {
                    host.register_header_type(identifier, view_type);
                    added += 1;
                }
            }
            for (_, row) in self.tree.rows_in(section_key) {
                let identifier = row.reuse_identifier();
                if self.registered.insert_row(&identifier) {
                    host.register_row_type(&identifier, row.view_type());
                    added += 1;
                }
            }
        }
        if added > 0 {
            ldebug!(added, "registered view types");
        }
        added
    }

    /// Host: produce a configured view for `index_path`.
    ///
    /// Dequeues a view for the resolved reuse identifier, clears any association the
    /// recycled view still had, lets the row configure it, and links the two.
    pub fn bind_view<H: HostSurface<View = V>>(&mut self, host: &mut H, index_path: IndexPath) -> V {
        let identifier = self.reuse_identifier(index_path);
        let mut view = host.dequeue_row_view(&identifier, index_path);
        let view_id = view.view_id();
        self.unlink_view(view_id);

        let Some(key) = self.row_key(index_path) else {
            ldebug!(%index_path, "bind_view: no row, returning fallback view");
            return view;
        };
        self.prefetching.remove(&key);
        if let Some(row) = self.tree.row_mut(key) {
            let mut cx = RowContext {
                view: &mut view,
                index_path,
                row: key,
            };
            row.configure(&mut cx);
        }
        self.link(view_id, key);
        view
    }

    /// Host: produce the header view for `section`, if it has one.
    pub fn header_view_for<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        section: usize,
    ) -> Option<V> {
        let key = self.tree.section_key(section)?;
        let identifier = self.tree.section(key)?.header_identifier()?.clone();
        let mut view = host.dequeue_header_view(&identifier)?;
        self.link_header(view.view_id(), key);
        if let Some(s) = self.tree.section_mut(key) {
            let mut cx = HeaderContext {
                view: &mut view,
                section,
                key,
            };
            s.configure_header(&mut cx);
        }
        Some(view)
    }
}

impl<V> core::fmt::Debug for DataSource<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataSource")
            .field("options", &self.options)
            .field("tree", &self.tree)
            .field("attached", &self.attached)
            .field("registered", &self.registered)
            .field("bound_views", &self.view_rows.len())
            .field("scroll_subscribers", &self.scroll.len())
            .field("heights", &self.heights.len())
            .finish_non_exhaustive()
    }
}
