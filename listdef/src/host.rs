use crate::{IndexPath, ReuseIdentifier, SelectionStyle, ViewId, ViewType};

/// A handle to a recyclable view instance owned by the host.
///
/// Handles are usually cheap clones (an index into the host's pool, a shared pointer, ...).
/// The data source only ever stores the [`ViewId`], never the handle itself.
pub trait ViewHandle {
    fn view_id(&self) -> ViewId;
}

/// The virtualized scrolling surface a [`crate::DataSource`] feeds.
///
/// The host owns the view pools. Registration tells it how to construct views for a reuse
/// identifier; dequeue hands out a recycled (or freshly built) view for one.
pub trait HostSurface {
    type View: ViewHandle;

    fn register_row_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType);

    fn register_header_type(&mut self, identifier: &ReuseIdentifier, view_type: ViewType);

    /// Returns a view for `identifier`, recycling one if possible.
    ///
    /// Must always succeed for registered identifiers; constructing on demand is the host's
    /// job.
    fn dequeue_row_view(
        &mut self,
        identifier: &ReuseIdentifier,
        index_path: IndexPath,
    ) -> Self::View;

    fn dequeue_header_view(&mut self, identifier: &ReuseIdentifier) -> Option<Self::View>;

    /// The view currently displayed at `index_path`, if it is on screen.
    fn visible_row_view(&mut self, index_path: IndexPath) -> Option<Self::View>;

    fn apply_selection_style(&mut self, _view: &mut Self::View, _style: SelectionStyle) {}

    /// Enables or disables user scrolling (disabled while the list is empty).
    fn set_scroll_enabled(&mut self, _enabled: bool) {}
}
