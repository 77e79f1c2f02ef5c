use crate::data_source::DataSource;
use crate::host::{HostSurface, ViewHandle};
use crate::row::RowContext;
use crate::section::HeaderContext;
use crate::tree::RowKey;
use crate::IndexPath;

/// Whether a row or section header is currently shown by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayState {
    #[default]
    Offscreen,
    Onscreen,
}

impl DisplayState {
    pub fn is_onscreen(self) -> bool {
        matches!(self, Self::Onscreen)
    }

    /// Moves to `next`. Returns `true` if the state changed.
    pub(crate) fn transition(&mut self, next: DisplayState) -> bool {
        if *self == next {
            return false;
        }
        *self = next;
        true
    }
}

impl<V: ViewHandle> DataSource<V> {
    /// Host: the row view at `index_path` is about to appear.
    ///
    /// The selection style is applied every time; display hooks run only when the row
    /// actually goes from offscreen to onscreen. Returns whether it did.
    pub fn will_display_row<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        index_path: IndexPath,
        view: &mut V,
    ) -> bool {
        let Some(key) = self.row_key(index_path) else {
            ldebug!(%index_path, "will_display_row: no row");
            return false;
        };
        let view_id = view.view_id();
        let Some(row) = self.tree.row_mut(key) else {
            return false;
        };
        host.apply_selection_style(view, row.selection_style);
        let entered = row.display_state.transition(DisplayState::Onscreen);
        if entered {
            let mut cx = RowContext {
                view: &mut *view,
                index_path,
                row: key,
            };
            row.will_display(&mut cx);
        } else {
            ltrace!(%index_path, "row already onscreen");
        }
        self.link(view_id, key);
        entered
    }

    /// Host: the row view at `index_path` went offscreen.
    ///
    /// The row the view is linked to wins over `index_path`, which may already point at
    /// different content after a structural change. Rows that no longer exist are skipped.
    pub fn did_end_display_row(&mut self, index_path: IndexPath, view: &mut V) -> bool {
        let Some(key) = self.ending_row(index_path, view) else {
            ldebug!(%index_path, "did_end_display_row: no row");
            return false;
        };
        let at = self.tree.index_path(key).unwrap_or(index_path);
        let Some(row) = self.tree.row_mut(key) else {
            return false;
        };
        if !row.display_state.transition(DisplayState::Offscreen) {
            return false;
        }
        let mut cx = RowContext {
            view,
            index_path: at,
            row: key,
        };
        row.did_end_display(&mut cx);
        true
    }

    /// A linked view only ever ends its own row; the index path is used for unlinked views.
    fn ending_row(&self, index_path: IndexPath, view: &V) -> Option<RowKey> {
        match self.view_rows.get(&view.view_id()) {
            Some(key) => self.tree.row(*key).map(|_| *key),
            None => self.tree.row_key(index_path),
        }
    }

    /// Host: the header view of `section` is about to appear.
    pub fn will_display_header(&mut self, section: usize, view: &mut V) -> bool {
        let Some(key) = self.tree.section_key(section) else {
            return false;
        };
        let view_id = view.view_id();
        let Some(s) = self.tree.section_mut(key) else {
            return false;
        };
        let entered = s.display_state.transition(DisplayState::Onscreen);
        if entered {
            let mut cx = HeaderContext {
                view: &mut *view,
                section,
                key,
            };
            s.will_display_header(&mut cx);
        }
        self.link_header(view_id, key);
        entered
    }

    /// Host: the header view of `section` went offscreen.
    pub fn did_end_display_header(&mut self, section: usize, view: &mut V) -> bool {
        let Some(key) = self.tree.section_key(section) else {
            return false;
        };
        let Some(s) = self.tree.section_mut(key) else {
            return false;
        };
        if !s.display_state.transition(DisplayState::Offscreen) {
            return false;
        }
        let mut cx = HeaderContext { view, section, key };
        s.did_end_display_header(&mut cx);
        true
    }

    /// Host: the user selected the row at `index_path`.
    ///
    /// Hooks run against the view the host currently shows there; nothing happens if the
    /// row is not visible.
    pub fn did_select_row<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        index_path: IndexPath,
    ) -> bool {
        self.with_visible_row(host, index_path, |row, cx| row.did_select(cx))
    }

    /// Host: the row at `index_path` was deselected.
    pub fn did_deselect_row<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        index_path: IndexPath,
    ) -> bool {
        self.with_visible_row(host, index_path, |row, cx| row.did_deselect(cx))
    }

    fn with_visible_row<H: HostSurface<View = V>>(
        &mut self,
        host: &mut H,
        index_path: IndexPath,
        f: impl FnOnce(&mut crate::Row<V>, &mut RowContext<'_, V>),
    ) -> bool {
        let Some(key) = self.row_key(index_path) else {
            return false;
        };
        let Some(mut view) = host.visible_row_view(index_path) else {
            ltrace!(%index_path, "selection change for a row that is not visible");
            return false;
        };
        let Some(row) = self.tree.row_mut(key) else {
            return false;
        };
        let mut cx = RowContext {
            view: &mut view,
            index_path,
            row: key,
        };
        f(row, &mut cx);
        true
    }
}
