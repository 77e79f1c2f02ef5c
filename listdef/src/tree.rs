use alloc::vec::Vec;
use core::mem;

use slotmap::{SlotMap, new_key_type};

use crate::IndexPath;
use crate::row::Row;
use crate::section::Section;

new_key_type! {
    /// Stable handle to a section stored in a [`DefinitionTree`].
    pub struct SectionKey;
    /// Stable handle to a row stored in a [`DefinitionTree`].
    pub struct RowKey;
}

/// The ordered section → row structure describing a list's content.
///
/// Sections and rows live in generational arenas. Relationships (a row's section, a view's
/// row) are keys, so a key that outlived its node simply stops resolving.
///
/// Every structural mutation keeps this invariant: for each attached row, `position` is its
/// index in the section's row sequence and `section` is that section's key; for each
/// attached section, `position` is its index in the tree.
pub struct DefinitionTree<V> {
    sections: SlotMap<SectionKey, Section<V>>,
    rows: SlotMap<RowKey, Row<V>>,
    order: Vec<SectionKey>,
    generation: u64,
}

impl<V> Default for DefinitionTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DefinitionTree<V> {
    pub fn new() -> Self {
        Self {
            sections: SlotMap::with_key(),
            rows: SlotMap::with_key(),
            order: Vec::new(),
            generation: 0,
        }
    }

    /// Builds a tree from `sections` in one go.
    pub fn from_sections(sections: impl IntoIterator<Item = Section<V>>) -> Self {
        let mut tree = Self::new();
        for section in sections {
            tree.append_section(section);
        }
        tree
    }

    /// Bumped on every [`DefinitionTree::replace_sections`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.order.len()
    }

    /// Rows in the section at `section`, `0` if out of range.
    pub fn row_count(&self, section: usize) -> usize {
        self.section_at(section).map_or(0, Section::row_count)
    }

    /// Rows across all sections.
    pub fn total_row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn section_key(&self, index: usize) -> Option<SectionKey> {
        self.order.get(index).copied()
    }

    pub fn section_at(&self, index: usize) -> Option<&Section<V>> {
        self.sections.get(self.section_key(index)?)
    }

    pub fn section(&self, key: SectionKey) -> Option<&Section<V>> {
        self.sections.get(key)
    }

    pub fn section_mut(&mut self, key: SectionKey) -> Option<&mut Section<V>> {
        self.sections.get_mut(key)
    }

    pub fn row_key(&self, index_path: IndexPath) -> Option<RowKey> {
        self.section_at(index_path.section)?
            .rows
            .get(index_path.row)
            .copied()
    }

    pub fn row_at(&self, index_path: IndexPath) -> Option<&Row<V>> {
        self.rows.get(self.row_key(index_path)?)
    }

    pub fn row(&self, key: RowKey) -> Option<&Row<V>> {
        self.rows.get(key)
    }

    pub fn row_mut(&mut self, key: RowKey) -> Option<&mut Row<V>> {
        self.rows.get_mut(key)
    }

    /// Current index path of `row`, `None` if it is not in the tree.
    pub fn index_path(&self, row: RowKey) -> Option<IndexPath> {
        self.rows.get(row)?.try_index_path(self)
    }

    /// Sections in display order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKey, &Section<V>)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.sections.get(*key).map(|s| (*key, s)))
    }

    /// Rows of `section` in display order. Empty for an unknown key.
    pub fn rows_in(&self, section: SectionKey) -> impl Iterator<Item = (RowKey, &Row<V>)> + '_ {
        self.sections
            .get(section)
            .map(|s| s.rows.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |key| self.rows.get(*key).map(|r| (*key, r)))
    }

    /// Every row in display order.
    pub fn rows(&self) -> impl Iterator<Item = (RowKey, &Row<V>)> + '_ {
        self.order.iter().flat_map(move |key| self.rows_in(*key))
    }

    pub fn append_section(&mut self, section: Section<V>) -> SectionKey {
        let at = self.order.len();
        self.insert_section(section, at)
    }

    /// Inserts `section` at `at` (clamped to the end) and renumbers the sections after it.
    pub fn insert_section(&mut self, section: Section<V>, at: usize) -> SectionKey {
        let at = at.min(self.order.len());
        let key = self.store_section(section);
        self.order.insert(at, key);
        self.renumber_sections(at);
        ltrace!(at, sections = self.order.len(), "section inserted");
        key
    }

    /// Removes `section` and all of its rows. Returns `false` if it was not in the tree.
    pub fn remove_section(&mut self, section: SectionKey) -> bool {
        let Some(at) = self.order.iter().position(|k| *k == section) else {
            return false;
        };
        self.order.remove(at);
        if let Some(removed) = self.sections.remove(section) {
            for row in removed.rows {
                self.rows.remove(row);
            }
        }
        self.renumber_sections(0);
        true
    }

    /// Drops every section and row, then appends `sections`.
    pub fn replace_sections(
        &mut self,
        sections: impl IntoIterator<Item = Section<V>>,
    ) -> Vec<SectionKey> {
        self.order.clear();
        self.sections.clear();
        self.rows.clear();
        self.generation = self.generation.wrapping_add(1);
        let keys: Vec<SectionKey> = sections
            .into_iter()
            .map(|s| self.append_section(s))
            .collect();
        ldebug!(
            sections = keys.len(),
            rows = self.rows.len(),
            generation = self.generation,
            "sections replaced"
        );
        keys
    }

    /// Appends `row` to `section`. Returns `None` (dropping the row) for an unknown section.
    pub fn append_row(&mut self, section: SectionKey, row: Row<V>) -> Option<RowKey> {
        let at = self.sections.get(section)?.rows.len();
        self.insert_row(section, row, at)
    }

    /// Inserts `row` into `section` at `at` (clamped to the end). Only rows from `at`
    /// onward are renumbered.
    pub fn insert_row(&mut self, section: SectionKey, row: Row<V>, at: usize) -> Option<RowKey> {
        if !self.sections.contains_key(section) {
            lwarn!("insert_row: unknown section");
            return None;
        }
        let key = self.rows.insert(row);
        let rows = &mut self.sections[section].rows;
        let at = at.min(rows.len());
        rows.insert(at, key);
        self.renumber_rows(section, at);
        Some(key)
    }

    /// Removes `row` from `section`. Returns `false`, changing nothing, if the row is not in
    /// that section.
    pub fn remove_row(&mut self, section: SectionKey, row: RowKey) -> bool {
        let Some(s) = self.sections.get_mut(section) else {
            return false;
        };
        let Some(at) = s.rows.iter().position(|k| *k == row) else {
            return false;
        };
        s.rows.remove(at);
        self.rows.remove(row);
        self.renumber_rows(section, 0);
        true
    }

    /// Replaces the rows of `section` with `rows`. Returns the new keys (empty for an
    /// unknown section).
    pub fn replace_rows(
        &mut self,
        section: SectionKey,
        rows: impl IntoIterator<Item = Row<V>>,
    ) -> Vec<RowKey> {
        let Some(s) = self.sections.get_mut(section) else {
            return Vec::new();
        };
        let old = mem::take(&mut s.rows);
        for key in old {
            self.rows.remove(key);
        }
        let keys: Vec<RowKey> = rows.into_iter().map(|r| self.rows.insert(r)).collect();
        self.sections[section].rows = keys.clone();
        self.renumber_rows(section, 0);
        keys
    }

    fn store_section(&mut self, mut section: Section<V>) -> SectionKey {
        let pending = mem::take(&mut section.pending);
        // Rows already owned by another tree are not carried over.
        section.rows.clear();
        section.position = None;
        let key = self.sections.insert(section);
        if !pending.is_empty() {
            let keys: Vec<RowKey> = pending.into_iter().map(|r| self.rows.insert(r)).collect();
            self.sections[key].rows = keys;
            self.renumber_rows(key, 0);
        }
        key
    }

    fn renumber_sections(&mut self, from: usize) {
        for (i, key) in self.order.iter().enumerate().skip(from) {
            if let Some(section) = self.sections.get_mut(*key) {
                section.position = Some(i);
            }
        }
    }

    fn renumber_rows(&mut self, section: SectionKey, from: usize) {
        let Some(s) = self.sections.get(section) else {
            return;
        };
        for (i, key) in s.rows.iter().enumerate().skip(from) {
            if let Some(row) = self.rows.get_mut(*key) {
                row.position = Some(i);
                row.section = Some(section);
            }
        }
    }
}

impl<V> core::fmt::Debug for DefinitionTree<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefinitionTree")
            .field("sections", &self.order.len())
            .field("rows", &self.rows.len())
            .field("generation", &self.generation)
            .finish()
    }
}
