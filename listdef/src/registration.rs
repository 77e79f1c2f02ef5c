use alloc::vec::Vec;

use crate::key::KeySet;
use crate::{ReuseIdentifier, ViewType};

/// An explicit identifier → view type table, used by
/// [`RegistrationMode::SemiAutomatic`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrationTable {
    pub rows: Vec<(ReuseIdentifier, ViewType)>,
    pub headers: Vec<(ReuseIdentifier, ViewType)>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, identifier: impl Into<ReuseIdentifier>, view_type: ViewType) -> Self {
        self.rows.push((identifier.into(), view_type));
        self
    }

    /// Registers views of type `T` under their type name.
    pub fn with_row_type<T: 'static>(self) -> Self {
        let view_type = ViewType::of::<T>();
        self.with_row(view_type.reuse_identifier(), view_type)
    }

    pub fn with_header(
        mut self,
        identifier: impl Into<ReuseIdentifier>,
        view_type: ViewType,
    ) -> Self {
        self.headers.push((identifier.into(), view_type));
        self
    }

    pub fn with_header_type<T: 'static>(self) -> Self {
        let view_type = ViewType::of::<T>();
        self.with_header(view_type.reuse_identifier(), view_type)
    }
}

/// How view types reach the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RegistrationMode {
    /// Walk the tree on every replacement and register whatever is new.
    ///
    /// Always correct; costs a full walk per refresh.
    #[default]
    Automatic,
    /// Register a declared table once, when the host is attached. Trees are never walked.
    ///
    /// Rows using identifiers missing from the table fail at the host's dequeue.
    SemiAutomatic(RegistrationTable),
}

impl RegistrationMode {
    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}

/// Identifiers already registered with the current host.
///
/// Append-only for the lifetime of a host binding.
#[derive(Clone, Debug, Default)]
pub struct RegistrationCache {
    rows: KeySet<ReuseIdentifier>,
    headers: KeySet<ReuseIdentifier>,
}

impl RegistrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a row identifier. Returns `true` the first time it is seen.
    pub fn insert_row(&mut self, identifier: &ReuseIdentifier) -> bool {
        if self.rows.contains(identifier) {
            return false;
        }
        self.rows.insert(identifier.clone())
    }

    /// Records a header identifier. Returns `true` the first time it is seen.
    pub fn insert_header(&mut self, identifier: &ReuseIdentifier) -> bool {
        if self.headers.contains(identifier) {
            return false;
        }
        self.headers.insert(identifier.clone())
    }

    pub fn contains_row(&self, identifier: &ReuseIdentifier) -> bool {
        self.rows.contains(identifier)
    }

    pub fn contains_header(&self, identifier: &ReuseIdentifier) -> bool {
        self.headers.contains(identifier)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub(crate) fn reset(&mut self) {
        self.rows.clear();
        self.headers.clear();
    }
}
