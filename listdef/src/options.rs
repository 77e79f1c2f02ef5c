use crate::height::DEFAULT_HEIGHT_CACHE_CAPACITY;
use crate::registration::{RegistrationMode, RegistrationTable};
use crate::row::DEFAULT_ROW_HEIGHT;
use crate::ReuseIdentifier;

/// Identifier the fallback view is registered under by default.
pub const FALLBACK_IDENTIFIER: ReuseIdentifier = ReuseIdentifier::from_static("listdef.fallback");

/// Configuration for [`crate::DataSource`].
#[derive(Clone, Debug, PartialEq)]
pub struct DataSourceOptions {
    pub registration: RegistrationMode,

    /// Identifier returned for index paths that resolve to no row.
    pub fallback_identifier: ReuseIdentifier,

    /// Height reported for index paths that resolve to no row.
    pub default_row_height: f32,

    /// Width available to row content; measured heights depend on it. `0` disables
    /// measurement.
    pub layout_width: f32,

    /// Maximum number of memoized heights. `0` disables the height cache.
    pub height_cache_capacity: usize,

    /// Whether replacing the tree also forgets measured heights.
    ///
    /// Height keys are derived from content, so entries stay valid across trees; clearing
    /// only bounds memory to the current content.
    pub clear_heights_on_replace: bool,
}

impl Default for DataSourceOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceOptions {
    pub fn new() -> Self {
        Self {
            registration: RegistrationMode::Automatic,
            fallback_identifier: FALLBACK_IDENTIFIER,
            default_row_height: DEFAULT_ROW_HEIGHT,
            layout_width: 0.0,
            height_cache_capacity: DEFAULT_HEIGHT_CACHE_CAPACITY,
            clear_heights_on_replace: false,
        }
    }

    pub fn with_registration(mut self, registration: RegistrationMode) -> Self {
        self.registration = registration;
        self
    }

    /// Switches to semi-automatic registration with `table`.
    pub fn with_registration_table(mut self, table: RegistrationTable) -> Self {
        self.registration = RegistrationMode::SemiAutomatic(table);
        self
    }

    pub fn with_fallback_identifier(mut self, identifier: impl Into<ReuseIdentifier>) -> Self {
        self.fallback_identifier = identifier.into();
        self
    }

    pub fn with_default_row_height(mut self, height: f32) -> Self {
        self.default_row_height = height;
        self
    }

    pub fn with_layout_width(mut self, width: f32) -> Self {
        self.layout_width = width;
        self
    }

    pub fn with_height_cache_capacity(mut self, capacity: usize) -> Self {
        self.height_cache_capacity = capacity;
        self
    }

    pub fn with_clear_heights_on_replace(mut self, clear: bool) -> Self {
        self.clear_heights_on_replace = clear;
        self
    }
}
