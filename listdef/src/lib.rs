//! Declarative section/row definitions for recycling list surfaces.
//!
//! For a controller that owns the data source and coalesces relayouts, see the
//! `listdef-adapter` crate.
//!
//! A list is described as a [`DefinitionTree`] of [`Section`]s holding [`Row`]s. Each row
//! carries a [`RowContent`] variant (which view type it needs, how to configure it, how tall
//! it is) plus optional declarative hooks. A [`DataSource`] answers the host surface's
//! queries against the tree:
//! - section and row counts, reuse identifiers, configured views
//! - row heights, memoized by content signature and layout width ([`HeightCache`])
//! - display, selection and prefetch lifecycle events
//! - scroll events, fanned out to the rows that asked for them
//!
//! It is UI-agnostic. The host implements [`HostSurface`] to provide view pools, dequeueing
//! and registration.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod content;
mod data_source;
mod height;
mod host;
mod key;
mod lifecycle;
mod options;
mod registration;
mod row;
mod scroll;
mod section;
mod style;
mod tree;
mod types;
pub mod validate;

#[cfg(test)]
mod tests;

pub use content::{LabelView, PlainRow, RowContent, TextMeasurer, TextRow};
pub use data_source::DataSource;
pub use height::{DEFAULT_HEIGHT_CACHE_CAPACITY, HeightCache, HeightCacheStats, HeightKey};
pub use host::{HostSurface, ViewHandle};
pub use lifecycle::DisplayState;
pub use options::{DataSourceOptions, FALLBACK_IDENTIFIER};
pub use registration::{RegistrationCache, RegistrationMode, RegistrationTable};
pub use row::{DEFAULT_ROW_HEIGHT, Row, RowContext, RowHook};
pub use scroll::{ScrollContext, ScrollEvent, ScrollHandler, ScrollRegistry};
pub use section::{HeaderContext, HeaderHook, Section};
pub use style::{Color, Font, TextAlignment, TextStyle, VerticalInsets};
pub use tree::{DefinitionTree, RowKey, SectionKey};
pub use types::{FallbackView, IndexPath, ReuseIdentifier, SelectionStyle, ViewId, ViewType};
pub use validate::{ConfigError, ConfigErrors};
