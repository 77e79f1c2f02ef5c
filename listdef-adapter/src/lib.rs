//! Adapter utilities for the `listdef` crate.
//!
//! The `listdef` crate is UI-agnostic and focuses on the definition tree and the data source
//! protocol. This crate provides small, framework-neutral helpers commonly needed by
//! adapters:
//!
//! - A list controller owning the host surface, the data source and the content generator
//! - Single-slot coalescing of reload/relayout requests
//! - An empty-state placeholder seam that avoids the on-screen keyboard
//!
//! This crate is intentionally framework-agnostic (no bindings to a concrete toolkit).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod empty_state;
mod relayout;


pub use controller::{ContentGenerator, ListController, Relayout};
pub use empty_state::{
    EmptyStatePresenter, KeyboardMonitor, Rect, SurfaceGeometry, empty_state_area,
};
pub use relayout::{QueueStats, SerialQueue};
