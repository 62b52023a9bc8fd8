//! Cleaning of freshly parsed tables.
//!
//! This module provides functionality for:
//! - Rewriting textual null markers into real nulls
//! - Converting text columns into numeric and datetime columns

pub(crate) mod converters;
mod null_normalizer;

pub use null_normalizer::{NULL_MARKERS, is_null_marker, normalize_nulls};
