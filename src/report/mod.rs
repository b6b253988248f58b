//! Report renderers for resolved licenses.
//!
//! - [`terminal`] — colored table with a summary line; respects `--quiet`.
//!
//! JSON output is the serialized [`LicenseSet`](crate::models::LicenseSet)
//! and is written directly by `main`.

pub mod terminal;
