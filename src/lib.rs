//! Backend of a single-page sales dashboard over the `AdventureWorks`
//! internet-sales star schema.
//!
//! The fact table is loaded once ([`loader::load`]); every selection change
//! then re-derives the cross-filtered views ([`crossfilter::derive`]),
//! aggregates them and emits a chart-library-agnostic [`present::Frame`].

pub mod aggregate;
pub mod config;
pub mod crossfilter;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod present;
