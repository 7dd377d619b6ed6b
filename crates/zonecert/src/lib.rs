//! Eligibility and compliance verification engine for a zone-based
//! small-business certification program.
//!
//! The crate is organized around three layers: `zones` resolves geographic
//! eligibility (spatial index plus the active/grace/expired temporal logic),
//! `verification` turns a business snapshot into an immutable verification
//! record with a risk classification, and `bulk` drives verification across
//! large batches as a cancellable, partially-failable job.

pub mod bulk;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod verification;
pub mod zones;
