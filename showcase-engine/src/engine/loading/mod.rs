//! Resource loading and aggregate progress for the showcase scene.
//!
//! A manifest is parsed first, then every entry is requested from the asset
//! server. Completions are polled on the main schedule and published on the
//! event channel as cumulative [`LoadEvent`](crate::engine::channel::payloads::LoadEvent)s.

/// Session-fatal load errors.
pub mod error;

/// Manifest request and validation systems.
pub mod manifest_loader;

/// Load session counters and progress snapshots.
///
/// Tracks per-resource completion so every entry counts exactly once.
pub mod progress;

/// Per-kind asset requests, completion polling and event publishing.
pub mod resource_loader;
