//! Boot-screen presentation state machine and its Bevy overlay.
//!
//! The machine ([`loading_screen::LoadingScreen`]) is plain data driven by four
//! inputs: capability results at mount, channel messages, elapsed time and the
//! user's start confirmation. [`controller::PresentationController`] wires it to
//! the event channel and [`overlay`] renders whatever state it is in.
//!
//! ```text
//! Init → CapabilityCheck ─┬─ UnsupportedBrowser   (terminal)
//!                         ├─ NoGpu                (terminal)
//!                         └─ Booting → BiosInfoShown → AwaitingResources
//!                              → ResourcesLoading → LoadComplete → TextFaded
//!                              → AwaitingUserStart → HandedOff
//! ```

/// Boot screen text blocks and load summary formatting.
pub mod boot_text;

/// Browser and GPU capability probes.
///
/// Web builds inspect the user agent and try to acquire a canvas context; native
/// builds check for a render adapter.
pub mod capability;

/// Loading screen configuration and branding.
pub mod config;

/// Channel wiring, subscription ownership and hand-off publishing.
pub mod controller;

/// Presentation errors.
pub mod error;

/// Fixed-capacity log of recent load summaries.
pub mod event_log;

/// The presentation state machine itself.
pub mod loading_screen;

/// Bevy UI overlay, input handling and plugin.
pub mod overlay;

/// Presentation states and the transition table.
pub mod state;

/// Cancellable one-shot transitions keyed by state.
pub mod transitions;

/// Declarative per-state opacity and interaction parameters.
pub mod visuals;
