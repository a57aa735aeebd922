//! Shared constants for the showcase loading and presentation layers.

/// Well-known event channel names shared by the loader, the loading
/// screen and the web frontend bridge.
pub mod events;

/// Loading screen timings, log sizing and viewport thresholds.
pub mod loading_screen;

/// Asset paths relative to the Bevy asset root.
pub mod path;

/// Boot screen colour palette.
pub mod theme;
