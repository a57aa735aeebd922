/// Number of formatted load summaries kept on screen.
pub const LOG_CAPACITY: usize = 8;

/// Column the percentage is aligned to in a load summary line.
pub const SOURCE_NAME_COLUMN_WIDTH: usize = 24;

/// Logical pixel width below which the mobile warning is shown.
pub const NARROW_VIEWPORT_WIDTH: f32 = 768.0;

/// Delay between the capability check passing and the BIOS info appearing.
pub const BOOT_REVEAL_DELAY_MS: u64 = 250;

/// Delay between the final resource completing and the boot text fading.
pub const TEXT_FADE_DELAY_MS: u64 = 1000;

/// Delay between the boot text fading and the start popup appearing.
pub const START_POPUP_DELAY_MS: u64 = 500;

/// Delay before an error popup fades in after entering a failure state.
pub const ERROR_POPUP_DELAY_MS: u64 = 500;

/// Duration of an opacity fade on the overlay (seconds).
pub const OVERLAY_FADE_SECS: f32 = 0.2;

/// Scale applied to the overlay while it fades out on hand-off.
pub const HANDOFF_OVERLAY_SCALE: f32 = 1.1;

/// Blink period of the boot screen cursor (seconds).
pub const CURSOR_BLINK_SECS: f32 = 0.5;

/// Simulated RAM size reported by the BIOS memory check.
pub const REPORTED_RAM_KB: u32 = 14000;

/// User agent fragments identifying browsers the showcase cannot run in.
pub const UNSUPPORTED_BROWSER_MARKERS: &[&str] = &["firefox"];

/// URL query parameter that skips the loading screen.
pub const DEBUG_QUERY_PARAM: &str = "debug";

/// Environment variable that skips the loading screen on native builds.
pub const DEBUG_ENV_VAR: &str = "SHOWCASE_DEBUG";

/// Id of the host page element layered over the canvas.
pub const HOST_OVERLAY_ELEMENT_ID: &str = "ui";
