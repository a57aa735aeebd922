use bevy::prelude::*;

pub const OVERLAY_BACKGROUND: Color = Color::BLACK;
pub const BOOT_TEXT: Color = Color::WHITE;
pub const VENDOR_GREEN: Color = Color::srgb(0.0, 1.0, 0.0);
pub const FATAL_RED: Color = Color::srgb(1.0, 0.0, 0.0);
pub const POPUP_BORDER: Color = Color::WHITE;

/// Font size used for all boot screen text.
pub const BOOT_FONT_SIZE: f32 = 16.0;

/// Border thickness of the start and error popups (logical pixels).
pub const POPUP_BORDER_WIDTH: f32 = 7.0;
