use constants::loading_screen::{
    BOOT_REVEAL_DELAY_MS, ERROR_POPUP_DELAY_MS, NARROW_VIEWPORT_WIDTH, SOURCE_NAME_COLUMN_WIDTH,
    START_POPUP_DELAY_MS, TEXT_FADE_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timings and text of the loading screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingScreenConfig {
    pub boot_reveal_delay_ms: u64,
    pub text_fade_delay_ms: u64,
    pub start_popup_delay_ms: u64,
    pub error_popup_delay_ms: u64,
    pub name_column_width: usize,
    pub narrow_viewport_width: f32,
    /// Force the debug skip regardless of what the environment reports.
    pub debug_skip: bool,
    pub branding: Branding,
}

impl Default for LoadingScreenConfig {
    fn default() -> Self {
        Self {
            boot_reveal_delay_ms: BOOT_REVEAL_DELAY_MS,
            text_fade_delay_ms: TEXT_FADE_DELAY_MS,
            start_popup_delay_ms: START_POPUP_DELAY_MS,
            error_popup_delay_ms: ERROR_POPUP_DELAY_MS,
            name_column_width: SOURCE_NAME_COLUMN_WIDTH,
            narrow_viewport_width: NARROW_VIEWPORT_WIDTH,
            debug_skip: false,
            branding: Branding::default(),
        }
    }
}

impl LoadingScreenConfig {
    pub fn boot_reveal_delay(&self) -> Duration {
        Duration::from_millis(self.boot_reveal_delay_ms)
    }

    pub fn text_fade_delay(&self) -> Duration {
        Duration::from_millis(self.text_fade_delay_ms)
    }

    pub fn start_popup_delay(&self) -> Duration {
        Duration::from_millis(self.start_popup_delay_ms)
    }

    pub fn error_popup_delay(&self) -> Duration {
        Duration::from_millis(self.error_popup_delay_ms)
    }
}

/// Vendor and product text printed on the boot screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub vendor_lines: Vec<String>,
    pub release_line: String,
    pub bios_line: String,
    pub board_line: String,
    pub product_line: String,
    pub title: String,
    pub version: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            vendor_lines: vec!["Showcase,".to_string(), "Systems Inc.".to_string()],
            release_line: "Released: 01/13/2000".to_string(),
            bios_line: "SSBIOS (C)2000 Showcase Systems Inc.,".to_string(),
            board_line: "SSP S13 2000-2022 Special UC131S".to_string(),
            product_line: "SSP Showcase(tm) XX 113".to_string(),
            title: "Showcase".to_string(),
            version: "V1.0".to_string(),
        }
    }
}
