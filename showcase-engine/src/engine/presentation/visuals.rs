use crate::engine::presentation::state::PresentationState;
use constants::loading_screen::HANDOFF_OVERLAY_SCALE;
use serde::Serialize;
use std::time::Duration;

/// Target look of the overlay for one state. The overlay eases towards
/// these values; nothing else decides what is visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualParams {
    pub overlay_opacity: f32,
    pub overlay_scale: f32,
    pub boot_text_opacity: f32,
    pub start_popup_opacity: f32,
    pub error_popup_opacity: f32,
    /// Lone blinking cursor shown between the text fade and the start popup.
    pub standalone_cursor: bool,
    /// Whether the overlay still captures pointer input.
    pub pointer_events: bool,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            overlay_opacity: 1.0,
            overlay_scale: 1.0,
            boot_text_opacity: 1.0,
            start_popup_opacity: 0.0,
            error_popup_opacity: 0.0,
            standalone_cursor: false,
            pointer_events: true,
        }
    }
}

impl VisualParams {
    /// `time_in_state` only matters for failure states, whose popup appears
    /// once `error_delay` has passed.
    pub fn for_state(state: PresentationState, time_in_state: Duration, error_delay: Duration) -> Self {
        use PresentationState as S;

        let base = Self::default();
        match state {
            S::TextFaded => Self {
                boot_text_opacity: 0.0,
                standalone_cursor: true,
                ..base
            },
            S::AwaitingUserStart => Self {
                boot_text_opacity: 0.0,
                start_popup_opacity: 1.0,
                ..base
            },
            S::HandedOff => Self {
                overlay_opacity: 0.0,
                overlay_scale: HANDOFF_OVERLAY_SCALE,
                boot_text_opacity: 0.0,
                pointer_events: false,
                ..base
            },
            S::UnsupportedBrowser | S::NoGpu | S::LoadFailed => Self {
                boot_text_opacity: 0.0,
                error_popup_opacity: if time_in_state >= error_delay { 1.0 } else { 0.0 },
                ..base
            },
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn boot_states_show_text_only() {
        for state in [
            PresentationState::Init,
            PresentationState::Booting,
            PresentationState::ResourcesLoading,
            PresentationState::LoadComplete,
        ] {
            let visuals = VisualParams::for_state(state, Duration::ZERO, DELAY);
            assert_eq!(visuals, VisualParams::default(), "{state:?}");
        }
    }

    #[test]
    fn handoff_releases_pointer_and_hides_overlay() {
        let visuals = VisualParams::for_state(PresentationState::HandedOff, Duration::ZERO, DELAY);
        assert_eq!(visuals.overlay_opacity, 0.0);
        assert_eq!(visuals.overlay_scale, HANDOFF_OVERLAY_SCALE);
        assert!(!visuals.pointer_events);
    }

    #[test]
    fn error_popup_waits_for_delay() {
        let early = VisualParams::for_state(PresentationState::NoGpu, Duration::from_millis(499), DELAY);
        let late = VisualParams::for_state(PresentationState::NoGpu, DELAY, DELAY);
        assert_eq!(early.error_popup_opacity, 0.0);
        assert_eq!(late.error_popup_opacity, 1.0);
        assert_eq!(late.boot_text_opacity, 0.0);
    }

    #[test]
    fn cursor_only_between_fade_and_popup() {
        let faded = VisualParams::for_state(PresentationState::TextFaded, Duration::ZERO, DELAY);
        let awaiting = VisualParams::for_state(PresentationState::AwaitingUserStart, Duration::ZERO, DELAY);
        assert!(faded.standalone_cursor);
        assert!(!awaiting.standalone_cursor);
        assert_eq!(awaiting.start_popup_opacity, 1.0);
    }
}
