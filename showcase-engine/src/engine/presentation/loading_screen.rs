use crate::engine::channel::payloads::{LoadEvent, LoadFailed};
use crate::engine::presentation::boot_text::{
    BootScreenText, ErrorNotice, ProgressCounters, format_load_line, start_popup_lines,
};
use crate::engine::presentation::capability::{CapabilityFlags, CapabilityReport, CapabilityVerdict, is_narrow};
use crate::engine::presentation::config::LoadingScreenConfig;
use crate::engine::presentation::error::PresentationError;
use crate::engine::presentation::event_log::LoadLog;
use crate::engine::presentation::state::{PresentationState, Trigger};
use crate::engine::presentation::transitions::ScheduledTransitions;
use crate::engine::presentation::visuals::VisualParams;
use bevy::prelude::*;
use std::time::Duration;

/// The loading screen state machine.
///
/// All mutation goes through [`LoadingScreen::apply`], which consults the
/// transition table and arms the timed follow-up of the entered state.
#[derive(Debug, Clone)]
pub struct LoadingScreen {
    config: LoadingScreenConfig,
    state: PresentationState,
    time_in_state: Duration,
    mounted: bool,
    flags: CapabilityFlags,
    progress: f32,
    counters: ProgressCounters,
    log: LoadLog,
    scheduled: ScheduledTransitions,
    load_failure: Option<LoadFailed>,
}

impl LoadingScreen {
    pub fn new(config: LoadingScreenConfig) -> Self {
        Self {
            config,
            state: PresentationState::Init,
            time_in_state: Duration::ZERO,
            mounted: false,
            flags: CapabilityFlags::default(),
            progress: 0.0,
            counters: ProgressCounters::default(),
            log: LoadLog::new(),
            scheduled: ScheduledTransitions::default(),
            load_failure: None,
        }
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn flags(&self) -> CapabilityFlags {
        self.flags
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn loaded(&self) -> u32 {
        self.counters.loaded
    }

    pub fn to_load(&self) -> u32 {
        self.counters.to_load
    }

    pub fn log(&self) -> &LoadLog {
        &self.log
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &LoadingScreenConfig {
        &self.config
    }

    pub fn pending_transitions(&self) -> usize {
        self.scheduled.len()
    }

    /// Fire `trigger` against the transition table.
    pub fn apply(&mut self, trigger: Trigger) -> Result<PresentationState, PresentationError> {
        let from = self.state;
        let to = from
            .next(trigger)
            .ok_or(PresentationError::InvalidTransition { from, trigger })?;

        if to != from {
            info!("Loading screen: {:?} → {:?} ({:?})", from, to, trigger);
            self.state = to;
            self.time_in_state = Duration::ZERO;
            self.on_enter(to)?;
        }
        Ok(self.state)
    }

    fn on_enter(&mut self, state: PresentationState) -> Result<(), PresentationError> {
        use PresentationState as S;

        match state {
            S::Booting => {
                if self.load_failure.is_some() {
                    self.apply(Trigger::LoadFailed)?;
                } else {
                    self.scheduled
                        .schedule(S::Booting, Trigger::BootRevealed, self.config.boot_reveal_delay());
                }
            }
            S::BiosInfoShown => {
                self.scheduled
                    .schedule(S::BiosInfoShown, Trigger::ListenerAttached, Duration::ZERO);
            }
            S::AwaitingResources => self.replay_recorded_progress()?,
            S::LoadComplete => {
                self.scheduled
                    .schedule(S::LoadComplete, Trigger::TextFadeElapsed, self.config.text_fade_delay());
            }
            S::TextFaded => {
                self.scheduled
                    .schedule(S::TextFaded, Trigger::StartPopupElapsed, self.config.start_popup_delay());
            }
            _ => {}
        }

        if state.is_terminal() {
            let dropped = self.scheduled.cancel_all();
            if dropped > 0 {
                debug!("Cancelled {} pending loading screen transitions", dropped);
            }
        }
        Ok(())
    }

    // Progress recorded during the boot reveal drives the machine once it listens.
    fn replay_recorded_progress(&mut self) -> Result<(), PresentationError> {
        if self.load_failure.is_some() {
            self.apply(Trigger::LoadFailed)?;
            return Ok(());
        }
        if self.counters.loaded > 0 {
            self.apply(Trigger::ResourceLoaded)?;
            if self.progress >= 1.0 {
                self.apply(Trigger::ResourcesComplete)?;
            }
        }
        Ok(())
    }

    /// Run the capability check result through the machine. Only the first
    /// call has any effect.
    pub fn mount(&mut self, report: CapabilityReport) -> Result<PresentationState, PresentationError> {
        if self.mounted {
            warn!("Loading screen already mounted; ignoring capability report");
            return Ok(self.state);
        }
        self.mounted = true;
        self.flags = report.flags;

        self.apply(Trigger::Mount)?;
        let trigger = match report.verdict() {
            CapabilityVerdict::UnsupportedBrowser => Trigger::BrowserUnsupported,
            CapabilityVerdict::NoGpu => Trigger::GpuMissing,
            CapabilityVerdict::Supported if report.debug_skip || self.config.debug_skip => {
                Trigger::DebugSkip
            }
            CapabilityVerdict::Supported => Trigger::CapabilitiesPassed,
        };
        self.apply(trigger)
    }

    fn accepts_progress(&self) -> bool {
        !self.state.is_terminal() && !self.state.is_load_complete()
    }

    pub fn on_load_event(&mut self, event: &LoadEvent) -> Result<PresentationState, PresentationError> {
        if !self.accepts_progress() {
            debug!("Ignoring '{}' in {:?}", event.source_name, self.state);
            return Ok(self.state);
        }

        self.progress = event.progress;
        self.counters = ProgressCounters {
            loaded: event.loaded,
            to_load: event.to_load,
        };
        self.log.push(format_load_line(
            &event.source_name,
            event.percent(),
            self.config.name_column_width,
        ));

        if self.state.is_listening() {
            self.apply(Trigger::ResourceLoaded)?;
            if event.is_complete() {
                self.apply(Trigger::ResourcesComplete)?;
            }
        }
        Ok(self.state)
    }

    pub fn on_load_failed(&mut self, failure: &LoadFailed) -> Result<PresentationState, PresentationError> {
        if !self.accepts_progress() || self.load_failure.is_some() {
            return Ok(self.state);
        }

        error!(
            "Loading screen: '{}' failed to load: {}",
            failure.source_name, failure.reason
        );
        self.load_failure = Some(failure.clone());
        if self.state.next(Trigger::LoadFailed).is_some() {
            self.apply(Trigger::LoadFailed)?;
        }
        Ok(self.state)
    }

    /// Advance the clock. Due transitions armed in an earlier state are dropped.
    pub fn tick(&mut self, delta: Duration) {
        self.time_in_state += delta;

        for (from, trigger) in self.scheduled.tick(delta) {
            if from != self.state {
                debug!("Dropping stale {:?} scheduled in {:?}", trigger, from);
                continue;
            }
            if let Err(e) = self.apply(trigger) {
                warn!("Scheduled transition rejected: {}", e);
            }
        }
    }

    /// The user's single explicit start action.
    pub fn confirm_start(&mut self) -> Result<PresentationState, PresentationError> {
        self.apply(Trigger::UserConfirmed)
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.flags.narrow_viewport = is_narrow(width, self.config.narrow_viewport_width);
    }

    pub fn visuals(&self) -> VisualParams {
        VisualParams::for_state(self.state, self.time_in_state, self.config.error_popup_delay())
    }

    pub fn boot_text(&self, date: &str) -> BootScreenText {
        BootScreenText::compose(
            &self.config.branding,
            self.state,
            self.counters,
            self.log.iter(),
            date,
        )
    }

    pub fn start_popup_text(&self) -> Vec<String> {
        start_popup_lines(&self.config.branding, self.flags.narrow_viewport)
    }

    pub fn error_notice(&self) -> Option<ErrorNotice> {
        let failure = self
            .load_failure
            .as_ref()
            .map(|f| (f.source_name.as_str(), f.reason.as_str()));
        ErrorNotice::for_state(self.state, failure)
    }
}

impl Default for LoadingScreen {
    fn default() -> Self {
        Self::new(LoadingScreenConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::resource_manifest::{ResourceDescriptor, ResourceKind, ResourceManifest};
    use crate::engine::loading::progress::LoadSession;

    fn supported() -> CapabilityReport {
        CapabilityReport {
            flags: CapabilityFlags::default(),
            debug_skip: false,
        }
    }

    fn unsupported_browser() -> CapabilityReport {
        CapabilityReport {
            flags: CapabilityFlags {
                unsupported_browser: true,
                ..CapabilityFlags::default()
            },
            debug_skip: false,
        }
    }

    /// Mounted, booted and listening.
    fn listening_screen() -> LoadingScreen {
        let mut screen = LoadingScreen::default();
        screen.mount(supported()).unwrap();
        screen.tick(screen.config().boot_reveal_delay());
        screen.tick(Duration::ZERO);
        assert_eq!(screen.state(), PresentationState::AwaitingResources);
        screen
    }

    /// Load events a real session would publish for `count` resources.
    fn session_events(count: usize) -> Vec<LoadEvent> {
        let manifest = ResourceManifest::new(
            (0..count)
                .map(|i| ResourceDescriptor::new(format!("resource{i}"), ResourceKind::Texture, format!("r{i}.png")))
                .collect(),
        )
        .unwrap();
        let mut session = LoadSession::new(&manifest).unwrap();
        (0..count)
            .map(|i| session.record_loaded(i).unwrap().unwrap())
            .collect()
    }

    fn event(name: &str, loaded: u32, to_load: u32) -> LoadEvent {
        LoadEvent {
            source_name: name.to_string(),
            progress: loaded as f32 / to_load as f32,
            loaded,
            to_load,
        }
    }

    #[test]
    fn boot_sequence_reaches_listening() {
        let mut screen = LoadingScreen::default();
        assert_eq!(screen.mount(supported()).unwrap(), PresentationState::Booting);

        screen.tick(Duration::from_millis(249));
        assert_eq!(screen.state(), PresentationState::Booting);
        screen.tick(Duration::from_millis(1));
        assert_eq!(screen.state(), PresentationState::BiosInfoShown);
        screen.tick(Duration::ZERO);
        assert_eq!(screen.state(), PresentationState::AwaitingResources);
    }

    #[test]
    fn completes_only_on_final_event() {
        for count in 1..=16 {
            let mut screen = listening_screen();
            let events = session_events(count);
            let (last, rest) = events.split_last().unwrap();

            for event in rest {
                screen.on_load_event(event).unwrap();
                assert_eq!(screen.state(), PresentationState::ResourcesLoading);
            }
            assert_eq!(last.progress, 1.0);
            screen.on_load_event(last).unwrap();
            assert_eq!(screen.state(), PresentationState::LoadComplete, "{count} resources");
        }
    }

    #[test]
    fn three_resources_round_to_whole_percentages() {
        let mut screen = listening_screen();
        let lines: Vec<String> = session_events(3)
            .iter()
            .map(|event| {
                screen.on_load_event(event).unwrap();
                screen.log().iter().last().unwrap().to_string()
            })
            .collect();

        assert!(lines[0].ends_with(" 33%"));
        assert!(lines[1].ends_with(" 67%"));
        assert!(lines[2].ends_with(" 100%"));
        assert_eq!(screen.state(), PresentationState::LoadComplete);
    }

    #[test]
    fn log_keeps_last_eight_of_ten() {
        let mut screen = listening_screen();
        let events = session_events(10);
        for event in &events {
            screen.on_load_event(event).unwrap();
            assert!(screen.log().len() <= 8);
        }

        let expected: Vec<String> = events[2..]
            .iter()
            .map(|e| format_load_line(&e.source_name, e.percent(), 24))
            .collect();
        let actual: Vec<&str> = screen.log().iter().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn unsupported_browser_never_listens() {
        let mut screen = LoadingScreen::default();
        screen.mount(unsupported_browser()).unwrap();
        assert_eq!(screen.state(), PresentationState::UnsupportedBrowser);

        for event in session_events(4) {
            screen.on_load_event(&event).unwrap();
            screen.tick(Duration::from_secs(5));
            assert_eq!(screen.state(), PresentationState::UnsupportedBrowser);
        }
        assert_eq!(screen.loaded(), 0);
        assert!(screen.confirm_start().is_err());
    }

    #[test]
    fn missing_gpu_is_distinct_terminal_state() {
        let mut screen = LoadingScreen::default();
        screen
            .mount(CapabilityReport {
                flags: CapabilityFlags {
                    missing_gpu_capability: true,
                    ..CapabilityFlags::default()
                },
                debug_skip: false,
            })
            .unwrap();

        assert_eq!(screen.state(), PresentationState::NoGpu);
        assert_eq!(screen.visuals().error_popup_opacity, 0.0);
        screen.tick(Duration::from_millis(500));
        assert_eq!(screen.visuals().error_popup_opacity, 1.0);
        assert_eq!(screen.error_notice().unwrap().headline, "No WebGL Detected");
    }

    #[test]
    fn viewport_flag_is_advisory() {
        let mut screen = listening_screen();
        screen.on_load_event(&event("a", 1, 3)).unwrap();
        let before = (screen.state(), screen.progress(), screen.loaded(), screen.to_load());

        screen.set_viewport_width(390.0);
        assert!(screen.flags().narrow_viewport);
        screen.set_viewport_width(1920.0);
        screen.set_viewport_width(500.0);

        assert_eq!(
            (screen.state(), screen.progress(), screen.loaded(), screen.to_load()),
            before
        );
        screen.on_load_event(&event("b", 2, 3)).unwrap();
        screen.on_load_event(&event("c", 3, 3)).unwrap();
        assert_eq!(screen.state(), PresentationState::LoadComplete);
    }

    #[test]
    fn progress_during_boot_is_replayed_when_listening() {
        let mut screen = LoadingScreen::default();
        screen.mount(supported()).unwrap();
        screen.on_load_event(&event("a", 1, 2)).unwrap();
        screen.on_load_event(&event("b", 2, 2)).unwrap();
        assert_eq!(screen.state(), PresentationState::Booting);
        assert_eq!(screen.log().len(), 2);

        screen.tick(Duration::from_millis(250));
        screen.tick(Duration::ZERO);
        assert_eq!(screen.state(), PresentationState::LoadComplete);
    }

    #[test]
    fn timed_fades_lead_to_start_prompt() {
        let mut screen = listening_screen();
        screen.on_load_event(&event("only", 1, 1)).unwrap();

        screen.tick(Duration::from_millis(999));
        assert_eq!(screen.state(), PresentationState::LoadComplete);
        screen.tick(Duration::from_millis(1));
        assert_eq!(screen.state(), PresentationState::TextFaded);
        assert!(screen.visuals().standalone_cursor);

        assert!(screen.confirm_start().is_err());
        screen.tick(Duration::from_millis(500));
        assert_eq!(screen.state(), PresentationState::AwaitingUserStart);

        assert_eq!(screen.confirm_start().unwrap(), PresentationState::HandedOff);
        assert!(!screen.visuals().pointer_events);
        assert!(screen.confirm_start().is_err());
    }

    #[test]
    fn displayed_total_is_placeholder_before_loader_starts() {
        let screen = listening_screen();
        let text = screen.boot_text("01/01/2000");
        assert!(text.body.contains(&"LOADING RESOURCES (0/-)".to_string()));
    }

    #[test]
    fn load_failure_is_terminal_and_cancels_timers() {
        let mut screen = LoadingScreen::default();
        screen.mount(supported()).unwrap();
        assert_eq!(screen.pending_transitions(), 1);

        screen
            .on_load_failed(&LoadFailed {
                source_name: "deskModel".to_string(),
                reason: "404".to_string(),
            })
            .unwrap();

        assert_eq!(screen.state(), PresentationState::LoadFailed);
        assert_eq!(screen.pending_transitions(), 0);
        screen.on_load_event(&event("late", 1, 1)).unwrap();
        screen.tick(Duration::from_secs(2));
        assert_eq!(screen.state(), PresentationState::LoadFailed);
        assert!(screen.error_notice().unwrap().lines[0].contains("deskModel"));
    }

    #[test]
    fn debug_skip_hands_off_immediately() {
        let mut screen = LoadingScreen::default();
        let state = screen
            .mount(CapabilityReport {
                flags: CapabilityFlags::default(),
                debug_skip: true,
            })
            .unwrap();
        assert_eq!(state, PresentationState::HandedOff);
    }

    #[test]
    fn mount_runs_once() {
        let mut screen = LoadingScreen::default();
        screen.mount(supported()).unwrap();
        screen.mount(unsupported_browser()).unwrap();
        assert_eq!(screen.state(), PresentationState::Booting);
        assert!(!screen.flags().unsupported_browser);
    }
}
