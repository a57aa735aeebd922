use crate::engine::channel::event_channel::{EventChannel, Subscription};
use crate::engine::channel::payloads::{CapabilityCheck, LoadEvent, LoadFailed, LoadingScreenDone};
use crate::engine::presentation::capability::{CapabilityFlags, EnvironmentProbe, check_capabilities};
use crate::engine::presentation::config::LoadingScreenConfig;
use crate::engine::presentation::error::PresentationError;
use crate::engine::presentation::loading_screen::LoadingScreen;
use crate::engine::presentation::state::PresentationState;
use crate::engine::presentation::visuals::VisualParams;
use bevy::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Serialisable view of the loading screen, answered to `get_loading_state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSnapshot {
    pub state: PresentationState,
    pub flags: CapabilityFlags,
    pub progress: f32,
    pub loaded: u32,
    pub to_load: u32,
    pub log: Vec<String>,
    pub visuals: VisualParams,
}

/// Owns the loading screen and its channel subscriptions.
///
/// Channel handlers and Bevy systems share the screen through this handle.
/// The screen lock is never held while publishing, so handlers may call back
/// into the controller.
#[derive(Resource, Clone)]
pub struct PresentationController {
    screen: Arc<Mutex<LoadingScreen>>,
    channel: EventChannel,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
    handoff_published: Arc<AtomicBool>,
}

impl PresentationController {
    pub fn new(config: LoadingScreenConfig, channel: EventChannel) -> Self {
        Self {
            screen: Arc::new(Mutex::new(LoadingScreen::new(config))),
            channel,
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            handoff_published: Arc::new(AtomicBool::new(false)),
        }
    }

    fn screen(&self) -> MutexGuard<'_, LoadingScreen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscriptions(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the screen under its lock.
    pub fn with_screen<R>(&self, read: impl FnOnce(&LoadingScreen) -> R) -> R {
        let screen = self.screen();
        read(&*screen)
    }

    pub fn state(&self) -> PresentationState {
        self.screen().state()
    }

    /// Run the capability check, publish its outcome and start listening for
    /// load progress.
    pub fn mount(&self, probe: &dyn EnvironmentProbe) -> Result<PresentationState, PresentationError> {
        let (state, checked) = {
            let mut screen = self.screen();
            if screen.is_mounted() {
                (screen.state(), None)
            } else {
                let report = check_capabilities(probe, screen.config().narrow_viewport_width);
                (screen.mount(report)?, Some(report.flags))
            }
        };

        if let Some(flags) = checked {
            if let Err(e) = self.channel.publish_event(&CapabilityCheck::from(flags)) {
                error!("Failed to publish capability check: {}", e);
            }
        }

        if state == PresentationState::Booting && self.subscriptions().is_empty() {
            self.attach_listeners();
        } else if state == PresentationState::HandedOff {
            info!("Debug flag set, skipping loading screen");
            self.finish_handoff();
        }
        Ok(state)
    }

    fn attach_listeners(&self) {
        let screen = self.screen.clone();
        let on_loaded = self.channel.subscribe_event::<LoadEvent, _>(move |event| {
            let mut screen = screen.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = screen.on_load_event(&event) {
                warn!("Load event rejected: {}", e);
            }
        });

        let screen = self.screen.clone();
        let on_failed = self.channel.subscribe_event::<LoadFailed, _>(move |failure| {
            let mut screen = screen.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = screen.on_load_failed(&failure) {
                warn!("Load failure rejected: {}", e);
            }
        });

        self.subscriptions().extend([on_loaded, on_failed]);
    }

    fn release_listeners(&self) {
        let subscriptions: Vec<Subscription> = self.subscriptions().drain(..).collect();
        for subscription in &subscriptions {
            self.channel.unsubscribe(subscription);
        }
    }

    fn finish_handoff(&self) {
        self.release_listeners();
        if self.handoff_published.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.channel.publish_event(&LoadingScreenDone {}) {
            error!("Failed to publish loading screen hand-off: {}", e);
        }
    }

    /// The user pressed start. Succeeds only while awaiting confirmation.
    pub fn confirm_start(&self) -> Result<PresentationState, PresentationError> {
        let state = self.screen().confirm_start()?;
        self.finish_handoff();
        Ok(state)
    }

    pub fn tick(&self, delta: Duration) {
        let state = {
            let mut screen = self.screen();
            screen.tick(delta);
            screen.state()
        };
        if state.is_terminal() && !self.subscriptions().is_empty() {
            self.release_listeners();
        }
    }

    pub fn set_viewport_width(&self, width: f32) {
        self.screen().set_viewport_width(width);
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        let screen = self.screen();
        ScreenSnapshot {
            state: screen.state(),
            flags: screen.flags(),
            progress: screen.progress(),
            loaded: screen.loaded(),
            to_load: screen.to_load(),
            log: screen.log().iter().map(str::to_string).collect(),
            visuals: screen.visuals(),
        }
    }
}
