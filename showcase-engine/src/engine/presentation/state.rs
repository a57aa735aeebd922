use serde::Serialize;

/// Every state the loading screen can be in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PresentationState {
    #[default]
    Init,
    CapabilityCheck,
    /// Terminal: the browser is known to break the showcase.
    UnsupportedBrowser,
    /// Terminal: no GPU rendering context could be acquired.
    NoGpu,
    Booting,
    BiosInfoShown,
    AwaitingResources,
    ResourcesLoading,
    LoadComplete,
    TextFaded,
    AwaitingUserStart,
    /// Terminal: the scene owns the screen.
    HandedOff,
    /// Terminal: a resource failed and the session was abandoned.
    LoadFailed,
}

/// Inputs that move the machine between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    Mount,
    BrowserUnsupported,
    GpuMissing,
    CapabilitiesPassed,
    /// Capability check passed and the loading screen is skipped entirely.
    DebugSkip,
    BootRevealed,
    ListenerAttached,
    ResourceLoaded,
    ResourcesComplete,
    TextFadeElapsed,
    StartPopupElapsed,
    UserConfirmed,
    LoadFailed,
}

impl PresentationState {
    /// Transition table. `None` means the trigger is not accepted in `self`.
    pub fn next(self, trigger: Trigger) -> Option<Self> {
        use PresentationState as S;
        use Trigger as T;

        let next = match (self, trigger) {
            (S::Init, T::Mount) => S::CapabilityCheck,
            (S::CapabilityCheck, T::BrowserUnsupported) => S::UnsupportedBrowser,
            (S::CapabilityCheck, T::GpuMissing) => S::NoGpu,
            (S::CapabilityCheck, T::CapabilitiesPassed) => S::Booting,
            (S::CapabilityCheck, T::DebugSkip) => S::HandedOff,
            (S::Booting, T::BootRevealed) => S::BiosInfoShown,
            (S::BiosInfoShown, T::ListenerAttached) => S::AwaitingResources,
            (S::AwaitingResources | S::ResourcesLoading, T::ResourceLoaded) => S::ResourcesLoading,
            (S::ResourcesLoading, T::ResourcesComplete) => S::LoadComplete,
            (S::LoadComplete, T::TextFadeElapsed) => S::TextFaded,
            (S::TextFaded, T::StartPopupElapsed) => S::AwaitingUserStart,
            (S::AwaitingUserStart, T::UserConfirmed) => S::HandedOff,
            (
                S::Booting | S::BiosInfoShown | S::AwaitingResources | S::ResourcesLoading,
                T::LoadFailed,
            ) => S::LoadFailed,
            _ => return None,
        };
        Some(next)
    }

    /// No trigger leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::UnsupportedBrowser | Self::NoGpu | Self::HandedOff | Self::LoadFailed
        )
    }

    /// Whether load events drive transitions in this state.
    pub fn is_listening(self) -> bool {
        matches!(self, Self::AwaitingResources | Self::ResourcesLoading)
    }

    /// Whether the capability check passed and the screen is past the boot reveal.
    pub fn shows_bios_info(self) -> bool {
        matches!(
            self,
            Self::BiosInfoShown
                | Self::AwaitingResources
                | Self::ResourcesLoading
                | Self::LoadComplete
                | Self::TextFaded
                | Self::AwaitingUserStart
                | Self::HandedOff
                | Self::LoadFailed
        )
    }

    /// Whether the final resource has been observed.
    pub fn is_load_complete(self) -> bool {
        matches!(
            self,
            Self::LoadComplete | Self::TextFaded | Self::AwaitingUserStart | Self::HandedOff
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [PresentationState; 13] = [
        PresentationState::Init,
        PresentationState::CapabilityCheck,
        PresentationState::UnsupportedBrowser,
        PresentationState::NoGpu,
        PresentationState::Booting,
        PresentationState::BiosInfoShown,
        PresentationState::AwaitingResources,
        PresentationState::ResourcesLoading,
        PresentationState::LoadComplete,
        PresentationState::TextFaded,
        PresentationState::AwaitingUserStart,
        PresentationState::HandedOff,
        PresentationState::LoadFailed,
    ];

    const ALL_TRIGGERS: [Trigger; 13] = [
        Trigger::Mount,
        Trigger::BrowserUnsupported,
        Trigger::GpuMissing,
        Trigger::CapabilitiesPassed,
        Trigger::DebugSkip,
        Trigger::BootRevealed,
        Trigger::ListenerAttached,
        Trigger::ResourceLoaded,
        Trigger::ResourcesComplete,
        Trigger::TextFadeElapsed,
        Trigger::StartPopupElapsed,
        Trigger::UserConfirmed,
        Trigger::LoadFailed,
    ];

    #[test]
    fn happy_path_walks_every_stage() {
        let path = [
            Trigger::Mount,
            Trigger::CapabilitiesPassed,
            Trigger::BootRevealed,
            Trigger::ListenerAttached,
            Trigger::ResourceLoaded,
            Trigger::ResourcesComplete,
            Trigger::TextFadeElapsed,
            Trigger::StartPopupElapsed,
            Trigger::UserConfirmed,
        ];
        let end = path
            .iter()
            .try_fold(PresentationState::Init, |state, trigger| state.next(*trigger));
        assert_eq!(end, Some(PresentationState::HandedOff));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for state in ALL_STATES.into_iter().filter(|s| s.is_terminal()) {
            for trigger in ALL_TRIGGERS {
                assert_eq!(state.next(trigger), None, "{state:?} accepted {trigger:?}");
            }
        }
    }

    #[test]
    fn completion_requires_loading_first() {
        assert_eq!(
            PresentationState::AwaitingResources.next(Trigger::ResourcesComplete),
            None
        );
        assert_eq!(
            PresentationState::ResourcesLoading.next(Trigger::ResourcesComplete),
            Some(PresentationState::LoadComplete)
        );
    }

    #[test]
    fn confirmation_only_accepted_when_awaiting_start() {
        for state in ALL_STATES {
            let accepted = state.next(Trigger::UserConfirmed).is_some();
            assert_eq!(accepted, state == PresentationState::AwaitingUserStart);
        }
    }
}
