use crate::engine::channel::event_channel::EventChannel;
use crate::engine::channel::payloads::LoadingScreenDone;
use bevy::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    AssetsLoaded,
    Running,
}

/// Set once the loading screen has handed control to the scene.
#[derive(Resource, Clone, Default)]
pub struct HandoffSignal(Arc<AtomicBool>);

impl HandoffSignal {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether the scene reacts to user input.
#[derive(Resource, Debug, Default)]
pub struct SceneInteraction {
    pub enabled: bool,
}

/// Listen for the loading screen hand-off on `channel`.
pub fn subscribe_scene_handoff(channel: &EventChannel) -> HandoffSignal {
    let signal = HandoffSignal::default();
    let flag = signal.0.clone();
    channel.subscribe_event::<LoadingScreenDone, _>(move |_| {
        flag.store(true, Ordering::SeqCst);
    });
    signal
}

// Final transition to running state
pub fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("→ All resources ready, transitioning to Running state");
    next_state.set(AppState::Running);
}

pub fn enable_scene_interaction(signal: Res<HandoffSignal>, mut interaction: ResMut<SceneInteraction>) {
    if signal.is_set() && !interaction.enabled {
        interaction.enabled = true;
        info!("✓ Scene interaction enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handoff_event_sets_signal() {
        let channel = EventChannel::new();
        let signal = subscribe_scene_handoff(&channel);
        assert!(!signal.is_set());

        channel.publish_event(&LoadingScreenDone {}).unwrap();
        assert!(signal.is_set());
    }

    #[test]
    fn interaction_waits_for_handoff() {
        let channel = EventChannel::new();
        let mut app = App::new();
        app.insert_resource(subscribe_scene_handoff(&channel))
            .init_resource::<SceneInteraction>()
            .add_systems(Update, enable_scene_interaction);

        app.update();
        assert!(!app.world().resource::<SceneInteraction>().enabled);

        channel.publish_event(&LoadingScreenDone {}).unwrap();
        app.update();
        assert!(app.world().resource::<SceneInteraction>().enabled);
    }
}
