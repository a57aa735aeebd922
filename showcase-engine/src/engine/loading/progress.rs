use crate::engine::assets::resource_manifest::ResourceManifest;
use crate::engine::channel::payloads::LoadEvent;
use crate::engine::loading::error::LoadError;

/// Aggregate counters for one load session.
///
/// `loaded` only ever grows, and `progress` is exactly `1.0` once every
/// manifest entry has completed.
#[derive(Debug, Clone)]
pub struct LoadSession {
    names: Vec<String>,
    completed: Vec<bool>,
    loaded: u32,
    failure: Option<LoadError>,
}

impl LoadSession {
    pub fn new(manifest: &ResourceManifest) -> Result<Self, LoadError> {
        manifest.validate()?;
        let names: Vec<String> = manifest.iter().map(|source| source.name.clone()).collect();
        Ok(Self {
            completed: vec![false; names.len()],
            names,
            loaded: 0,
            failure: None,
        })
    }

    pub fn to_load(&self) -> u32 {
        self.names.len() as u32
    }

    pub fn loaded(&self) -> u32 {
        self.loaded
    }

    pub fn progress(&self) -> f32 {
        if self.loaded >= self.to_load() {
            1.0
        } else {
            self.loaded as f32 / self.to_load() as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loaded == self.to_load()
    }

    pub fn failure(&self) -> Option<&LoadError> {
        self.failure.as_ref()
    }

    /// Whether the entry at `index` still has to be observed.
    pub fn is_pending(&self, index: usize) -> bool {
        self.failure.is_none() && self.completed.get(index).is_some_and(|done| !done)
    }

    /// Count the entry at `index` as loaded and return the cumulative snapshot.
    ///
    /// Returns `Ok(None)` when the entry was already counted.
    pub fn record_loaded(&mut self, index: usize) -> Result<Option<LoadEvent>, LoadError> {
        if self.failure.is_some() {
            return Err(LoadError::SessionFailed);
        }
        let Some(done) = self.completed.get_mut(index) else {
            return Err(LoadError::UnknownResource(index));
        };
        if *done {
            return Ok(None);
        }

        *done = true;
        self.loaded += 1;
        Ok(Some(LoadEvent {
            source_name: self.names[index].clone(),
            progress: self.progress(),
            loaded: self.loaded,
            to_load: self.to_load(),
        }))
    }

    /// Mark the session failed because of the entry at `index`.
    ///
    /// The first failure wins; later calls report [`LoadError::SessionFailed`].
    pub fn record_failed(&mut self, index: usize, reason: impl Into<String>) -> LoadError {
        if self.failure.is_some() {
            return LoadError::SessionFailed;
        }
        let Some(name) = self.names.get(index) else {
            return LoadError::UnknownResource(index);
        };

        let error = LoadError::ResourceFailed {
            name: name.clone(),
            reason: reason.into(),
        };
        self.failure = Some(error.clone());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::resource_manifest::{ResourceDescriptor, ResourceKind};

    fn manifest(count: usize) -> ResourceManifest {
        ResourceManifest::new(
            (0..count)
                .map(|i| ResourceDescriptor::new(format!("source{i}"), ResourceKind::Texture, format!("t{i}.png")))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn three_resources_report_cumulative_snapshots() {
        let mut session = LoadSession::new(&manifest(3)).unwrap();

        let events: Vec<LoadEvent> = [2, 0, 1]
            .into_iter()
            .map(|i| session.record_loaded(i).unwrap().unwrap())
            .collect();

        assert_eq!(events.iter().map(|e| e.loaded).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(events.iter().all(|e| e.to_load == 3));
        assert_eq!(events.iter().map(LoadEvent::percent).collect::<Vec<_>>(), vec![33, 67, 100]);
        assert_eq!(events[0].source_name, "source2");
        assert!(!events[1].is_complete());
        assert!(events[2].is_complete());
    }

    #[test]
    fn final_progress_is_exactly_one_for_any_size() {
        for count in 1..=64 {
            let mut session = LoadSession::new(&manifest(count)).unwrap();
            let mut last = None;
            let mut previous = 0.0;
            for i in 0..count {
                let event = session.record_loaded(i).unwrap().unwrap();
                assert!(event.progress >= previous);
                previous = event.progress;
                last = Some(event);
            }
            assert_eq!(last.unwrap().progress, 1.0);
            assert!(session.is_complete());
        }
    }

    #[test]
    fn repeated_completion_counts_once() {
        let mut session = LoadSession::new(&manifest(2)).unwrap();
        assert!(session.record_loaded(0).unwrap().is_some());
        assert_eq!(session.record_loaded(0), Ok(None));
        assert_eq!(session.loaded(), 1);
        assert!(!session.is_pending(0));
        assert!(session.is_pending(1));
    }

    #[test]
    fn unknown_index_is_rejected() {
        let mut session = LoadSession::new(&manifest(1)).unwrap();
        assert_eq!(session.record_loaded(5), Err(LoadError::UnknownResource(5)));
    }

    #[test]
    fn failure_is_fatal_to_the_session() {
        let mut session = LoadSession::new(&manifest(3)).unwrap();
        session.record_loaded(0).unwrap();

        let error = session.record_failed(1, "404");
        assert_eq!(
            error,
            LoadError::ResourceFailed {
                name: "source1".to_string(),
                reason: "404".to_string()
            }
        );
        assert_eq!(session.record_failed(2, "timeout"), LoadError::SessionFailed);
        assert_eq!(session.record_loaded(2), Err(LoadError::SessionFailed));
        assert!(!session.is_pending(2));
        assert_eq!(session.loaded(), 1);
    }
}
