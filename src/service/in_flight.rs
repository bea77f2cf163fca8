use log::*;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::error::{RelnotesError, Result};

/// Ids of releases with a generation currently running.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Mark `id` as generating. Fails with
    /// [`RelnotesError::GenerationInProgress`] if it already is. The mark is
    /// cleared when the returned guard is dropped.
    pub fn acquire(&self, id: &str) -> Result<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);

        if !ids.insert(id.to_string()) {
            return Err(RelnotesError::GenerationInProgress(id.to_string()));
        }

        debug!("generation started for {id}");

        Ok(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        debug!("generation finished for {}", self.id);
    }
}
