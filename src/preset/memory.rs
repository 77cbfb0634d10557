//! In-process preset store, used by tests and by hosts that don't need
//! durability.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{Operation, PresetError, PresetResult};
use crate::preset::store::{PresetStore, sort_newest_first};
use crate::preset::types::{Preset, PresetId, PresetSummary, SavePresetRequest};

/// Source of creation timestamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct MemoryPresetStore {
    inner: Mutex<Inner>,
    clock: Clock,
}

struct Inner {
    next_id: PresetId,
    /// Latest timestamp handed out; keeps `createdAt` non-decreasing.
    last_created: Option<DateTime<Utc>>,
    presets: Vec<Preset>,
}

impl Default for MemoryPresetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        MemoryPresetStore {
            inner: Mutex::new(Inner {
                next_id: 1,
                last_created: None,
                presets: Vec::new(),
            }),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        // A poisoned lock still guards intact data; count it.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .presets
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, operation: Operation) -> PresetResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PresetError::transport(operation, "preset store lock poisoned"))
    }
}

impl PresetStore for MemoryPresetStore {
    fn save(&self, request: &SavePresetRequest) -> PresetResult<PresetId> {
        request.validate()?;

        let mut inner = self.lock(Operation::Save)?;
        let now = (self.clock)();
        let created_at = match inner.last_created {
            Some(last) if last > now => last,
            _ => now,
        };
        let id = inner.next_id;
        inner.next_id += 1;
        inner.last_created = Some(created_at);
        inner.presets.push(Preset {
            id,
            name: request.name.clone(),
            raw_code: request.raw.clone(),
            controls_json: request.controls_json.clone(),
            created_at,
        });

        info!("saved preset {id} '{}'", request.name);
        Ok(id)
    }

    fn list_all(&self) -> PresetResult<Vec<PresetSummary>> {
        let inner = self.lock(Operation::List)?;
        let mut list: Vec<PresetSummary> = inner.presets.iter().map(Preset::summary).collect();
        sort_newest_first(&mut list);
        Ok(list)
    }

    fn get_by_id(&self, id: PresetId) -> PresetResult<Preset> {
        let inner = self.lock(Operation::Load)?;
        match inner.presets.iter().find(|p| p.id == id) {
            Some(preset) => Ok(preset.clone()),
            None => {
                debug!("preset {id} not found");
                Err(PresetError::NotFound { id })
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────
