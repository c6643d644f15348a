//! Process-wide record of windows that carry an effect

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::apply::ApplyOutcome;
use crate::config::EffectConfig;
use crate::handle::WindowHandle;
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRecord {
    pub handle: WindowHandle,
    pub config: EffectConfig,
    pub strategy: Strategy,
    pub last_result: ApplyOutcome,
}

/// Per-window effect state as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEffectState {
    NoEffect,
    Applied,
}

/// At most one record per window.
///
/// Lock ordering: a caller mutating a window first holds that window's slot
/// (see [`EffectRegistry::slot`]), then the map lock only for the mutation.
/// Slots are dropped once a window has no record and nobody holds its slot.
#[derive(Default)]
pub struct EffectRegistry {
    records: Mutex<HashMap<WindowHandle, EffectRecord>>,
    slots: Mutex<HashMap<WindowHandle, Arc<Mutex<()>>>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutual-exclusion slot for `handle`. Windows never share a slot.
    pub fn slot(&self, handle: WindowHandle) -> Arc<Mutex<()>> {
        self.slots.lock().entry(handle).or_default().clone()
    }

    /// Insert or overwrite the record for its window.
    pub fn upsert(&self, record: EffectRecord) {
        self.records.lock().insert(record.handle, record);
    }

    pub fn get(&self, handle: WindowHandle) -> Option<EffectRecord> {
        self.records.lock().get(&handle).cloned()
    }

    pub fn remove(&self, handle: WindowHandle) -> Option<EffectRecord> {
        self.records.lock().remove(&handle)
    }

    /// Drop everything known about a destroyed window, including its slot.
    pub fn forget(&self, handle: WindowHandle) -> Option<EffectRecord> {
        let record = self.remove(handle);
        self.prune_slot(handle);
        record
    }

    /// Drop the slot of a window that has no record, unless another caller
    /// still holds or waits on it. Callers must release their own clone first.
    pub fn prune_slot(&self, handle: WindowHandle) {
        let mut slots = self.slots.lock();
        let idle = slots.get(&handle).is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle && !self.records.lock().contains_key(&handle) {
            slots.remove(&handle);
        }
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn state(&self, handle: WindowHandle) -> WindowEffectState {
        if self.records.lock().contains_key(&handle) {
            WindowEffectState::Applied
        } else {
            WindowEffectState::NoEffect
        }
    }

    pub fn handles(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<_> = self.records.lock().keys().copied().collect();
        handles.sort();
        handles
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
