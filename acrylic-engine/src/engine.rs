//! Engine facade: normalize, select, apply, record

use std::sync::OnceLock;

use crate::apply::{self, ApplyOutcome};
use crate::backend::CompositionBackend;
use crate::capability::{self, CapabilitySnapshot};
use crate::config::{normalize, EffectConfig, RawEffectOptions};
use crate::error::{ApplyError, EffectError};
use crate::handle::WindowHandle;
use crate::platform::NativeBackend;
use crate::registry::{EffectRecord, EffectRegistry, WindowEffectState};
use crate::strategy::{select, Selection};

/// Applies effects to windows and remembers what it applied.
pub struct EffectEngine {
    backend: Box<dyn CompositionBackend>,
    capability: CapabilitySnapshot,
    registry: EffectRegistry,
}

impl EffectEngine {
    /// Create an engine, probing the host capability through `backend`.
    pub fn new(backend: impl CompositionBackend + 'static) -> Self {
        let capability = CapabilitySnapshot::probe(&backend);
        Self::with_capability(backend, capability)
    }

    /// Create an engine with a known capability snapshot.
    pub fn with_capability(backend: impl CompositionBackend + 'static, capability: CapabilitySnapshot) -> Self {
        Self {
            backend: Box::new(backend),
            capability,
            registry: EffectRegistry::new(),
        }
    }

    /// Engine over the platform backend, sharing the process-wide capability.
    pub fn native() -> Self {
        Self::with_capability(NativeBackend::new(), capability::detect())
    }

    pub fn capability(&self) -> CapabilitySnapshot {
        self.capability
    }

    pub fn is_supported(&self) -> bool {
        self.capability.is_supported()
    }

    pub fn build_number(&self) -> u32 {
        self.capability.build
    }

    /// Validate `raw` and apply it.
    pub fn apply_effect(&self, raw: &RawEffectOptions) -> Result<ApplyOutcome, EffectError> {
        let request = normalize(raw)?;
        self.apply(request.handle, &request.config)
    }

    /// Apply a validated configuration, replacing whatever the window had.
    ///
    /// The registry is only updated when the primary step succeeds.
    pub fn apply(&self, handle: WindowHandle, config: &EffectConfig) -> Result<ApplyOutcome, EffectError> {
        let selection = select(config, &self.capability)?;
        self.with_slot(handle, || self.apply_locked(handle, config, &selection))
    }

    /// Run `f` while holding the slot of `handle`, then drop the slot if the
    /// window was left without a record.
    fn with_slot<T>(&self, handle: WindowHandle, f: impl FnOnce() -> T) -> T {
        let slot = self.registry.slot(handle);
        let result = {
            let _guard = slot.lock();
            f()
        };
        drop(slot);
        self.registry.prune_slot(handle);
        result
    }

    /// Caller holds the slot of `handle`.
    fn apply_locked(
        &self,
        handle: WindowHandle,
        config: &EffectConfig,
        selection: &Selection,
    ) -> Result<ApplyOutcome, EffectError> {
        let outcome = match apply::apply(self.backend.as_ref(), handle, config, selection) {
            Ok(outcome) => outcome,
            Err(e @ ApplyError::InvalidHandle(_)) => {
                log::debug!("{}: window is gone, pruning its record", handle);
                self.registry.remove(handle);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        self.registry.upsert(EffectRecord {
            handle,
            config: *config,
            strategy: selection.strategy,
            last_result: outcome.clone(),
        });

        log::info!(
            "{}: applied {} (opacity {}, downgraded: {})",
            handle,
            outcome.strategy,
            config.opacity,
            outcome.downgraded
        );
        Ok(outcome)
    }

    /// Remove the effect from a window. Returns whether a record existed.
    pub fn clear_effect(&self, handle: WindowHandle) -> Result<bool, EffectError> {
        if !self.capability.is_supported() {
            return Ok(self.registry.forget(handle).is_some());
        }

        self.with_slot(handle, || {
            match apply::clear(self.backend.as_ref(), handle, &self.capability) {
                Ok(failed) => {
                    if !failed.is_empty() {
                        log::warn!("{}: effect cleared, but could not reset {:?}", handle, failed);
                    }
                }
                Err(e @ ApplyError::InvalidHandle(_)) => {
                    self.registry.remove(handle);
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }

            let existed = self.registry.remove(handle).is_some();
            log::info!("{}: effect cleared", handle);
            Ok(existed)
        })
    }

    /// Apply the recorded configuration again, e.g. after a theme change.
    /// `None` when the window has no record.
    ///
    /// The record is read under the window's slot, so a concurrent clear or
    /// apply is never undone by a stale configuration.
    pub fn reapply(&self, handle: WindowHandle) -> Option<Result<ApplyOutcome, EffectError>> {
        self.with_slot(handle, || {
            let record = self.registry.get(handle)?;
            let result = select(&record.config, &self.capability)
                .map_err(EffectError::from)
                .and_then(|selection| self.apply_locked(handle, &record.config, &selection));
            Some(result)
        })
    }

    /// Reapply every recorded window.
    pub fn reapply_all(&self) -> Vec<(WindowHandle, Result<ApplyOutcome, EffectError>)> {
        self.registry
            .handles()
            .into_iter()
            .filter_map(|handle| self.reapply(handle).map(|result| (handle, result)))
            .collect()
    }

    /// Destruction notification from the windowing system.
    pub fn window_destroyed(&self, handle: WindowHandle) -> bool {
        let existed = self.registry.forget(handle).is_some();
        if existed {
            log::debug!("{}: window destroyed, record dropped", handle);
        }
        existed
    }

    pub fn record(&self, handle: WindowHandle) -> Option<EffectRecord> {
        self.registry.get(handle)
    }

    pub fn state(&self, handle: WindowHandle) -> WindowEffectState {
        self.registry.state(handle)
    }

    /// Windows that currently carry an effect.
    pub fn handles(&self) -> Vec<WindowHandle> {
        self.registry.handles()
    }
}

static GLOBAL: OnceLock<EffectEngine> = OnceLock::new();

/// The process-wide engine over the platform backend.
pub fn global() -> &'static EffectEngine {
    GLOBAL.get_or_init(EffectEngine::native)
}

/// Apply an effect through the process-wide engine.
pub fn apply_effect(raw: &RawEffectOptions) -> Result<ApplyOutcome, EffectError> {
    global().apply_effect(raw)
}

/// Whether the host can render any effect. Never fails.
pub fn is_supported() -> bool {
    capability::detect().is_supported()
}

/// OS build number, 0 when not on Windows. Never fails.
pub fn get_build_number() -> u32 {
    capability::detect().build
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::backend::fake::{Call, FakeBackend};
    use crate::capability::CapabilityTier;
    use crate::config::{CornerStyle, EffectType, RawHandle, Rgb};
    use crate::error::{ErrorKind, StepName};
    use crate::strategy::Strategy;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn engine(build: u32) -> (Arc<FakeBackend>, EffectEngine) {
        let backend = Arc::new(FakeBackend::new(build));
        let engine = EffectEngine::new(backend.clone());
        (backend, engine)
    }

    fn handle(raw: u64) -> WindowHandle {
        WindowHandle::new(raw).unwrap()
    }

    fn scenario(hwnd: i64) -> RawEffectOptions {
        RawEffectOptions {
            hwnd: Some(RawHandle::Number(hwnd)),
            effect_type: Some("acrylic".into()),
            corner: Some("round".into()),
            opacity: Some(200),
            tint_color: Some("ffffff".into()),
            border_color: Some("000000".into()),
            border_visible: Some(false),
        }
    }

    #[test]
    fn test_full_tier_scenario() {
        init_logger();
        let (_, engine) = engine(22631);
        let outcome = engine.apply_effect(&scenario(12345)).unwrap();
        assert!(outcome.success);
        assert!(!outcome.downgraded);

        let record = engine.record(handle(12345)).unwrap();
        assert_eq!(record.strategy, Strategy::AccentWithFrame(EffectType::Acrylic));
        assert_eq!(record.config.corner_style, CornerStyle::Round);
        assert_eq!(record.config.tint_color, Some(Rgb(0xFFFFFF)));
        assert_eq!(engine.state(handle(12345)), WindowEffectState::Applied);
    }

    #[test]
    fn test_legacy_tier_scenario() {
        init_logger();
        let (backend, engine) = engine(15063);
        let outcome = engine.apply_effect(&scenario(12345)).unwrap();
        assert!(outcome.success);
        assert!(outcome.downgraded);
        assert_eq!(outcome.strategy, Strategy::LegacyBlur);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_invalid_handles_never_reach_native_layer() {
        let (backend, engine) = engine(22631);
        for hwnd in [0, -1] {
            let err = engine.apply_effect(&scenario(hwnd)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        let err = engine.apply_effect(&RawEffectOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(backend.calls().is_empty());
        assert!(engine.handles().is_empty());
    }

    #[test]
    fn test_unsupported_host() {
        let (backend, engine) = engine(0);
        assert!(!engine.is_supported());
        assert_eq!(engine.build_number(), 0);

        let err = engine.apply_effect(&scenario(12345)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(backend.calls().is_empty());
        assert!(engine.record(handle(12345)).is_none());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (_, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();
        let first = engine.record(handle(42)).unwrap();
        engine.apply_effect(&scenario(42)).unwrap();
        let second = engine.record(handle(42)).unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.handles(), vec![handle(42)]);
    }

    #[test]
    fn test_reapply_overwrites_config() {
        let (_, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();
        engine
            .apply_effect(&RawEffectOptions::default().with_hwnd(42))
            .unwrap();

        let record = engine.record(handle(42)).unwrap();
        assert_eq!(record.config, EffectConfig::default());
    }

    #[test]
    fn test_apply_then_clear() {
        let (backend, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();

        assert!(engine.clear_effect(handle(42)).unwrap());
        assert!(engine.record(handle(42)).is_none());
        assert_eq!(engine.state(handle(42)), WindowEffectState::NoEffect);
        assert!(!engine.clear_effect(handle(42)).unwrap());
        assert_eq!(backend.calls_for(handle(42)).len(), 9);
    }

    #[test]
    fn test_primary_failure_leaves_registry_untouched() {
        let (backend, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();
        let before = engine.record(handle(42)).unwrap();

        backend.fail(StepName::AccentPolicy, 0x80070005_u32 as i32);
        let err = engine
            .apply_effect(&RawEffectOptions::default().with_hwnd(42))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Apply);
        assert_eq!(engine.record(handle(42)).unwrap(), before);

        let err = engine.apply_effect(&scenario(7)).unwrap_err();
        assert!(matches!(err, EffectError::Apply(ApplyError::Native { .. })));
        assert!(engine.record(handle(7)).is_none());
    }

    #[test]
    fn test_partial_failure_is_recorded() {
        let (backend, engine) = engine(22631);
        backend.fail(StepName::CornerPreference, 1);

        let outcome = engine.apply_effect(&scenario(42)).unwrap();
        assert!(outcome.success);
        assert!(outcome.downgraded);
        let record = engine.record(handle(42)).unwrap();
        assert_eq!(record.last_result.failed_steps, vec![StepName::CornerPreference]);

        backend.succeed(StepName::CornerPreference);
        let outcome = engine.reapply(handle(42)).unwrap().unwrap();
        assert!(!outcome.downgraded);
    }

    #[test]
    fn test_reapply_all_prunes_destroyed_windows() {
        let (backend, engine) = engine(19045);
        engine.apply_effect(&scenario(1)).unwrap();
        engine.apply_effect(&scenario(2)).unwrap();
        backend.kill(handle(2));

        let results = engine.reapply_all();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert_eq!(engine.handles(), vec![handle(1)]);
        assert!(engine.reapply(handle(2)).is_none());
    }

    #[test]
    fn test_window_destroyed() {
        let (backend, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();
        let calls = backend.calls().len();

        assert!(engine.window_destroyed(handle(42)));
        assert!(!engine.window_destroyed(handle(42)));
        assert!(engine.record(handle(42)).is_none());
        assert_eq!(backend.calls().len(), calls);
    }

    #[test]
    fn test_clear_dead_window() {
        let (backend, engine) = engine(22631);
        engine.apply_effect(&scenario(42)).unwrap();
        backend.kill(handle(42));

        let err = engine.clear_effect(handle(42)).unwrap_err();
        assert_eq!(err, EffectError::Apply(ApplyError::InvalidHandle(42)));
        assert!(engine.record(handle(42)).is_none());
    }

    #[test]
    fn test_concurrent_apply_same_window_is_serialized() {
        let (backend, engine) = engine(22631);
        let engine = Arc::new(engine);

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    let raw = RawEffectOptions {
                        opacity: Some(i * 10),
                        ..scenario(42)
                    };
                    engine.apply_effect(&raw).unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(engine.handles(), vec![handle(42)]);

        // Each apply is an uninterrupted accent/corner/border triple.
        let calls = backend.calls();
        assert_eq!(calls.len(), 24);
        for triple in calls.chunks(3) {
            assert!(matches!(triple[0], Call::Accent(..)));
            assert!(matches!(triple[1], Call::Corner(..)));
            assert!(matches!(triple[2], Call::Border(..)));
        }

        // The recorded config belongs to the last apply that ran.
        let last_gradient = match calls[21] {
            Call::Accent(_, policy) => policy.gradient_color,
            _ => unreachable!(),
        };
        let record = engine.record(handle(42)).unwrap();
        assert_eq!(record.config.gradient_color(), last_gradient);
    }

    #[test]
    fn test_different_windows_do_not_block_each_other() {
        let (backend, engine) = engine(22631);
        let engine = Arc::new(engine);
        let (release, gate) = mpsc::channel();
        backend.block_on(handle(1), gate);

        let blocked = {
            let engine = engine.clone();
            thread::spawn(move || engine.apply_effect(&scenario(1)).unwrap())
        };
        thread::sleep(Duration::from_millis(50));

        engine.apply_effect(&scenario(2)).unwrap();
        assert!(!blocked.is_finished());
        assert_eq!(engine.state(handle(2)), WindowEffectState::Applied);

        release.send(()).unwrap();
        blocked.join().unwrap();
        assert_eq!(engine.handles(), vec![handle(1), handle(2)]);
    }

    #[test]
    fn test_reapply_does_not_undo_concurrent_clear() {
        let (backend, engine) = engine(22631);
        let engine = Arc::new(engine);
        engine.apply_effect(&scenario(42)).unwrap();

        let (release, gate) = mpsc::channel();
        backend.block_on(handle(42), gate);

        let clearing = {
            let engine = engine.clone();
            thread::spawn(move || engine.clear_effect(handle(42)).unwrap())
        };
        thread::sleep(Duration::from_millis(50));
        let reapplying = {
            let engine = engine.clone();
            thread::spawn(move || engine.reapply(handle(42)))
        };
        thread::sleep(Duration::from_millis(50));

        release.send(()).unwrap();
        assert!(clearing.join().unwrap());
        assert!(reapplying.join().unwrap().is_none());
        assert_eq!(engine.state(handle(42)), WindowEffectState::NoEffect);
        assert!(engine.record(handle(42)).is_none());
    }

    #[test]
    fn test_reapply_does_not_revert_newer_apply() {
        let (backend, engine) = engine(22631);
        let engine = Arc::new(engine);
        let with_opacity = |opacity| RawEffectOptions {
            opacity: Some(opacity),
            ..scenario(42)
        };
        engine.apply_effect(&with_opacity(10)).unwrap();

        let (release, gate) = mpsc::channel();
        backend.block_on(handle(42), gate);

        let applying = {
            let engine = engine.clone();
            let raw = with_opacity(99);
            thread::spawn(move || engine.apply_effect(&raw).unwrap())
        };
        thread::sleep(Duration::from_millis(50));
        let reapplying = {
            let engine = engine.clone();
            thread::spawn(move || engine.reapply(handle(42)))
        };
        thread::sleep(Duration::from_millis(50));

        release.send(()).unwrap();
        applying.join().unwrap();
        assert!(reapplying.join().unwrap().unwrap().is_ok());
        assert_eq!(engine.record(handle(42)).unwrap().config.opacity, 99);
    }

    #[test]
    fn test_slots_do_not_outlive_records() {
        let (backend, engine) = engine(22631);

        backend.kill(handle(9));
        assert!(engine.apply_effect(&scenario(9)).is_err());
        assert_eq!(engine.registry.slot_count(), 0);

        backend.fail(StepName::AccentPolicy, 1);
        assert!(engine.apply_effect(&scenario(7)).is_err());
        assert_eq!(engine.registry.slot_count(), 0);
        backend.succeed(StepName::AccentPolicy);

        assert!(!engine.clear_effect(handle(8)).unwrap());
        assert!(engine.reapply(handle(8)).is_none());
        assert_eq!(engine.registry.slot_count(), 0);

        engine.apply_effect(&scenario(42)).unwrap();
        assert_eq!(engine.registry.slot_count(), 1);
        assert!(engine.clear_effect(handle(42)).unwrap());
        assert_eq!(engine.registry.slot_count(), 0);
    }

    #[test]
    fn test_with_capability_overrides_probe() {
        let backend = FakeBackend::new(22631);
        let engine = EffectEngine::with_capability(backend, CapabilitySnapshot::for_tier(CapabilityTier::LegacyBlur));
        assert_eq!(engine.capability().tier, CapabilityTier::LegacyBlur);
        let outcome = engine.apply_effect(&scenario(5)).unwrap();
        assert_eq!(outcome.strategy, Strategy::LegacyBlur);
    }

    #[test]
    fn test_global_entry_points_never_fail() {
        assert_eq!(is_supported(), capability::detect().is_supported());
        assert_eq!(get_build_number(), capability::detect().build);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_global_apply_off_windows() {
        assert!(!is_supported());
        assert_eq!(get_build_number(), 0);
        let err = apply_effect(&scenario(12345)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        let err = apply_effect(&scenario(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
