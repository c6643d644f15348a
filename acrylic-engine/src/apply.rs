//! Issues the native calls of a strategy

use crate::backend::{AccentPolicy, CompositionBackend, CornerPreference, BORDER_COLOR_DEFAULT};
use crate::capability::{CapabilitySnapshot, SupportFlags};
use crate::config::EffectConfig;
use crate::error::{ApplyError, StepName};
use crate::handle::WindowHandle;
use crate::strategy::{Selection, Strategy};

/// Whether a failing step aborts the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criticality {
    /// Failure aborts and is reported as an [`ApplyError`].
    Critical,
    /// Failure is logged and reported as a degradation.
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
    Accent(AccentPolicy),
    Corner(CornerPreference),
    Border(u32),
}

impl StepAction {
    pub fn name(&self) -> StepName {
        match self {
            Self::Accent(_) => StepName::AccentPolicy,
            Self::Corner(_) => StepName::CornerPreference,
            Self::Border(_) => StepName::BorderColor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub action: StepAction,
    pub criticality: Criticality,
}

/// Result of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub success: bool,
    /// Something less than requested was rendered: the effect was
    /// downgraded, frame settings were skipped, or a best-effort step failed.
    pub downgraded: bool,
    pub strategy: Strategy,
    pub frame_ignored: bool,
    /// Best-effort steps that failed.
    pub failed_steps: Vec<StepName>,
}

/// Run `steps` in order. Returns the best-effort steps that failed, or the
/// first critical failure.
pub fn run_steps(
    backend: &dyn CompositionBackend,
    handle: WindowHandle,
    steps: &[Step],
) -> Result<Vec<StepName>, ApplyError> {
    let mut failed = Vec::new();

    for step in steps {
        let name = step.action.name();
        log::debug!("{}: setting {} ({:?})", handle, name, step.action);

        let result = match step.action {
            StepAction::Accent(policy) => backend.set_accent_policy(handle, policy),
            StepAction::Corner(preference) => backend.set_corner_preference(handle, preference),
            StepAction::Border(color) => backend.set_border_color(handle, color),
        };

        if let Err(status) = result {
            match step.criticality {
                Criticality::Critical => return Err(ApplyError::Native { step: name, status }),
                Criticality::BestEffort => {
                    log::warn!("{}: failed to set {} (status {}), continuing", handle, name, status);
                    failed.push(name);
                }
            }
        }
    }

    Ok(failed)
}

/// Apply `config` to `handle` using a previously selected strategy.
pub fn apply(
    backend: &dyn CompositionBackend,
    handle: WindowHandle,
    config: &EffectConfig,
    selection: &Selection,
) -> Result<ApplyOutcome, ApplyError> {
    if !backend.is_window(handle) {
        return Err(ApplyError::InvalidHandle(handle.raw()));
    }

    let steps = selection.strategy.plan(config);
    let failed_steps = run_steps(backend, handle, &steps)?;

    Ok(ApplyOutcome {
        success: true,
        downgraded: selection.downgraded || selection.frame_ignored || !failed_steps.is_empty(),
        strategy: selection.strategy,
        frame_ignored: selection.frame_ignored,
        failed_steps,
    })
}

/// Steps that return a window to its undecorated state.
pub fn clear_plan(capability: &CapabilitySnapshot) -> Vec<Step> {
    let mut steps = vec![Step {
        action: StepAction::Accent(AccentPolicy::disabled()),
        criticality: Criticality::Critical,
    }];
    if capability.supports(SupportFlags::CORNER_PREFERENCE) {
        steps.push(Step {
            action: StepAction::Corner(CornerPreference::Default),
            criticality: Criticality::BestEffort,
        });
    }
    if capability.supports(SupportFlags::BORDER_COLOR) {
        steps.push(Step {
            action: StepAction::Border(BORDER_COLOR_DEFAULT),
            criticality: Criticality::BestEffort,
        });
    }
    steps
}

/// Remove any effect from `handle`. Returns the best-effort steps that failed.
pub fn clear(
    backend: &dyn CompositionBackend,
    handle: WindowHandle,
    capability: &CapabilitySnapshot,
) -> Result<Vec<StepName>, ApplyError> {
    if !backend.is_window(handle) {
        return Err(ApplyError::InvalidHandle(handle.raw()));
    }
    run_steps(backend, handle, &clear_plan(capability))
}
