//! Command handlers - what each subcommand does

use acrylic_engine::{
    normalize, ApplyOutcome, CapabilitySnapshot, EffectEngine, EffectError, ErrorKind, RawEffectOptions, RawHandle,
};

use crate::config::{Config, ConfigError};

/// Process exit codes, one per failure class.
pub const EXIT_OK: i32 = 0;
pub const EXIT_VALIDATION: i32 = 2;
pub const EXIT_UNSUPPORTED: i32 = 3;
pub const EXIT_APPLY: i32 = 4;
pub const EXIT_CONFIG: i32 = 5;

pub fn exit_code(err: &EffectError) -> i32 {
    match err.kind() {
        ErrorKind::Validation => EXIT_VALIDATION,
        ErrorKind::Unsupported => EXIT_UNSUPPORTED,
        ErrorKind::Apply => EXIT_APPLY,
    }
}

/// Merge command-line options over a named (or default) profile.
pub fn resolve_options(
    overrides: RawEffectOptions,
    profile: Option<&str>,
    config: &Config,
) -> Result<RawEffectOptions, ConfigError> {
    let base = config.profile(profile)?;
    Ok(overrides.or(&base))
}

fn report(err: &EffectError) -> i32 {
    match err.kind() {
        ErrorKind::Validation => log::error!("Invalid options: {}", err),
        ErrorKind::Unsupported => log::warn!("{}", err),
        ErrorKind::Apply => log::error!("Platform error: {}", err),
    }
    exit_code(err)
}

fn describe(outcome: &ApplyOutcome) -> String {
    let mut line = format!("success={} downgraded={} strategy={}", outcome.success, outcome.downgraded, outcome.strategy);
    if outcome.frame_ignored {
        line.push_str(" frame=ignored");
    }
    if !outcome.failed_steps.is_empty() {
        let failed: Vec<String> = outcome.failed_steps.iter().map(|s| s.to_string()).collect();
        line.push_str(&format!(" failed=[{}]", failed.join(", ")));
    }
    line
}

/// Apply an effect and print the outcome.
pub fn apply(engine: &EffectEngine, options: &RawEffectOptions) -> i32 {
    match engine.apply_effect(options) {
        Ok(outcome) => {
            println!("{}", describe(&outcome));
            EXIT_OK
        }
        Err(e) => report(&e),
    }
}

/// Clear the effect on a window.
pub fn clear(engine: &EffectEngine, hwnd: &str) -> i32 {
    let raw = RawEffectOptions {
        hwnd: Some(RawHandle::Text(hwnd.to_string())),
        ..Default::default()
    };
    let result = normalize(&raw)
        .map_err(EffectError::from)
        .and_then(|request| engine.clear_effect(request.handle));

    match result {
        Ok(_) => {
            println!("cleared");
            EXIT_OK
        }
        Err(e) => report(&e),
    }
}

pub fn probe_report(capability: &CapabilitySnapshot) -> String {
    format!(
        "build={} tier={} supported={} flags={:?}",
        capability.build,
        capability.tier,
        capability.is_supported(),
        capability.flags
    )
}
