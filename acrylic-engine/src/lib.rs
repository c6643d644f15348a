//! # acrylic-engine
//!
//! Applies blur and acrylic backdrops to top-level Windows windows.
//!
//! ## Features
//! - Capability probing by OS build, cached per process
//! - Permissive option normalization (defaults, opacity clamping, hex colors)
//! - Strategy selection per capability tier, with explicit downgrades
//! - Partial-success application: corner/border failures keep the backdrop
//! - Per-window effect registry for reapply on theme change and cleanup
//!
//! ## Example
//!
//! ```no_run
//! use acrylic_engine::{apply_effect, is_supported, RawEffectOptions};
//!
//! if is_supported() {
//!     let options = RawEffectOptions {
//!         corner: Some("round".into()),
//!         tint_color: Some("202020".into()),
//!         ..Default::default()
//!     }
//!     .with_hwnd(0x1705A4);
//!
//!     let outcome = apply_effect(&options).expect("Failed to apply effect");
//!     println!("applied, downgraded: {}", outcome.downgraded);
//! }
//! ```

pub mod apply;
pub mod backend;
pub mod capability;
pub mod config;
mod engine;
mod error;
mod handle;
mod platform;
pub mod registry;
pub mod strategy;

// Entry points
pub use engine::{apply_effect, get_build_number, global, is_supported, EffectEngine};

// Errors
pub use error::{ApplyError, EffectError, ErrorKind, StepName, UnsupportedError, ValidationError};

// Data model
pub use apply::ApplyOutcome;
pub use backend::{CompositionBackend, NativeStatus};
pub use capability::{detect, CapabilitySnapshot, CapabilityTier, SupportFlags};
pub use config::{normalize, CornerStyle, EffectConfig, EffectRequest, EffectType, RawEffectOptions, RawHandle, Rgb};
pub use handle::WindowHandle;
pub use platform::NativeBackend;
pub use registry::{EffectRecord, WindowEffectState};
pub use strategy::{select, Selection, Strategy};
