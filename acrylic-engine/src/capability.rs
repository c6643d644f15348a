//! OS capability probing

use std::sync::OnceLock;

use bitflags::bitflags;

use crate::backend::CompositionBackend;
use crate::platform::NativeBackend;

/// First Windows 10 release; earlier builds have no usable blur accent.
pub const BUILD_WIN10: u32 = 10240;
/// Windows 10 1803, first build with the acrylic accent.
pub const BUILD_ACRYLIC: u32 = 17134;
/// Windows 11, first build with DWM corner preference and border color.
pub const BUILD_WIN11: u32 = 22000;

bitflags! {
    /// Native attributes available on the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SupportFlags: u32 {
        const BLUR_BEHIND = 1 << 0;
        const ACRYLIC = 1 << 1;
        const CORNER_PREFERENCE = 1 << 2;
        const BORDER_COLOR = 1 << 3;
    }
}

/// Build ranges sharing the same native effect API shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityTier {
    /// Not Windows, or no composition attribute support.
    Unsupported,
    /// Blur-behind accent only.
    LegacyBlur,
    /// Acrylic accent with tint, no corner/border control.
    Acrylic,
    /// Acrylic plus corner preference and border color.
    FullAcrylic,
}

impl CapabilityTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::LegacyBlur => "legacy-blur",
            Self::Acrylic => "acrylic",
            Self::FullAcrylic => "full-acrylic",
        }
    }

    pub fn flags(&self) -> SupportFlags {
        match self {
            Self::Unsupported => SupportFlags::empty(),
            Self::LegacyBlur => SupportFlags::BLUR_BEHIND,
            Self::Acrylic => SupportFlags::BLUR_BEHIND | SupportFlags::ACRYLIC,
            Self::FullAcrylic => SupportFlags::all(),
        }
    }
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable result of probing the host once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    pub build: u32,
    pub tier: CapabilityTier,
    pub flags: SupportFlags,
}

impl CapabilitySnapshot {
    /// Classify a build number. `composition_attribute` says whether the
    /// accent entry point exists at all.
    pub fn classify(build: u32, composition_attribute: bool) -> Self {
        let tier = if !composition_attribute || build < BUILD_WIN10 {
            CapabilityTier::Unsupported
        } else if build < BUILD_ACRYLIC {
            CapabilityTier::LegacyBlur
        } else if build < BUILD_WIN11 {
            CapabilityTier::Acrylic
        } else {
            CapabilityTier::FullAcrylic
        };

        Self {
            build,
            tier,
            flags: tier.flags(),
        }
    }

    /// Snapshot for a specific tier, for callers that want to force one.
    pub fn for_tier(tier: CapabilityTier) -> Self {
        let build = match tier {
            CapabilityTier::Unsupported => 0,
            CapabilityTier::LegacyBlur => BUILD_WIN10,
            CapabilityTier::Acrylic => BUILD_ACRYLIC,
            CapabilityTier::FullAcrylic => BUILD_WIN11,
        };
        Self { build, tier, flags: tier.flags() }
    }

    /// Probe through a backend.
    pub fn probe(backend: &dyn CompositionBackend) -> Self {
        let snapshot = Self::classify(backend.build_number(), backend.has_composition_attribute());
        log::debug!(
            "Capability: build={}, tier={}, flags={:?}",
            snapshot.build,
            snapshot.tier,
            snapshot.flags
        );
        snapshot
    }

    pub fn is_supported(&self) -> bool {
        self.tier != CapabilityTier::Unsupported
    }

    pub fn supports(&self, flags: SupportFlags) -> bool {
        self.flags.contains(flags)
    }
}

static DETECTED: OnceLock<CapabilitySnapshot> = OnceLock::new();

/// Capability of the running host. Computed on first call, then cached for
/// the lifetime of the process.
pub fn detect() -> CapabilitySnapshot {
    *DETECTED.get_or_init(|| CapabilitySnapshot::probe(&NativeBackend::new()))
}
