//! Maps a configuration and the host tier to a native call strategy

use crate::apply::{Criticality, Step, StepAction};
use crate::backend::{AccentPolicy, AccentState, CornerPreference, BORDER_COLOR_DEFAULT, BORDER_COLOR_NONE};
use crate::capability::{CapabilitySnapshot, CapabilityTier};
use crate::config::{CornerStyle, EffectConfig, EffectType};
use crate::error::UnsupportedError;

/// One shape of the native effect call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Blur-behind accent only.
    LegacyBlur,
    /// Blur or acrylic accent; corner and border attributes are not touched.
    Accent(EffectType),
    /// Accent followed by corner preference and border color.
    AccentWithFrame(EffectType),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LegacyBlur => "legacy-blur",
            Self::Accent(EffectType::Blur) => "blur",
            Self::Accent(EffectType::Acrylic) => "acrylic",
            Self::AccentWithFrame(EffectType::Blur) => "blur+frame",
            Self::AccentWithFrame(EffectType::Acrylic) => "acrylic+frame",
        }
    }

    /// Effect actually rendered by this strategy.
    pub fn effect_type(&self) -> EffectType {
        match self {
            Self::LegacyBlur => EffectType::Blur,
            Self::Accent(effect) | Self::AccentWithFrame(effect) => *effect,
        }
    }

    fn accent(&self, config: &EffectConfig) -> AccentPolicy {
        match self.effect_type() {
            EffectType::Blur => AccentPolicy::new(AccentState::BlurBehind, config.gradient_color()),
            EffectType::Acrylic => AccentPolicy::new(AccentState::AcrylicBlurBehind, config.gradient_color()),
        }
    }

    /// Ordered native steps. The accent step comes first and is the only
    /// critical one.
    pub fn plan(&self, config: &EffectConfig) -> Vec<Step> {
        let mut steps = vec![Step {
            action: StepAction::Accent(self.accent(config)),
            criticality: Criticality::Critical,
        }];

        if let Self::AccentWithFrame(_) = self {
            steps.push(Step {
                action: StepAction::Corner(corner_preference(config.corner_style)),
                criticality: Criticality::BestEffort,
            });
            steps.push(Step {
                action: StepAction::Border(border_color(config)),
                criticality: Criticality::BestEffort,
            });
        }

        steps
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn corner_preference(style: CornerStyle) -> CornerPreference {
    match style {
        CornerStyle::None => CornerPreference::DoNotRound,
        CornerStyle::Round => CornerPreference::Round,
        CornerStyle::RoundSmall => CornerPreference::RoundSmall,
    }
}

fn border_color(config: &EffectConfig) -> u32 {
    match (config.border_visible, config.border_color) {
        (false, _) => BORDER_COLOR_NONE,
        (true, Some(color)) => color.to_colorref(),
        (true, None) => BORDER_COLOR_DEFAULT,
    }
}

/// Strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub strategy: Strategy,
    /// The requested effect was replaced by a lesser one.
    pub downgraded: bool,
    /// Corner/border fields were set but the tier cannot honor them.
    pub frame_ignored: bool,
}

/// Pick the strategy for `config` on `capability`. Gating happens here,
/// before any native call is made.
pub fn select(config: &EffectConfig, capability: &CapabilitySnapshot) -> Result<Selection, UnsupportedError> {
    let frame_requested = config.customizes_frame();

    let selection = match capability.tier {
        CapabilityTier::Unsupported => {
            return Err(UnsupportedError {
                build: capability.build,
                requested: config.effect_type,
            })
        }
        CapabilityTier::LegacyBlur => Selection {
            strategy: Strategy::LegacyBlur,
            downgraded: config.effect_type == EffectType::Acrylic,
            frame_ignored: frame_requested,
        },
        CapabilityTier::Acrylic => Selection {
            strategy: Strategy::Accent(config.effect_type),
            downgraded: false,
            frame_ignored: frame_requested,
        },
        CapabilityTier::FullAcrylic => Selection {
            strategy: Strategy::AccentWithFrame(config.effect_type),
            downgraded: false,
            frame_ignored: false,
        },
    };

    if selection.downgraded {
        log::warn!(
            "{} is not available on build {}, downgrading to {}",
            config.effect_type,
            capability.build,
            selection.strategy.effect_type()
        );
    }
    if selection.frame_ignored {
        log::warn!(
            "Corner/border settings are ignored on build {} ({})",
            capability.build,
            capability.tier
        );
    }

    Ok(selection)
}
