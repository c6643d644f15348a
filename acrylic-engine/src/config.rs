//! Effect configuration and input normalization

use serde::Deserialize;

use crate::error::ValidationError;
use crate::handle::WindowHandle;

/// Opacity used when the caller does not give one (80%).
pub const DEFAULT_OPACITY: u8 = 204;

/// Acrylic tint used when no tint color is set. Unset never means black.
pub const DEFAULT_TINT: Rgb = Rgb(0xFF_FF_FF);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectType {
    Blur,
    #[default]
    Acrylic,
}

impl EffectType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Acrylic => "acrylic",
        }
    }

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blur" => Ok(Self::Blur),
            "acrylic" => Ok(Self::Acrylic),
            _ => Err(ValidationError::new(
                "type",
                format!("expected 'blur' or 'acrylic', got '{}'", value),
            )),
        }
    }
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CornerStyle {
    #[default]
    None,
    Round,
    RoundSmall,
}

impl CornerStyle {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Round => "round",
            Self::RoundSmall => "roundsmall",
        }
    }

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "round" => Ok(Self::Round),
            "roundsmall" => Ok(Self::RoundSmall),
            _ => Err(ValidationError::new(
                "corner",
                format!("expected 'none', 'round' or 'roundsmall', got '{}'", value),
            )),
        }
    }
}

impl std::fmt::Display for CornerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 24-bit color, `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b))
    }

    /// Parse `RRGGBB` (optionally prefixed by `#`), case-insensitively.
    pub fn parse_hex(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::new(
                field,
                format!("expected a 6-digit hex color (RRGGBB), got '{}'", value),
            ));
        }

        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| ValidationError::new(field, e.to_string()))
    }

    pub fn r(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(&self) -> u8 {
        self.0 as u8
    }

    /// Win32 `COLORREF` layout, `0x00BBGGRR`.
    pub fn to_colorref(&self) -> u32 {
        u32::from(self.b()) << 16 | u32::from(self.g()) << 8 | u32::from(self.r())
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06x}", self.0 & 0xFF_FF_FF)
    }
}

/// A validated effect request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectConfig {
    pub effect_type: EffectType,
    pub corner_style: CornerStyle,
    pub opacity: u8,
    /// `None` means the system default tint.
    pub tint_color: Option<Rgb>,
    /// `None` means the system default border color.
    pub border_color: Option<Rgb>,
    pub border_visible: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            effect_type: EffectType::default(),
            corner_style: CornerStyle::default(),
            opacity: DEFAULT_OPACITY,
            tint_color: None,
            border_color: None,
            border_visible: true,
        }
    }
}

impl EffectConfig {
    /// Whether any corner or border field differs from the defaults.
    pub fn customizes_frame(&self) -> bool {
        self.corner_style != CornerStyle::None || self.border_color.is_some() || !self.border_visible
    }

    /// `ACCENT_POLICY.GradientColor`: opacity in the alpha byte, tint in BGR.
    pub fn gradient_color(&self) -> u32 {
        let tint = self.tint_color.unwrap_or(DEFAULT_TINT);
        u32::from(self.opacity) << 24 | tint.to_colorref()
    }
}

/// Window handle as given by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawHandle {
    Number(i64),
    Text(String),
}

/// Loosely typed effect options, as received at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEffectOptions {
    pub hwnd: Option<RawHandle>,
    #[serde(rename = "type")]
    pub effect_type: Option<String>,
    pub corner: Option<String>,
    pub opacity: Option<i64>,
    pub tint_color: Option<String>,
    pub border_color: Option<String>,
    pub border_visible: Option<bool>,
}

impl RawEffectOptions {
    pub fn with_hwnd(mut self, hwnd: i64) -> Self {
        self.hwnd = Some(RawHandle::Number(hwnd));
        self
    }

    /// Fill every unset field from `base`. Fields already set win.
    pub fn or(self, base: &RawEffectOptions) -> Self {
        Self {
            hwnd: self.hwnd.or_else(|| base.hwnd.clone()),
            effect_type: self.effect_type.or_else(|| base.effect_type.clone()),
            corner: self.corner.or_else(|| base.corner.clone()),
            opacity: self.opacity.or(base.opacity),
            tint_color: self.tint_color.or_else(|| base.tint_color.clone()),
            border_color: self.border_color.or_else(|| base.border_color.clone()),
            border_visible: self.border_visible.or(base.border_visible),
        }
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectRequest {
    pub handle: WindowHandle,
    pub config: EffectConfig,
}

fn parse_handle(raw: Option<&RawHandle>) -> Result<WindowHandle, ValidationError> {
    let value = match raw {
        None => return Err(ValidationError::new("hwnd", "window handle is required")),
        Some(RawHandle::Number(n)) => *n,
        Some(RawHandle::Text(text)) => {
            let text = text.trim();
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => i64::from_str_radix(hex, 16),
                None => text.parse::<i64>(),
            };
            parsed.map_err(|_| ValidationError::new("hwnd", format!("'{}' is not a number", text)))?
        }
    };

    if value <= 0 {
        return Err(ValidationError::new(
            "hwnd",
            format!("must be a positive integer, got {}", value),
        ));
    }

    WindowHandle::new(value as u64).ok_or_else(|| ValidationError::new("hwnd", "must not be zero"))
}

/// Validate raw options and fill defaults.
///
/// Out-of-range opacity is clamped into `0..=255` rather than rejected.
pub fn normalize(raw: &RawEffectOptions) -> Result<EffectRequest, ValidationError> {
    let handle = parse_handle(raw.hwnd.as_ref())?;

    let effect_type = match &raw.effect_type {
        Some(value) => EffectType::parse(value)?,
        None => EffectType::default(),
    };

    let corner_style = match &raw.corner {
        Some(value) => CornerStyle::parse(value)?,
        None => CornerStyle::default(),
    };

    let opacity = match raw.opacity {
        Some(value) => {
            let clamped = value.clamp(0, 255);
            if clamped != value {
                log::debug!("Opacity {} out of range, clamped to {}", value, clamped);
            }
            clamped as u8
        }
        None => DEFAULT_OPACITY,
    };

    let tint_color = raw
        .tint_color
        .as_deref()
        .map(|value| Rgb::parse_hex("tintColor", value))
        .transpose()?;

    let border_color = raw
        .border_color
        .as_deref()
        .map(|value| Rgb::parse_hex("borderColor", value))
        .transpose()?;

    Ok(EffectRequest {
        handle,
        config: EffectConfig {
            effect_type,
            corner_style,
            opacity,
            tint_color,
            border_color,
            border_visible: raw.border_visible.unwrap_or(true),
        },
    })
}
