//! Native composition calls the engine depends on

use crate::handle::WindowHandle;

/// Status returned by a failed native call: an HRESULT for DWM attributes,
/// a Win32 error code for the composition attribute call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeStatus(pub i32);

impl NativeStatus {
    /// `E_NOTIMPL`, reported by backends that have no compositor.
    pub const NOT_SUPPORTED: Self = Self(0x8000_4001_u32 as i32);
}

impl std::fmt::Display for NativeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0 as u32)
    }
}

/// `ACCENT_STATE` values understood by `SetWindowCompositionAttribute`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccentState {
    Disabled = 0,
    Gradient = 1,
    TransparentGradient = 2,
    BlurBehind = 3,
    AcrylicBlurBehind = 4,
}

/// `ACCENT_POLICY` payload of the `WCA_ACCENT_POLICY` attribute.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccentPolicy {
    pub accent_state: AccentState,
    pub accent_flags: u32,
    /// `0xAABBGGRR`
    pub gradient_color: u32,
    pub animation_id: u32,
}

impl AccentPolicy {
    pub fn new(accent_state: AccentState, gradient_color: u32) -> Self {
        Self {
            accent_state,
            accent_flags: 0,
            gradient_color,
            animation_id: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(AccentState::Disabled, 0)
    }
}

/// `DWM_WINDOW_CORNER_PREFERENCE`
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerPreference {
    Default = 0,
    DoNotRound = 1,
    Round = 2,
    RoundSmall = 3,
}

/// `DWMWA_COLOR_DEFAULT`: let the system pick the border color.
pub const BORDER_COLOR_DEFAULT: u32 = 0xFFFF_FFFF;
/// `DWMWA_COLOR_NONE`: suppress the border.
pub const BORDER_COLOR_NONE: u32 = 0xFFFF_FFFE;

/// Every platform call the engine makes goes through this trait.
pub trait CompositionBackend: Send + Sync {
    /// OS build number, or 0 when not running on Windows.
    fn build_number(&self) -> u32;

    /// Whether the undocumented composition attribute entry point resolves.
    fn has_composition_attribute(&self) -> bool;

    fn is_window(&self, handle: WindowHandle) -> bool;

    fn set_accent_policy(&self, handle: WindowHandle, policy: AccentPolicy) -> Result<(), NativeStatus>;

    fn set_corner_preference(&self, handle: WindowHandle, preference: CornerPreference) -> Result<(), NativeStatus>;

    /// `color` is a COLORREF or one of the `BORDER_COLOR_*` sentinels.
    fn set_border_color(&self, handle: WindowHandle, color: u32) -> Result<(), NativeStatus>;
}

impl<T: CompositionBackend + ?Sized> CompositionBackend for std::sync::Arc<T> {
    fn build_number(&self) -> u32 {
        (**self).build_number()
    }

    fn has_composition_attribute(&self) -> bool {
        (**self).has_composition_attribute()
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        (**self).is_window(handle)
    }

    fn set_accent_policy(&self, handle: WindowHandle, policy: AccentPolicy) -> Result<(), NativeStatus> {
        (**self).set_accent_policy(handle, policy)
    }

    fn set_corner_preference(&self, handle: WindowHandle, preference: CornerPreference) -> Result<(), NativeStatus> {
        (**self).set_corner_preference(handle, preference)
    }

    fn set_border_color(&self, handle: WindowHandle, color: u32) -> Result<(), NativeStatus> {
        (**self).set_border_color(handle, color)
    }
}
