//! Opaque top-level window handle

use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};

/// Platform window handle stored as a raw bit pattern.
///
/// The engine never dereferences it; it is only passed back to the platform.
/// Validity is guaranteed by the caller for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Wrap a raw handle value. Zero is not a window.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// The raw bit pattern.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Extract the handle of a Win32 window from any windowing library that
    /// exposes `raw-window-handle`.
    pub fn from_window(window: &impl HasRawWindowHandle) -> Option<Self> {
        match window.raw_window_handle() {
            RawWindowHandle::Win32(handle) => Self::new(handle.hwnd as usize as u64),
            other => {
                log::debug!("Not a Win32 window handle: {:?}", other);
                None
            }
        }
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
