//! Platform-specific composition backend

#[cfg(target_os = "windows")]
pub use self::windows_backend::NativeBackend;

#[cfg(not(target_os = "windows"))]
pub use self::fallback::NativeBackend;

#[cfg(target_os = "windows")]
mod windows_backend {
    use std::ffi::c_void;
    use std::mem::size_of;

    use windows::Win32::Foundation::{GetLastError, BOOL, ERROR_SUCCESS, HWND};
    use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
    use windows::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress, LoadLibraryW};
    use windows::Win32::System::Registry::{RegGetValueW, HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ};
    use windows::Win32::UI::WindowsAndMessaging::IsWindow;
    use windows::{s, w};

    use crate::backend::{AccentPolicy, CompositionBackend, CornerPreference, NativeStatus};
    use crate::handle::WindowHandle;

    const WCA_ACCENT_POLICY: u32 = 19;
    const DWMWA_WINDOW_CORNER_PREFERENCE: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(33);
    const DWMWA_BORDER_COLOR: DWMWINDOWATTRIBUTE = DWMWINDOWATTRIBUTE(34);

    #[repr(C)]
    struct WindowCompositionAttribData {
        attrib: u32,
        data: *mut c_void,
        size: usize,
    }

    type SetWindowCompositionAttribute =
        unsafe extern "system" fn(HWND, *mut WindowCompositionAttribData) -> BOOL;

    /// Composition calls into `user32` and `dwmapi`.
    pub struct NativeBackend {
        set_wca: Option<SetWindowCompositionAttribute>,
        build: u32,
    }

    impl NativeBackend {
        pub fn new() -> Self {
            Self {
                set_wca: resolve_set_wca(),
                build: read_build_number(),
            }
        }
    }

    impl Default for NativeBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    fn hwnd(handle: WindowHandle) -> HWND {
        HWND(handle.raw() as isize)
    }

    fn last_error() -> NativeStatus {
        NativeStatus(unsafe { GetLastError() }.0 as i32)
    }

    fn resolve_set_wca() -> Option<SetWindowCompositionAttribute> {
        unsafe {
            let user32 = GetModuleHandleW(w!("user32.dll"))
                .or_else(|_| LoadLibraryW(w!("user32.dll")))
                .ok()?;
            let proc = GetProcAddress(user32, s!("SetWindowCompositionAttribute"))?;
            Some(std::mem::transmute::<unsafe extern "system" fn() -> isize, SetWindowCompositionAttribute>(proc))
        }
    }

    fn read_build_number() -> u32 {
        let mut buf = [0u16; 64];
        let mut size = (buf.len() * size_of::<u16>()) as u32;

        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                w!("SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion"),
                w!("CurrentBuildNumber"),
                RRF_RT_REG_SZ,
                None,
                Some(buf.as_mut_ptr().cast()),
                Some(&mut size),
            )
        };
        if status != ERROR_SUCCESS {
            log::warn!("Could not read CurrentBuildNumber (error {})", status.0);
            return 0;
        }

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        let text = String::from_utf16_lossy(&buf[..len]);
        text.trim().parse().unwrap_or_else(|_| {
            log::warn!("Unexpected CurrentBuildNumber '{}'", text);
            0
        })
    }

    fn dwm_set<T>(handle: WindowHandle, attribute: DWMWINDOWATTRIBUTE, value: &T) -> Result<(), NativeStatus> {
        unsafe {
            DwmSetWindowAttribute(
                hwnd(handle),
                attribute,
                value as *const T as *const c_void,
                size_of::<T>() as u32,
            )
        }
        .map_err(|e| NativeStatus(e.code().0))
    }

    impl CompositionBackend for NativeBackend {
        fn build_number(&self) -> u32 {
            self.build
        }

        fn has_composition_attribute(&self) -> bool {
            self.set_wca.is_some()
        }

        fn is_window(&self, handle: WindowHandle) -> bool {
            unsafe { IsWindow(hwnd(handle)) }.as_bool()
        }

        fn set_accent_policy(&self, handle: WindowHandle, policy: AccentPolicy) -> Result<(), NativeStatus> {
            let set_wca = self.set_wca.ok_or(NativeStatus::NOT_SUPPORTED)?;
            let mut policy = policy;
            let mut data = WindowCompositionAttribData {
                attrib: WCA_ACCENT_POLICY,
                data: &mut policy as *mut AccentPolicy as *mut c_void,
                size: size_of::<AccentPolicy>(),
            };

            if unsafe { set_wca(hwnd(handle), &mut data) }.as_bool() {
                Ok(())
            } else {
                Err(last_error())
            }
        }

        fn set_corner_preference(&self, handle: WindowHandle, preference: CornerPreference) -> Result<(), NativeStatus> {
            dwm_set(handle, DWMWA_WINDOW_CORNER_PREFERENCE, &(preference as i32))
        }

        fn set_border_color(&self, handle: WindowHandle, color: u32) -> Result<(), NativeStatus> {
            dwm_set(handle, DWMWA_BORDER_COLOR, &color)
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod fallback {
    use crate::backend::{AccentPolicy, CompositionBackend, CornerPreference, NativeStatus};
    use crate::handle::WindowHandle;

    /// No system compositor exposes these effects here.
    #[derive(Debug, Default)]
    pub struct NativeBackend;

    impl NativeBackend {
        pub fn new() -> Self {
            Self
        }
    }

    impl CompositionBackend for NativeBackend {
        fn build_number(&self) -> u32 {
            0
        }

        fn has_composition_attribute(&self) -> bool {
            false
        }

        fn is_window(&self, _handle: WindowHandle) -> bool {
            false
        }

        fn set_accent_policy(&self, _handle: WindowHandle, _policy: AccentPolicy) -> Result<(), NativeStatus> {
            Err(NativeStatus::NOT_SUPPORTED)
        }

        fn set_corner_preference(&self, _handle: WindowHandle, _preference: CornerPreference) -> Result<(), NativeStatus> {
            Err(NativeStatus::NOT_SUPPORTED)
        }

        fn set_border_color(&self, _handle: WindowHandle, _color: u32) -> Result<(), NativeStatus> {
            Err(NativeStatus::NOT_SUPPORTED)
        }
    }

}
