//! Raw Input host for the special keys interface.
//!
//! A message-only window registers the configured HID top-level collection
//! with `RIDEV_INPUTSINK | RIDEV_DEVNOTIFY`, so reports arrive even while
//! another window has focus and device arrival/removal is announced with
//! `WM_INPUT_DEVICE_CHANGE`.
//!
//! All messages are handled on the thread running [`RawInputHost::run`], so
//! reports for a device instance are translated strictly one at a time.

use std::cell::RefCell;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use windows::Win32::Foundation::{GetLastError, HANDLE, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::*;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::PCWSTR;

use super::sendinput::SendInputSink;
use crate::config::AppConfig;
use crate::device::{DeviceBinding, DeviceId, DeviceRegistry};
use crate::error::TranslateError;
use crate::keymap::ScancodeMap;
use crate::translator::{ReportTranslator, Translation, split_reports};
use crate::util::unlikely;

/// Window class name for the Raw Input message-only window.
const RAWINPUT_WINDOW_CLASS: &str = "Maj1428RawInputWindow";

/// `RegisterClassW` fails with this when the class already exists.
const ERROR_CLASS_ALREADY_EXISTS: u32 = 1410;

/// Global host instance reached from the window procedure.
static RAW_INPUT_HOST: OnceLock<RawInputHost> = OnceLock::new();

/// Thread running the message loop, 0 while not running.
static HOST_THREAD_ID: AtomicU32 = AtomicU32::new(0);

thread_local! {
    /// Reused `GetRawInputData` buffer, `u64` elements keep `RAWINPUT` aligned.
    static REPORT_BUFFER: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Asks the message loop to exit. Returns false if it is not running.
pub fn request_quit() -> bool {
    let thread_id = HOST_THREAD_ID.load(Ordering::Acquire);
    if thread_id == 0 {
        return false;
    }
    unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)).is_ok() }
}

/// Binds the report translator to Raw Input and `SendInput`.
pub struct RawInputHost {
    translator: ReportTranslator<'static>,
    registry: DeviceRegistry,
}

impl RawInputHost {
    fn new(hwnd: HWND, config: &AppConfig) -> anyhow::Result<Self> {
        Self::register_collection(hwnd, config.usage_page, config.usage)?;

        Ok(Self {
            translator: ReportTranslator::new(ScancodeMap::builtin()),
            registry: DeviceRegistry::new(config.device_id),
        })
    }

    /// Runs the Windows message loop until `WM_QUIT`.
    pub fn run(config: &AppConfig) -> anyhow::Result<()> {
        unsafe {
            let class_name = Self::to_wstring(RAWINPUT_WINDOW_CLASS);
            let h_instance = GetModuleHandleW(None)?;

            let wc = WNDCLASSW {
                lpfnWndProc: Some(Self::window_proc),
                hInstance: HINSTANCE(h_instance.0),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            if RegisterClassW(&wc) == 0 {
                let last_error = GetLastError();
                if last_error.0 != ERROR_CLASS_ALREADY_EXISTS {
                    return Err(anyhow::anyhow!(
                        "Failed to register window class: {:?}",
                        last_error
                    ));
                }
            }

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_name.as_ptr()),
                windows::core::w!("MAJ-1428 Raw Input Window"),
                WINDOW_STYLE(0),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                Some(HINSTANCE(h_instance.0)),
                None,
            )?;

            let host = Self::new(hwnd, config)?;
            if RAW_INPUT_HOST.set(host).is_err() {
                anyhow::bail!("Raw Input host is already running");
            }
            HOST_THREAD_ID.store(GetCurrentThreadId(), Ordering::Release);

            tracing::info!(
                device = %config.device_id,
                usage_page = format_args!("0x{:02X}", config.usage_page),
                usage = format_args!("0x{:02X}", config.usage),
                "listening for special key reports"
            );

            let mut msg = MSG::default();
            loop {
                let result = GetMessageW(&mut msg, None, 0, 0);

                if result.0 == 0 || result.0 == -1 {
                    break;
                }

                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }

            HOST_THREAD_ID.store(0, Ordering::Release);
            if let Some(host) = RAW_INPUT_HOST.get() {
                host.registry.clear();
            }

            let _ = DestroyWindow(hwnd);
            UnregisterClassW(PCWSTR(class_name.as_ptr()), Some(HINSTANCE(h_instance.0)))?;
        }

        tracing::info!("Raw Input host stopped");
        Ok(())
    }

    /// Window procedure for Raw Input messages
    #[allow(non_snake_case)]
    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        w_param: WPARAM,
        l_param: LPARAM,
    ) -> LRESULT {
        const WM_INPUT_DEVICE_CHANGE: u32 = 0x00FE;
        const GIDC_ARRIVAL: usize = 1;
        const GIDC_REMOVAL: usize = 2;

        match msg {
            WM_INPUT => unsafe {
                if let Some(host) = RAW_INPUT_HOST.get() {
                    host.handle_raw_input(l_param);
                }
                DefWindowProcW(hwnd, msg, w_param, l_param)
            },
            WM_INPUT_DEVICE_CHANGE => unsafe {
                // lParam carries the device handle for both notifications
                if let Some(host) = RAW_INPUT_HOST.get() {
                    let device_handle = HANDLE(l_param.0 as _);
                    match w_param.0 {
                        GIDC_ARRIVAL => {
                            host.attach(device_handle);
                        }
                        GIDC_REMOVAL => {
                            host.registry.detach(device_handle.0 as isize);
                        }
                        _ => {}
                    }
                }
                DefWindowProcW(hwnd, msg, w_param, l_param)
            },
            WM_CLOSE | WM_DESTROY => unsafe {
                PostQuitMessage(0);
                LRESULT(0)
            },
            _ => unsafe { DefWindowProcW(hwnd, msg, w_param, l_param) },
        }
    }

    /// Converts a string to null-terminated UTF-16 for Windows APIs.
    fn to_wstring(s: &str) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        std::ffi::OsStr::new(s)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    /// Registers the special keys collection with the Raw Input API.
    fn register_collection(hwnd: HWND, usage_page: u16, usage: u16) -> anyhow::Result<()> {
        let devices = [RAWINPUTDEVICE {
            usUsagePage: usage_page,
            usUsage: usage,
            dwFlags: RIDEV_INPUTSINK | RIDEV_DEVNOTIFY,
            hwndTarget: hwnd,
        }];

        unsafe {
            RegisterRawInputDevices(&devices, std::mem::size_of::<RAWINPUTDEVICE>() as u32)
                .map_err(|e| anyhow::anyhow!("Failed to register Raw Input collection: {}", e))
        }
    }

    /// Classifies a device instance and records it.
    fn attach(&self, device_handle: HANDLE) -> Option<DeviceBinding> {
        let handle_key = device_handle.0 as isize;
        if let Some(binding) = self.registry.binding(handle_key) {
            return Some(binding);
        }
        let id = Self::query_device_id(device_handle)?;
        Some(self.registry.attach(handle_key, id))
    }

    /// Reads vendor and product id of a HID device.
    fn query_device_id(device_handle: HANDLE) -> Option<DeviceId> {
        let mut info = RID_DEVICE_INFO {
            cbSize: std::mem::size_of::<RID_DEVICE_INFO>() as u32,
            ..Default::default()
        };
        let mut size = info.cbSize;

        let result = unsafe {
            GetRawInputDeviceInfoW(
                Some(device_handle),
                RIDI_DEVICEINFO,
                Some(&mut info as *mut RID_DEVICE_INFO as _),
                &mut size,
            )
        };

        if unlikely(result == u32::MAX || result == 0) {
            return None;
        }
        if info.dwType != RIM_TYPEHID {
            return None;
        }

        let hid_info = unsafe { &info.Anonymous.hid };
        Some(DeviceId::new(
            hid_info.dwVendorId as u16,
            hid_info.dwProductId as u16,
        ))
    }

    /// Processes a WM_INPUT message from the Windows message loop.
    fn handle_raw_input(&self, l_param: LPARAM) {
        let header_size = std::mem::size_of::<RAWINPUTHEADER>() as u32;
        let mut size = 0u32;

        let result = unsafe {
            GetRawInputData(HRAWINPUT(l_param.0 as _), RID_INPUT, None, &mut size, header_size)
        };
        if unlikely(result != 0 || size == 0) {
            return;
        }

        REPORT_BUFFER.with(|buffer| {
            let mut buffer = buffer.borrow_mut();
            buffer.clear();
            buffer.resize((size as usize).div_ceil(std::mem::size_of::<u64>()), 0);

            let copied = unsafe {
                GetRawInputData(
                    HRAWINPUT(l_param.0 as _),
                    RID_INPUT,
                    Some(buffer.as_mut_ptr() as _),
                    &mut size,
                    header_size,
                )
            };
            if unlikely(copied != size) {
                return;
            }

            let raw = unsafe { &*(buffer.as_ptr() as *const RAWINPUT) };
            self.process_hid_input(raw, copied as usize);
        });
    }

    /// `copied` is the number of bytes `GetRawInputData` wrote behind `raw`.
    fn process_hid_input(&self, raw: &RAWINPUT, copied: usize) {
        if raw.header.dwType != RIM_TYPEHID.0 {
            return;
        }

        let device_handle = raw.header.hDevice;
        let handle_key = device_handle.0 as isize;
        let binding = match self.registry.binding(handle_key) {
            Some(binding) => Some(binding),
            None => self.attach(device_handle),
        };
        if !matches!(binding, Some(DeviceBinding::Bound(_))) {
            return;
        }

        let hid = unsafe { &raw.data.hid };
        let report_size = hid.dwSizeHid as usize;
        let report_count = hid.dwCount as usize;
        if unlikely(report_count == 0) {
            return;
        }

        // The header's size fields are not trusted past the copied buffer
        let payload = hid.bRawData.as_ptr();
        let payload_offset = payload as usize - raw as *const RAWINPUT as usize;
        let available = copied.saturating_sub(payload_offset);
        let claimed = report_size.checked_mul(report_count).unwrap_or(usize::MAX);
        let data = unsafe { std::slice::from_raw_parts(payload, claimed.min(available)) };

        for report in split_reports(data, report_size, report_count) {
            self.dispatch_report(handle_key, report);
        }
    }

    /// Translates one report; failures are logged and the report dropped.
    #[inline]
    fn dispatch_report(&self, handle_key: isize, report: &[u8]) {
        match self.translator.dispatch(report, SendInputSink::new()) {
            Ok(Translation::Tapped(_) | Translation::Ignored(_)) => {}
            Err(TranslateError::MalformedReport { len, .. }) => {
                tracing::warn!(handle = handle_key, len, "dropping malformed report");
            }
            Err(TranslateError::Sink(e)) => {
                tracing::warn!(handle = handle_key, error = %e, "failed to inject key");
            }
        }
    }
}
