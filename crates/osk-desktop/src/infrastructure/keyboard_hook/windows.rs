//! Windows low-level keyboard hook implementation.
//!
//! Installs `WH_KEYBOARD_LL` on a dedicated thread that runs a Win32 message
//! loop.  `stop()` posts `WM_QUIT` to that thread; the thread unhooks before it
//! exits, so install and uninstall always happen on the same thread.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use osk_core::{KeyCodeMap, VirtualKeyCode};
use tracing::{debug, info, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP,
    WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::{HookError, HookEvent, HookSink, KeyboardHook};
use crate::infrastructure::input_simulation::SYNTHETIC_EVENT_MARKER;

/// Sink used by the hook callback.  A hook procedure has no user-data pointer,
/// so the sink has to be reachable from a static.
static ACTIVE_SINK: RwLock<Option<HookSink>> = RwLock::new(None);

/// Only one `WH_KEYBOARD_LL` hook per process may feed [`ACTIVE_SINK`].
static HOOK_ACTIVE: AtomicBool = AtomicBool::new(false);

struct HookThread {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// Windows low-level keyboard hook.
pub struct WindowsKeyboardHook {
    thread: Mutex<Option<HookThread>>,
}

impl WindowsKeyboardHook {
    /// Creates a new (uninstalled) hook.
    pub fn new() -> Self {
        Self {
            thread: Mutex::new(None),
        }
    }
}

impl Default for WindowsKeyboardHook {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHook for WindowsKeyboardHook {
    fn start(&self, sink: HookSink) -> Result<(), HookError> {
        let mut guard = self.thread.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() || HOOK_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(HookError::AlreadyInstalled);
        }

        set_active_sink(Some(sink));

        // The thread reports its id once the hook is installed, or the reason
        // installation failed.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let join = thread::Builder::new()
            .name("osk-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| {
                release_hook_slot();
                HookError::InstallFailed(e.to_string())
            })?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                info!(thread_id, "keyboard hook installed");
                *guard = Some(HookThread { thread_id, join });
                Ok(())
            }
            Ok(Err(reason)) => {
                let _ = join.join();
                release_hook_slot();
                Err(HookError::InstallFailed(reason))
            }
            Err(_) => {
                let _ = join.join();
                release_hook_slot();
                Err(HookError::InstallFailed(
                    "hook thread exited before reporting".to_string(),
                ))
            }
        }
    }

    fn stop(&self) {
        let Some(hook_thread) = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        // SAFETY: Posting a message to a thread id we own has no memory-safety
        // preconditions; failure only means the thread is already gone.
        let posted = unsafe {
            PostThreadMessageW(hook_thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0))
        };
        if let Err(e) = posted {
            warn!("failed to post WM_QUIT to hook thread: {e}");
        }
        if hook_thread.join.join().is_err() {
            warn!("hook thread panicked");
        }

        release_hook_slot();
        info!("keyboard hook uninstalled");
    }

    fn is_installed(&self) -> bool {
        self.thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for WindowsKeyboardHook {
    fn drop(&mut self) {
        self.stop();
    }
}

fn set_active_sink(sink: Option<HookSink>) {
    *ACTIVE_SINK.write().unwrap_or_else(PoisonError::into_inner) = sink;
}

fn release_hook_slot() {
    set_active_sink(None);
    HOOK_ACTIVE.store(false, Ordering::SeqCst);
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, String>>) {
    // SAFETY: GetModuleHandleW(None) returns the handle of the running
    // executable and has no preconditions.
    let module = unsafe { GetModuleHandleW(None) }
        .ok()
        .map(|m| HINSTANCE(m.0));

    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which this thread does below until WM_QUIT.
    let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), module, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };
    let _ = ready.send(Ok(thread_id));

    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop.  GetMessageW
    // returns 0 on WM_QUIT and -1 on error; both end the loop.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
        if let Err(e) = UnhookWindowsHookEx(hook) {
            warn!("UnhookWindowsHookEx failed: {e}");
        }
    }
}

/// `VK_LCONTROL`.
const VK_LCONTROL_CODE: u32 = 0xA2;

/// Scan code of the left-Control event Windows fabricates ahead of
/// `VK_RMENU` when AltGr is pressed on layouts that have it (ES).
const ALTGR_FAKE_CONTROL_SCAN: u32 = 0x21D;

/// Translates one low-level keyboard message into a [`HookEvent`].
///
/// Returns `None` for messages other than key down/up, for virtual key
/// codes outside the closed key set, and for the fabricated left-Control
/// that accompanies AltGr (otherwise ControlLeft would light with AltGr).
fn translate(message: u32, kbs: &KBDLLHOOKSTRUCT) -> Option<HookEvent> {
    if kbs.vkCode == VK_LCONTROL_CODE && kbs.scanCode == ALTGR_FAKE_CONTROL_SCAN {
        return None;
    }
    let key = KeyCodeMap::virtual_to_physical(VirtualKeyCode::new(u8::try_from(kbs.vkCode).ok()?))?;
    let injected = kbs.dwExtraInfo == SYNTHETIC_EVENT_MARKER;

    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(HookEvent::KeyDown { key, injected }),
        WM_KEYUP | WM_SYSKEYUP => Some(HookEvent::KeyUp { key, injected }),
        _ => None,
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook message-loop thread.  Must return quickly
/// or Windows silently removes the hook.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);

        match translate(w_param.0 as u32, kbs) {
            Some(event) => {
                let sink = ACTIVE_SINK
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(sink) = sink {
                    sink(event);
                }
            }
            None => debug!(vk = kbs.vkCode, "unmapped key event ignored"),
        }
    }

    // SAFETY: Observation only; every event is passed on to the next hook.
    CallNextHookEx(None, n_code, w_param, l_param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osk_core::PhysicalKey;

    fn hook_struct(vk: u32, extra: usize) -> KBDLLHOOKSTRUCT {
        KBDLLHOOKSTRUCT {
            vkCode: vk,
            dwExtraInfo: extra,
            ..Default::default()
        }
    }

    #[test]
    fn test_translate_key_down_and_up() {
        assert_eq!(
            translate(WM_KEYDOWN, &hook_struct(0x41, 0)),
            Some(HookEvent::KeyDown { key: PhysicalKey::KeyA, injected: false })
        );
        assert_eq!(
            translate(WM_SYSKEYUP, &hook_struct(0xA4, 0)),
            Some(HookEvent::KeyUp { key: PhysicalKey::AltLeft, injected: false })
        );
    }

    #[test]
    fn test_translate_marks_events_carrying_the_synthetic_marker() {
        let event = translate(WM_KEYDOWN, &hook_struct(0x41, SYNTHETIC_EVENT_MARKER));
        assert_eq!(event, Some(HookEvent::KeyDown { key: PhysicalKey::KeyA, injected: true }));
    }

    #[test]
    fn test_translate_drops_fabricated_control_from_altgr() {
        // Arrange: AltGr arrives as a fake VK_LCONTROL (scan 0x21D) then VK_RMENU.
        let fake_control = KBDLLHOOKSTRUCT {
            scanCode: ALTGR_FAKE_CONTROL_SCAN,
            ..hook_struct(VK_LCONTROL_CODE, 0)
        };
        let real_control = KBDLLHOOKSTRUCT {
            scanCode: 0x1D,
            ..hook_struct(VK_LCONTROL_CODE, 0)
        };

        // Act / Assert
        assert_eq!(translate(WM_KEYDOWN, &fake_control), None);
        assert_eq!(translate(WM_KEYUP, &fake_control), None);
        assert_eq!(
            translate(WM_KEYDOWN, &real_control),
            Some(HookEvent::KeyDown { key: PhysicalKey::ControlLeft, injected: false })
        );
        assert_eq!(
            translate(WM_KEYDOWN, &hook_struct(0xA5, 0)),
            Some(HookEvent::KeyDown { key: PhysicalKey::AltRight, injected: false })
        );
    }

    #[test]
    fn test_translate_drops_unmapped_virtual_codes() {
        // VK_NUMPAD0 is outside the closed key set.
        assert_eq!(translate(WM_KEYDOWN, &hook_struct(0x60, 0)), None);
        assert_eq!(translate(WM_KEYDOWN, &hook_struct(0x1_0041, 0)), None);
    }
}
