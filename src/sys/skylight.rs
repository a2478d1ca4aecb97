//! Private entry points of the window server and accessibility frameworks,
//! plus the native Cmd+Tab toggle built on them.

#![allow(non_upper_case_globals, non_snake_case)]

use objc2_application_services::{AXError, AXUIElement};
use objc2_core_foundation::CFData;
use objc2_core_graphics::{CGError, CGWindowID};
use tracing::{debug, info, warn};

use crate::sys::hotkey::SymbolicHotKey;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    pub fn CGSSetSymbolicHotKeyEnabled(hotkey: i32, enabled: bool) -> CGError;
    pub fn CGSIsSymbolicHotKeyEnabled(hotkey: i32) -> bool;
}

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    pub fn _AXUIElementCreateWithRemoteToken(token: &CFData) -> *mut AXUIElement;
    pub fn _AXUIElementGetWindow(elem: &AXUIElement, wid: *mut CGWindowID) -> AXError;
}

/// Turns the Dock's application switcher shortcuts on or off.
///
/// The setting outlives this process, so every disable needs a matching
/// enable (see [`NativeSwitcherGuard`] and `restore-hotkeys`).
pub fn set_native_switcher_enabled(enabled: bool, hotkeys: &[SymbolicHotKey]) {
    for &hotkey in hotkeys {
        let err = unsafe { CGSSetSymbolicHotKeyEnabled(hotkey.into(), enabled) };
        if err != CGError::Success {
            warn!(?hotkey, ?err, enabled, "CGSSetSymbolicHotKeyEnabled failed");
        }
    }
    debug!(enabled, ?hotkeys, "native switcher hotkeys updated");
}

pub fn native_switcher_enabled(hotkey: SymbolicHotKey) -> bool {
    unsafe { CGSIsSymbolicHotKeyEnabled(hotkey.into()) }
}

/// Disables the native switcher for as long as it is alive.
#[must_use]
pub struct NativeSwitcherGuard {
    hotkeys: Vec<SymbolicHotKey>,
}

impl NativeSwitcherGuard {
    pub fn disable(hotkeys: Vec<SymbolicHotKey>) -> Self {
        set_native_switcher_enabled(false, &hotkeys);
        info!("native Cmd+Tab disabled");
        NativeSwitcherGuard { hotkeys }
    }
}

impl Drop for NativeSwitcherGuard {
    fn drop(&mut self) {
        set_native_switcher_enabled(true, &self.hotkeys);
        info!("native Cmd+Tab re-enabled");
    }
}
