use nix::libc::pid_t;
use objc2::rc::Retained;
use objc2_app_kit::{
    NSApplicationActivationOptions, NSApplicationActivationPolicy, NSImage, NSRunningApplication,
    NSWorkspace,
};
use tracing::{debug, trace};

use super::axuielement::AXUIElement;
use crate::model::window::{Activation, ActivationError, WindowServerId};

pub trait NSRunningApplicationExt {
    fn with_process_id(pid: pid_t) -> Option<Retained<Self>>;
    fn pid(&self) -> pid_t;
    fn name(&self) -> String;
}

impl NSRunningApplicationExt for NSRunningApplication {
    fn with_process_id(pid: pid_t) -> Option<Retained<Self>> {
        NSRunningApplication::runningApplicationWithProcessIdentifier(pid)
    }

    fn pid(&self) -> pid_t { self.processIdentifier() }

    fn name(&self) -> String { self.localizedName().map(|n| n.to_string()).unwrap_or_default() }
}

/// Applications with a Dock presence that are still running.
pub fn regular_applications() -> Vec<Retained<NSRunningApplication>> {
    NSWorkspace::sharedWorkspace()
        .runningApplications()
        .iter()
        .filter(|app| {
            app.activationPolicy() == NSApplicationActivationPolicy::Regular && !app.isTerminated()
        })
        .collect()
}

pub fn app_icon(pid: pid_t) -> Option<Retained<NSImage>> {
    NSRunningApplication::with_process_id(pid)?.icon()
}

/// Brings `pid` to the front and then raises one of its windows.
///
/// Without an accessibility element for the window, the application's
/// windows are searched for one with the same window server id.
pub fn activate_window(
    pid: pid_t,
    id: WindowServerId,
    element: Option<&AXUIElement>,
) -> Result<Activation, ActivationError> {
    let app = NSRunningApplication::with_process_id(pid).ok_or(ActivationError::AppNotRunning(pid))?;
    if app.isTerminated() {
        return Err(ActivationError::AppTerminated(pid));
    }

    #[allow(deprecated)]
    let app_activated =
        app.activateWithOptions(NSApplicationActivationOptions::ActivateIgnoringOtherApps);

    let found;
    let element = match element {
        Some(element) => Some(element),
        None => {
            found = find_window(pid, id);
            found.as_ref()
        }
    };
    let window_raised = element.map(|element| {
        let raised = element.raise();
        if let Err(err) = &raised {
            debug!(?pid, ?id, "AXRaise failed: {err}");
        }
        // Some apps only take focus for a window when it is also pressed.
        _ = element.press();
        raised.is_ok()
    });
    trace!(?pid, ?id, app_activated, ?window_raised, "activation");

    Ok(Activation { app_activated, window_raised })
}

fn find_window(pid: pid_t, id: WindowServerId) -> Option<AXUIElement> {
    if !id.is_known() {
        return None;
    }
    let windows = AXUIElement::application(pid).windows().ok()?;
    windows.into_iter().find(|w| w.window_id().is_ok_and(|wid| wid == id))
}
