//! Window discovery for the switcher.
//!
//! [`WindowServerSource`] lists what the window server has on screen; it is
//! cheap and needs no accessibility access to list. [`AccessibilitySource`]
//! walks every regular application through the accessibility API (plus
//! remote-token probing), which also finds windows on other spaces.

use nix::libc::pid_t;
use tracing::{debug, instrument, trace};

use super::app::{self, NSRunningApplicationExt};
use super::axuielement::AXUIElement;
use super::window_server;
use crate::actor::switcher::WindowSource;
use crate::common::config::DiscoverySettings;
use crate::model::window::{
    Activation, ActivationError, WindowInfo, WindowServerId, dedup_preserving_order,
    is_excluded_app, is_switchable_subrole, resolve_bounds, sort_for_switching,
    switchable_entries,
};
use crate::sys::geometry::{Point, Size};

/// Per-application cap on how long a single accessibility request may take.
const MESSAGING_TIMEOUT_SECS: f32 = 0.25;

pub type Window = WindowInfo<Option<AXUIElement>>;

fn activate(window: &Window) -> Result<Activation, ActivationError> {
    app::activate_window(window.owner_pid, window.id, window.handle.as_ref())
}

pub struct WindowServerSource {
    settings: DiscoverySettings,
    own_pid: pid_t,
}

impl WindowServerSource {
    pub fn new(settings: DiscoverySettings) -> Self {
        WindowServerSource {
            settings,
            own_pid: std::process::id() as pid_t,
        }
    }
}

impl WindowSource for WindowServerSource {
    type Handle = Option<AXUIElement>;

    #[instrument(skip(self))]
    fn windows(&mut self) -> Vec<Window> {
        let entries = window_server::on_screen_windows();
        let windows = switchable_entries(&entries, &self.settings, self.own_pid);
        debug!(listed = entries.len(), switchable = windows.len(), "window server windows");
        windows.into_iter().map(|w| w.with_handle(None)).collect()
    }

    fn activate(&mut self, window: &Window) -> Result<Activation, ActivationError> {
        activate(window)
    }
}

pub struct AccessibilitySource {
    settings: DiscoverySettings,
    own_pid: pid_t,
}

impl AccessibilitySource {
    pub fn new(settings: DiscoverySettings) -> Self {
        AccessibilitySource {
            settings,
            own_pid: std::process::id() as pid_t,
        }
    }

    fn app_windows(&self, pid: pid_t, name: &str, frontmost: Option<WindowServerId>) -> Vec<Window> {
        let app = AXUIElement::application(pid);
        _ = app.set_messaging_timeout(MESSAGING_TIMEOUT_SECS);

        let mut elements = app.windows().unwrap_or_else(|err| {
            trace!(?pid, name, "AXWindows unavailable: {err}");
            Vec::new()
        });
        let listed = elements.len();
        if self.settings.brute_force {
            elements.extend(self.brute_force_windows(pid));
        }
        let elements = dedup_preserving_order(elements);
        trace!(?pid, name, listed, total = elements.len(), "accessibility windows");

        elements
            .into_iter()
            .filter(|element| {
                let subrole = element.subrole().ok();
                is_switchable_subrole(subrole.as_deref(), element.title().is_ok())
            })
            .filter_map(|element| self.window_info(element, pid, name, frontmost))
            .collect()
    }

    /// Probes element ids directly. Only standard windows and dialogs are
    /// kept; everything else the ids resolve to (buttons, menus) is noise.
    fn brute_force_windows(&self, pid: pid_t) -> Vec<AXUIElement> {
        (0..self.settings.brute_force_limit)
            .filter_map(|id| AXUIElement::from_remote_token(pid, id))
            .filter(|element| {
                element.subrole().is_ok_and(|s| is_switchable_subrole(Some(s.as_str()), false))
            })
            .collect()
    }

    fn window_info(
        &self,
        element: AXUIElement,
        pid: pid_t,
        owner_name: &str,
        frontmost: Option<WindowServerId>,
    ) -> Option<Window> {
        let title = element.title().unwrap_or_default();
        let origin: Point = element.position().map(Into::into).unwrap_or_default();
        let size: Size = element.size().map(Into::into).unwrap_or_default();
        let bounds = resolve_bounds(&self.settings, &title, origin, size)?;
        let id = element.window_id().unwrap_or(WindowServerId::UNKNOWN);
        Some(WindowInfo {
            id,
            title,
            owner_name: owner_name.to_string(),
            owner_pid: pid,
            bounds,
            is_active: id.is_known() && Some(id) == frontmost,
            handle: Some(element),
        })
    }
}

impl WindowSource for AccessibilitySource {
    type Handle = Option<AXUIElement>;

    #[instrument(skip(self))]
    fn windows(&mut self) -> Vec<Window> {
        let frontmost = window_server::frontmost_window();
        let mut windows = Vec::new();
        for running in app::regular_applications() {
            let pid = running.pid();
            let name = running.name();
            if pid == self.own_pid || is_excluded_app(&name, &self.settings.excluded_apps) {
                continue;
            }
            windows.extend(self.app_windows(pid, &name, frontmost));
        }
        sort_for_switching(&mut windows);
        debug!(count = windows.len(), ?frontmost, "accessibility windows");
        windows
    }

    fn activate(&mut self, window: &Window) -> Result<Activation, ActivationError> {
        activate(window)
    }
}
