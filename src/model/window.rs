//! The window record the switcher cycles through, and the rules for which
//! windows qualify and in which order they appear.

use std::cmp::Ordering;

pub use nix::libc::pid_t;
use serde::{Deserialize, Serialize};

use crate::common::config::DiscoverySettings;
use crate::sys::geometry::{Point, Rect, Size};

pub const AX_STANDARD_WINDOW_SUBROLE: &str = "AXStandardWindow";
pub const AX_DIALOG_SUBROLE: &str = "AXDialog";

/// A window server window number (`CGWindowID`). Zero means unknown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowServerId(u32);

impl WindowServerId {
    pub const UNKNOWN: WindowServerId = WindowServerId(0);

    pub fn new(id: u32) -> WindowServerId { WindowServerId(id) }

    pub fn get(&self) -> u32 { self.0 }

    pub fn is_known(&self) -> bool { self.0 != 0 }
}

/// Snapshot of one switchable window.
///
/// `H` is whatever the platform needs to act on the window later (an
/// accessibility element on macOS).
#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo<H = ()> {
    pub id: WindowServerId,
    pub title: String,
    pub owner_name: String,
    pub owner_pid: pid_t,
    pub bounds: Rect,
    pub is_active: bool,
    #[serde(skip)]
    pub handle: H,
}

impl<H> WindowInfo<H> {
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            self.owner_name.clone()
        } else {
            format!("{} - {}", self.owner_name, self.title)
        }
    }

    pub fn with_handle<T>(self, handle: T) -> WindowInfo<T> {
        WindowInfo {
            id: self.id,
            title: self.title,
            owner_name: self.owner_name,
            owner_pid: self.owner_pid,
            bounds: self.bounds,
            is_active: self.is_active,
            handle,
        }
    }
}

/// Inactive windows first so the first selection is never the window the
/// user is already looking at; then by application, then by title.
pub fn switching_order<H>(a: &WindowInfo<H>, b: &WindowInfo<H>) -> Ordering {
    a.is_active
        .cmp(&b.is_active)
        .then_with(|| a.owner_name.cmp(&b.owner_name))
        .then_with(|| a.title.cmp(&b.title))
}

pub fn sort_for_switching<H>(windows: &mut [WindowInfo<H>]) { windows.sort_by(switching_order); }

pub fn is_excluded_app(name: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|pattern| name.contains(pattern.as_str()))
}

/// Standard windows and dialogs qualify. Elements that do not report a
/// subrole qualify if they at least have a title.
pub fn is_switchable_subrole(subrole: Option<&str>, has_title: bool) -> bool {
    match subrole {
        Some(subrole) => subrole == AX_STANDARD_WINDOW_SUBROLE || subrole == AX_DIALOG_SUBROLE,
        None => has_title,
    }
}

fn has_valid_size(settings: &DiscoverySettings, size: Size) -> bool {
    size.width > settings.min_size.width && size.height > settings.min_size.height
}

fn has_meaningful_title(settings: &DiscoverySettings, title: &str) -> bool {
    !title.is_empty() && !settings.placeholder_titles.iter().any(|p| p == title)
}

/// Decides whether a window with this title and geometry is worth showing,
/// and with which bounds.
///
/// A window qualifies with a usable size or a meaningful title. Titled
/// windows without a usable size get the fallback size at their origin.
pub fn resolve_bounds(
    settings: &DiscoverySettings,
    title: &str,
    origin: Point,
    size: Size,
) -> Option<Rect> {
    if has_valid_size(settings, size) {
        Some(Rect::from_parts(origin, size))
    } else if has_meaningful_title(settings, title) {
        Some(Rect::from_parts(origin, settings.fallback_size))
    } else {
        None
    }
}

/// One row of the window server's on-screen window list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowListEntry {
    pub id: WindowServerId,
    pub layer: i32,
    pub owner_pid: pid_t,
    pub owner_name: String,
    pub name: Option<String>,
    pub bounds: Rect,
}

/// The list is ordered front to back, so the first normal-layer window is
/// the one that has focus.
pub fn frontmost_window_id(entries: &[WindowListEntry]) -> Option<WindowServerId> {
    entries.iter().find(|e| e.layer == 0).map(|e| e.id)
}

/// Turns the window server list into switcher entries: normal-layer windows
/// of applications that are not excluded and not this process.
pub fn switchable_entries(
    entries: &[WindowListEntry],
    settings: &DiscoverySettings,
    own_pid: pid_t,
) -> Vec<WindowInfo> {
    let frontmost = frontmost_window_id(entries);
    let mut windows: Vec<WindowInfo> = entries
        .iter()
        .filter(|e| e.layer == 0 && e.owner_pid != own_pid)
        .filter(|e| !is_excluded_app(&e.owner_name, &settings.excluded_apps))
        .filter_map(|e| {
            let title = e.name.clone().unwrap_or_default();
            let bounds = resolve_bounds(settings, &title, e.bounds.origin, e.bounds.size)?;
            Some(WindowInfo {
                id: e.id,
                title,
                owner_name: e.owner_name.clone(),
                owner_pid: e.owner_pid,
                bounds,
                is_active: Some(e.id) == frontmost,
                handle: (),
            })
        })
        .collect();
    sort_for_switching(&mut windows);
    windows
}

/// Removes later duplicates, keeping first occurrences in place.
pub fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// What happened when the user picked a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub app_activated: bool,
    /// `None` when there was no accessibility element to raise.
    pub window_raised: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("no running application with pid {0}")]
    AppNotRunning(pid_t),
    #[error("application with pid {0} has terminated")]
    AppTerminated(pid_t),
}
