use objc2_app_kit::NSWorkspace;
use objc2_application_services::AXIsProcessTrustedWithOptions;
use objc2_foundation::{NSURL, ns_string};
use tracing::{debug, warn};

pub fn is_trusted() -> bool { unsafe { AXIsProcessTrustedWithOptions(None) } }

/// Warns when this process may not use the accessibility API and opens the
/// matching System Settings pane. Returns whether access is granted.
pub fn ensure_accessibility() -> bool {
    if is_trusted() {
        debug!("accessibility access granted");
        return true;
    }
    warn!(
        "accessibility access is required to list and raise windows; grant it in \
         System Settings > Privacy & Security > Accessibility and restart"
    );
    let url = ns_string!(
        "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility"
    );
    match NSURL::URLWithString(url) {
        Some(url) => {
            if !NSWorkspace::sharedWorkspace().openURL(&url) {
                warn!("could not open the Accessibility settings pane");
            }
        }
        None => warn!("invalid settings URL"),
    }
    false
}
