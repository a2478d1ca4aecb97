//! Listens for AppKit telling us the application is about to quit.
//!
//! `NSApplication::terminate` ends the process with `exit`, so guards on the
//! main thread never drop. The native switcher is restored from the
//! notification itself, then the switcher actor is told to stop.

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{AnyThread, DefinedClass, define_class, msg_send, sel};
use objc2_app_kit::{NSApplication, NSApplicationWillTerminateNotification};
use objc2_foundation::{MainThreadMarker, NSNotification, NSNotificationCenter, NSObject};
use tracing::{info, info_span, trace};

use super::switcher::{Event, Sender};
use crate::sys::hotkey::SymbolicHotKey;
use crate::sys::skylight::set_native_switcher_enabled;

struct Instance {
    events_tx: Sender,
    hotkeys: Vec<SymbolicHotKey>,
}

define_class! {
    // SAFETY:
    // - The superclass NSObject does not have any subclassing requirements.
    // - `TerminationObserver` does not implement `Drop`.
    #[unsafe(super(NSObject))]
    #[ivars = Instance]
    struct TerminationObserver;

    // SAFETY: The method signature matches what the notification center invokes.
    impl TerminationObserver {
        #[unsafe(method(applicationWillTerminate:))]
        fn will_terminate(&self, notif: &NSNotification) {
            trace!("{notif:#?}");
            self.handle_will_terminate();
        }
    }
}

impl TerminationObserver {
    fn new(events_tx: Sender, hotkeys: Vec<SymbolicHotKey>) -> Retained<Self> {
        let this = Self::alloc().set_ivars(Instance { events_tx, hotkeys });
        unsafe { msg_send![super(this), init] }
    }

    fn handle_will_terminate(&self) {
        let span = info_span!("notification_center::will_terminate");
        let _s = span.enter();
        let Instance { events_tx, hotkeys } = self.ivars();
        if !hotkeys.is_empty() {
            set_native_switcher_enabled(true, hotkeys);
            info!("native Cmd+Tab re-enabled");
        }
        events_tx.send(Event::Shutdown);
    }

    fn register(&self, center: &NSNotificationCenter, object: Option<&AnyObject>) {
        // SAFETY: `applicationWillTerminate:` takes a single NSNotification.
        unsafe {
            center.addObserver_selector_name_object(
                self,
                sel!(applicationWillTerminate:),
                Some(NSApplicationWillTerminateNotification),
                object,
            );
        }
    }
}

/// Keeps the termination observer registered while alive.
pub struct NotificationCenter {
    center: Retained<NSNotificationCenter>,
    inner: Retained<TerminationObserver>,
}

impl NotificationCenter {
    /// `hotkeys` are re-enabled when the application terminates; pass an
    /// empty list when the native switcher was left alone.
    pub fn new(mtm: MainThreadMarker, events_tx: Sender, hotkeys: Vec<SymbolicHotKey>) -> Self {
        let center = NSNotificationCenter::defaultCenter();
        let app = NSApplication::sharedApplication(mtm);
        let object: &AnyObject = &app;
        let inner = TerminationObserver::new(events_tx, hotkeys);
        inner.register(&center, Some(object));
        NotificationCenter { center, inner }
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) { unsafe { self.center.removeObserver(&self.inner) } }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor;

    fn post_will_terminate(center: &NSNotificationCenter) {
        unsafe { center.postNotificationName_object(NSApplicationWillTerminateNotification, None) }
    }

    #[test]
    fn termination_stops_the_switcher() {
        let center = NSNotificationCenter::new();
        let (tx, mut rx) = actor::channel();
        let observer = TerminationObserver::new(tx, Vec::new());
        observer.register(&center, None);

        post_will_terminate(&center);
        let (_span, event) = rx.try_recv().unwrap();
        assert_eq!(event, Event::Shutdown);
        assert!(rx.try_recv().is_err());

        unsafe { center.removeObserver(&observer) };
        post_will_terminate(&center);
        assert!(rx.try_recv().is_err());
    }
}
