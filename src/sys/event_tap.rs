//! Global keyboard input through a CoreGraphics event tap.
//!
//! The tap is installed in consuming mode when the system allows it, so the
//! switcher's keys never reach the focused application. Without that
//! permission it falls back to listening only.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use objc2_core_foundation::{
    CFMachPort, CFRetained, CFRunLoop, CFRunLoopSource, kCFRunLoopCommonModes,
};
use objc2_core_graphics::{
    CGEvent, CGEventField, CGEventMask, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventTapProxy, CGEventType,
};
use tracing::{debug, info, trace, warn};

use crate::actor::switcher::{Event, Sender};
use crate::sys::hotkey::{InputEvent, should_consume};

struct TapContext {
    events_tx: Sender,
    showing: Arc<AtomicBool>,
    consumes: bool,
    port: Option<NonNull<CFMachPort>>,
}

/// An installed keyboard tap. Input stops when this is dropped.
pub struct EventTap {
    port: CFRetained<CFMachPort>,
    source: CFRetained<CFRunLoopSource>,
    ctx: *mut TapContext,
}

impl EventTap {
    /// Installs the tap on the current thread's run loop.
    ///
    /// `showing` tells the tap whether a session is on screen; navigation
    /// keys are only swallowed then.
    pub fn install(events_tx: Sender, showing: Arc<AtomicBool>) -> Option<EventTap> {
        let tap = Self::create(events_tx.clone(), showing.clone(), true)
            .or_else(|| {
                warn!("could not install a consuming event tap; falling back to listen-only");
                Self::create(events_tx, showing, false)
            });
        if tap.is_none() {
            warn!("could not install a keyboard event tap; is Accessibility access granted?");
        }
        tap
    }

    fn create(events_tx: Sender, showing: Arc<AtomicBool>, consumes: bool) -> Option<EventTap> {
        let mask: CGEventMask =
            (1 << CGEventType::KeyDown.0) | (1 << CGEventType::FlagsChanged.0);
        let options = if consumes { CGEventTapOptions::Default } else { CGEventTapOptions::ListenOnly };
        let ctx = Box::into_raw(Box::new(TapContext {
            events_tx,
            showing,
            consumes,
            port: None,
        }));

        let Some(port) = (unsafe {
            CGEvent::tap_create(
                CGEventTapLocation::SessionEventTap,
                CGEventTapPlacement::HeadInsertEventTap,
                options,
                mask,
                Some(tap_callback),
                ctx.cast(),
            )
        }) else {
            drop(unsafe { Box::from_raw(ctx) });
            return None;
        };
        unsafe { (*ctx).port = Some(NonNull::from(&*port)) };

        let source = CFMachPort::new_run_loop_source(None, Some(&port), 0);
        let (Some(source), Some(run_loop)) = (source, CFRunLoop::current()) else {
            port.invalidate();
            drop(unsafe { Box::from_raw(ctx) });
            return None;
        };
        run_loop.add_source(Some(&source), unsafe { kCFRunLoopCommonModes });
        CGEvent::tap_enable(&port, true);

        info!(consumes, "keyboard event tap installed");
        Some(EventTap { port, source, ctx })
    }
}

impl Drop for EventTap {
    fn drop(&mut self) {
        CGEvent::tap_enable(&self.port, false);
        self.source.invalidate();
        self.port.invalidate();
        drop(unsafe { Box::from_raw(self.ctx) });
        debug!("keyboard event tap removed");
    }
}

unsafe extern "C-unwind" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: CGEventType,
    event: NonNull<CGEvent>,
    user_info: *mut c_void,
) -> *mut CGEvent {
    let ctx = unsafe { &*(user_info as *const TapContext) };

    if event_type == CGEventType::TapDisabledByTimeout
        || event_type == CGEventType::TapDisabledByUserInput
    {
        warn!(?event_type, "event tap was disabled; re-enabling");
        if let Some(port) = ctx.port {
            CGEvent::tap_enable(unsafe { port.as_ref() }, true);
        }
        return event.as_ptr();
    }

    let (keycode, flags) = unsafe {
        let event = event.as_ref();
        (
            CGEvent::integer_value_field(Some(event), CGEventField::KeyboardEventKeycode),
            CGEvent::flags(Some(event)),
        )
    };
    let Some(input) = InputEvent::decode(event_type.0, keycode, flags.0) else {
        return event.as_ptr();
    };

    let consume = ctx.consumes && should_consume(&input, ctx.showing.load(Ordering::Acquire));
    trace!(?input, consume, "key event");
    ctx.events_tx.send(Event::Input(input));

    if consume { std::ptr::null_mut() } else { event.as_ptr() }
}

#[cfg(test)]
mod tests {
    use objc2_core_graphics::CGEventFlags;

    use super::*;
    use crate::sys::hotkey::{EVENT_FLAGS_CHANGED, EVENT_KEY_DOWN, Modifiers};

    #[test]
    fn decoding_agrees_with_core_graphics() {
        assert_eq!(CGEventType::KeyDown.0, EVENT_KEY_DOWN);
        assert_eq!(CGEventType::FlagsChanged.0, EVENT_FLAGS_CHANGED);

        let flags = CGEventFlags::MaskCommand | CGEventFlags::MaskShift;
        let modifiers = Modifiers::from_event_flags(flags.0);
        assert_eq!(modifiers, Modifiers::COMMAND | Modifiers::SHIFT);
        assert_eq!(Modifiers::OPTION.bits(), CGEventFlags::MaskAlternate.0);
        assert_eq!(Modifiers::CONTROL.bits(), CGEventFlags::MaskControl.0);
    }
}
