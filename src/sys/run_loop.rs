//! Manual CFRunLoop sources for waking a run loop from any thread.

use std::ffi::c_void;
use std::rc::Rc;

use objc2_core_foundation::{
    CFRetained, CFRunLoop, CFRunLoopSource, CFRunLoopSourceContext, kCFRunLoopCommonModes,
};

/// Signals a handler on the run loop that created it.
///
/// Waking is coalesced: several [`wake`](WakeupHandle::wake) calls before the
/// run loop gets around to the source run the handler once.
#[derive(Clone)]
pub struct WakeupHandle {
    source: CFRetained<CFRunLoopSource>,
    run_loop: CFRetained<CFRunLoop>,
}

// SAFETY: signalling a source and waking a run loop are thread-safe
// CoreFoundation operations, and the handle exposes nothing else. The
// handler itself only ever runs on the owning run loop's thread.
unsafe impl Send for WakeupHandle {}
unsafe impl Sync for WakeupHandle {}

type Handler = Rc<dyn Fn()>;

// The context `info` is a `*const Handler` produced by `Box::into_raw`. CF
// retains and releases it as the source is copied and destroyed; the boxed
// `Rc` count tracks those references.
unsafe extern "C-unwind" fn perform(info: *mut c_void) {
    let handler = unsafe { &*(info as *const Handler) };
    handler();
}

unsafe extern "C-unwind" fn retain(info: *const c_void) -> *const c_void {
    let handler = unsafe { &*(info as *const Handler) };
    Box::into_raw(Box::new(handler.clone())) as *const c_void
}

unsafe extern "C-unwind" fn release(info: *const c_void) {
    drop(unsafe { Box::from_raw(info as *mut Handler) });
}

impl WakeupHandle {
    /// Adds a source running `handler` to the current thread's run loop, in
    /// all common modes. `order` is the source priority; 0 is normal.
    pub fn for_current_thread(order: isize, handler: impl Fn() + 'static) -> Option<WakeupHandle> {
        let handler: Handler = Rc::new(handler);
        let info = Box::into_raw(Box::new(handler));

        let mut context = CFRunLoopSourceContext {
            version: 0,
            info: info.cast(),
            retain: Some(retain),
            release: Some(release),
            copyDescription: None,
            equal: None,
            hash: None,
            schedule: None,
            cancel: None,
            perform: Some(perform),
        };
        let source = unsafe { CFRunLoopSource::new(None, order, &mut context) };
        // CF took its own reference through `retain`.
        drop(unsafe { Box::from_raw(info) });

        let source = source?;
        let run_loop = CFRunLoop::current()?;
        run_loop.add_source(Some(&*source), unsafe { kCFRunLoopCommonModes });
        Some(WakeupHandle { source, run_loop })
    }

    pub fn wake(&self) {
        self.source.signal();
        self.run_loop.wake_up();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn wake_runs_the_handler_on_the_run_loop() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let handle = WakeupHandle::for_current_thread(0, move || {
            seen.set(seen.get() + 1);
            if let Some(rl) = CFRunLoop::current() {
                rl.stop();
            }
        })
        .unwrap();

        let other = handle.clone();
        std::thread::spawn(move || {
            other.wake();
            other.wake();
        })
        .join()
        .unwrap();

        CFRunLoop::run();
        assert_eq!(calls.get(), 1);
    }
}
