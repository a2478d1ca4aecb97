//! Drives a single future on the main thread's run loop.
//!
//! The switcher actor, the event tap and AppKit all live on the main thread.
//! Running the actor as a future polled from a run loop source lets it
//! await its channel without a second thread.

use std::cell::{OnceCell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use objc2::MainThreadMarker;
use objc2_app_kit::NSApp;
use objc2_core_foundation::CFRunLoop;
use tracing::error;

use super::run_loop::WakeupHandle;

type Task = Pin<Box<dyn Future<Output = ()>>>;

pub struct Executor;

impl Executor {
    /// Runs `task` to completion on a plain CFRunLoop.
    pub fn run(task: impl Future<Output = ()> + 'static) {
        Self::block_on(Box::pin(task), CFRunLoop::run, Box::new(stop_current_run_loop));
    }

    /// Runs `task` inside `NSApplication::run`, which AppKit needs for
    /// windows and some system events to work.
    pub fn run_main(mtm: MainThreadMarker, task: impl Future<Output = ()> + 'static) {
        Self::block_on(
            Box::pin(task),
            || NSApp(mtm).run(),
            Box::new(move || {
                NSApp(mtm).stop(None);
                stop_current_run_loop();
            }),
        );
    }

    fn block_on(task: Task, run_loop: impl Fn(), stop: Box<dyn Fn()>) {
        let slot = Rc::new(Slot {
            task: RefCell::new(Some(task)),
            waker: OnceCell::new(),
            stop,
        });

        let weak = Rc::downgrade(&slot);
        let Some(wakeup) = WakeupHandle::for_current_thread(0, move || {
            if let Some(slot) = weak.upgrade() {
                slot.poll();
            }
        }) else {
            error!("could not create a run loop source for the executor");
            return;
        };
        let waker = Waker::from(Arc::new(RunLoopWaker(wakeup)));
        waker.wake_by_ref();
        _ = slot.waker.set(waker);

        // Drops the task even if the run loop unwinds.
        struct Clear(Rc<Slot>);
        impl Drop for Clear {
            fn drop(&mut self) { self.0.task.borrow_mut().take(); }
        }
        let clear = Clear(slot.clone());

        // The loop can return early when other code stops it.
        while clear.0.task.borrow().is_some() {
            run_loop();
        }
    }
}

fn stop_current_run_loop() {
    if let Some(run_loop) = CFRunLoop::current() {
        run_loop.stop();
    }
}

struct Slot {
    task: RefCell<Option<Task>>,
    waker: OnceCell<Waker>,
    stop: Box<dyn Fn()>,
}

impl Slot {
    fn poll(&self) {
        let Some(waker) = self.waker.get() else {
            return;
        };
        let mut cx = Context::from_waker(waker);
        let mut task = self.task.borrow_mut();
        let Some(future) = task.as_mut() else {
            return;
        };
        if future.as_mut().poll(&mut cx) == Poll::Ready(()) {
            task.take();
            drop(task);
            (self.stop)();
        }
    }
}

struct RunLoopWaker(WakeupHandle);

impl Wake for RunLoopWaker {
    fn wake(self: Arc<Self>) { self.0.wake(); }

    fn wake_by_ref(self: &Arc<Self>) { self.0.wake(); }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::time::Duration;
    use std::{future, thread};

    use super::*;
    use crate::actor;

    #[derive(Default)]
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    #[test]
    fn runs_tasks_to_completion() {
        Executor::run(future::ready(()));
        Executor::run(YieldOnce::default());

        let steps = Rc::new(Cell::new(0));
        let seen = steps.clone();
        Executor::run(async move {
            seen.set(seen.get() + 1);
            YieldOnce::default().await;
            seen.set(seen.get() + 1);
        });
        assert_eq!(steps.get(), 2);
    }

    #[test]
    fn drops_the_task_when_it_panics() {
        struct Flag(AssertUnwindSafe<Rc<Cell<bool>>>);
        impl Drop for Flag {
            fn drop(&mut self) { self.0.set(true); }
        }

        let dropped = Rc::new(Cell::new(false));
        let flag = Flag(AssertUnwindSafe(dropped.clone()));
        let result = catch_unwind(AssertUnwindSafe(|| {
            Executor::run(async move {
                let _flag = flag;
                YieldOnce::default().await;
                panic!("task failed");
            });
        }));

        assert!(result.is_err());
        assert!(dropped.get());
    }

    #[test]
    fn receives_from_other_threads() {
        let (tx, mut rx) = actor::channel::<u32>();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(25));
            tx.send(1);
            tx.send(2);
        });

        let total = Rc::new(Cell::new(0));
        let sum = total.clone();
        Executor::run(async move {
            while let Some((_span, n)) = rx.recv().await {
                sum.set(sum.get() + n);
                YieldOnce::default().await;
            }
        });
        assert_eq!(total.get(), 3);
    }
}
