use std::{io, thread};

use nix::sys::signal::{SigSet, Signal};
use tracing::{error, info};

use super::skylight::set_native_switcher_enabled;
use crate::sys::hotkey::SymbolicHotKey;

/// Makes SIGINT and SIGTERM restore the native switcher before exiting.
///
/// The signals are blocked on the calling thread and picked up by a
/// dedicated thread with `sigwait`, so the restore runs outside signal
/// context. Call this before spawning other threads; they inherit the mask.
pub fn restore_hotkeys_on_termination(hotkeys: Vec<SymbolicHotKey>) -> io::Result<()> {
    let mut signals = SigSet::empty();
    signals.add(Signal::SIGINT);
    signals.add(Signal::SIGTERM);
    signals.thread_block().map_err(io::Error::from)?;

    thread::Builder::new().name("signals".into()).spawn(move || match signals.wait() {
        Ok(signal) => {
            info!(?signal, "terminating");
            set_native_switcher_enabled(true, &hotkeys);
            std::process::exit(0);
        }
        Err(err) => error!("sigwait failed: {err}"),
    })?;
    Ok(())
}
