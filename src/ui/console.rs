use std::io::{self, Write};

use tracing::warn;

use crate::actor::switcher::Presenter;
use crate::model::switcher::SwitcherView;

/// Prints one line per selection change, e.g. `> (2/5) Safari - Apple`.
pub struct ConsolePresenter<W = io::Stdout> {
    out: W,
}

impl ConsolePresenter {
    pub fn stdout() -> Self { ConsolePresenter { out: io::stdout() } }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self { ConsolePresenter { out } }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write, H> Presenter<H> for ConsolePresenter<W> {
    fn present(&mut self, view: &SwitcherView<'_, H>) {
        let Some(window) = view.selected_window() else {
            return;
        };
        let line = format!(
            "> ({}/{}) {}",
            view.selected + 1,
            view.windows.len(),
            window.display_title()
        );
        if let Err(err) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("could not write to console: {err}");
        }
    }

    fn dismiss(&mut self) {}
}
