//! Session state for one Cmd+Tab interaction.
//!
//! A session starts when the shortcut is pressed with at least one window to
//! show, moves the selection while Command is held, and ends either with a
//! selection (Command released, Return) or without one (Escape).

use std::ops::Range;

use tracing::{debug, trace};

use super::pager::Pager;
use super::window::WindowInfo;
use crate::sys::hotkey::Modifiers;

/// What a presenter needs to draw the current state.
#[derive(Debug)]
pub struct SwitcherView<'a, H> {
    pub windows: &'a [WindowInfo<H>],
    pub selected: usize,
    pub visible: Range<usize>,
    pub indicator: Option<String>,
}

impl<'a, H> SwitcherView<'a, H> {
    pub fn selected_window(&self) -> Option<&'a WindowInfo<H>> { self.windows.get(self.selected) }
}

pub struct Switcher<H = ()> {
    windows: Vec<WindowInfo<H>>,
    selected: usize,
    showing: bool,
    command_held: bool,
    pager: Pager,
}

impl<H> Switcher<H> {
    pub fn new(pager: Pager) -> Self {
        Switcher {
            windows: Vec::new(),
            selected: 0,
            showing: false,
            command_held: false,
            pager,
        }
    }

    pub fn is_showing(&self) -> bool { self.showing }

    pub fn windows(&self) -> &[WindowInfo<H>] { &self.windows }

    pub fn selected_index(&self) -> usize { self.selected }

    pub fn selected(&self) -> Option<&WindowInfo<H>> {
        if self.showing { self.windows.get(self.selected) } else { None }
    }

    /// Starts a session over `windows`. Returns whether anything is shown;
    /// with no windows the switcher stays idle.
    pub fn open(&mut self, windows: Vec<WindowInfo<H>>) -> bool {
        if windows.is_empty() {
            debug!("no switchable windows");
            self.close();
            return false;
        }
        debug!(count = windows.len(), "opening switcher");
        self.windows = windows;
        self.selected = 0;
        self.showing = true;
        self.command_held = true;
        self.pager.reset();
        self.pager.follow(self.selected, self.windows.len());
        true
    }

    pub fn select_next(&mut self) {
        if let Some(count) = self.active_count() {
            self.select((self.selected + 1) % count);
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(count) = self.active_count() {
            self.select(if self.selected == 0 { count - 1 } else { self.selected - 1 });
        }
    }

    pub fn page_down(&mut self) {
        if let Some(count) = self.active_count() {
            self.select((self.selected + self.pager.page_size()).min(count - 1));
        }
    }

    pub fn page_up(&mut self) {
        if self.active_count().is_some() {
            self.select(self.selected.saturating_sub(self.pager.page_size()));
        }
    }

    /// Tracks the Command key. Returns true when Command was just released
    /// during a session, which is the signal to commit the selection.
    pub fn modifiers_changed(&mut self, modifiers: Modifiers) -> bool {
        let held = modifiers.command();
        let released = self.showing && self.command_held && !held;
        self.command_held = held;
        released
    }

    /// Ends the session, handing back the selected window.
    pub fn take_selection(&mut self) -> Option<WindowInfo<H>> {
        if !self.showing {
            return None;
        }
        let selected = self.selected;
        let windows = std::mem::take(&mut self.windows);
        self.close();
        windows.into_iter().nth(selected)
    }

    pub fn close(&mut self) {
        self.showing = false;
        self.command_held = false;
        self.selected = 0;
        self.windows.clear();
        self.pager.reset();
    }

    pub fn view(&self) -> SwitcherView<'_, H> {
        let count = self.windows.len();
        SwitcherView {
            windows: &self.windows,
            selected: self.selected,
            visible: self.pager.visible(count),
            indicator: self.pager.indicator(count),
        }
    }

    fn active_count(&self) -> Option<usize> {
        if self.showing && !self.windows.is_empty() { Some(self.windows.len()) } else { None }
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.pager.follow(index, self.windows.len());
        trace!(selected = index, offset = self.pager.offset(), "selection moved");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::window::tests::window;

    fn windows(n: u32) -> Vec<WindowInfo> {
        (1..=n).map(|i| window(i, "App", &format!("w{i}"))).collect()
    }

    fn open(n: u32, columns: usize, rows: usize) -> Switcher {
        let mut switcher = Switcher::new(Pager::new(columns, rows));
        assert!(switcher.open(windows(n)));
        switcher
    }

    #[test]
    fn empty_list_stays_idle() {
        let mut switcher: Switcher = Switcher::new(Pager::new(8, 4));
        assert!(!switcher.open(Vec::new()));
        assert!(!switcher.is_showing());
        assert!(switcher.selected().is_none());
        assert!(!switcher.modifiers_changed(Modifiers::empty()));
    }

    #[test]
    fn opens_on_the_first_window() {
        let switcher = open(3, 8, 4);
        assert!(switcher.is_showing());
        assert_eq!(switcher.selected_index(), 0);
        assert_eq!(switcher.selected().unwrap().title, "w1");
    }

    #[test]
    fn next_and_previous_wrap() {
        let mut switcher = open(3, 8, 4);
        switcher.select_previous();
        assert_eq!(switcher.selected_index(), 2);
        switcher.select_next();
        assert_eq!(switcher.selected_index(), 0);
        switcher.select_next();
        switcher.select_next();
        assert_eq!(switcher.selected_index(), 2);
    }

    #[test]
    fn paging_jumps_and_clamps() {
        let mut switcher = open(10, 2, 2);
        switcher.page_down();
        assert_eq!(switcher.selected_index(), 4);
        switcher.page_down();
        switcher.page_down();
        assert_eq!(switcher.selected_index(), 9);
        switcher.page_up();
        assert_eq!(switcher.selected_index(), 5);
        switcher.page_up();
        switcher.page_up();
        assert_eq!(switcher.selected_index(), 0);
    }

    #[test]
    fn navigation_is_ignored_while_idle() {
        let mut switcher: Switcher = Switcher::new(Pager::new(8, 4));
        switcher.select_next();
        switcher.page_down();
        assert_eq!(switcher.selected_index(), 0);
        assert!(switcher.take_selection().is_none());
    }

    #[test]
    fn releasing_command_commits_once() {
        let mut switcher = open(3, 8, 4);
        assert!(!switcher.modifiers_changed(Modifiers::COMMAND | Modifiers::SHIFT));
        assert!(switcher.modifiers_changed(Modifiers::empty()));
        assert!(!switcher.modifiers_changed(Modifiers::empty()));
    }

    #[test]
    fn take_selection_closes_the_session() {
        let mut switcher = open(3, 8, 4);
        switcher.select_next();
        let taken = switcher.take_selection().unwrap();
        assert_eq!(taken.title, "w2");
        assert!(!switcher.is_showing());
        assert!(switcher.windows().is_empty());
        assert!(switcher.take_selection().is_none());
    }

    #[test]
    fn close_discards_the_selection() {
        let mut switcher = open(3, 8, 4);
        switcher.select_next();
        switcher.close();
        assert!(switcher.selected().is_none());
        assert!(!switcher.modifiers_changed(Modifiers::empty()));
    }

    #[test]
    fn view_follows_the_selection() {
        let mut switcher = open(10, 2, 2);
        let view = switcher.view();
        assert_eq!(view.visible, 0..4);
        assert_eq!(view.indicator.as_deref(), Some("Page 1 of 3 • Use ← → to scroll"));

        switcher.select_previous();
        let view = switcher.view();
        assert_eq!(view.selected, 9);
        assert_eq!(view.visible, 6..10);
        assert_eq!(view.selected_window().unwrap().title, "w10");
    }

    #[test]
    fn reopening_starts_over() {
        let mut switcher = open(10, 2, 2);
        switcher.select_previous();
        switcher.close();
        assert!(switcher.open(windows(10)));
        assert_eq!(switcher.view().visible, 0..4);
        assert_eq!(switcher.selected_index(), 0);
    }
}
