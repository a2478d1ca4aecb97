//! The switcher actor turns keyboard input into switcher sessions.
//!
//! It owns the session state and talks to the platform through two seams:
//! a [`WindowSource`] that lists and activates windows, and a [`Presenter`]
//! that draws the session (console lines or the overlay panel).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::common::config::SwitcherSettings;
use crate::model::pager::Pager;
use crate::model::switcher::{Switcher, SwitcherView};
use crate::model::window::{Activation, ActivationError, WindowInfo};
use crate::sys::hotkey::{InputEvent, KeyCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    Shutdown,
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Next,
    Previous,
    PageUp,
    PageDown,
    Commit,
    Cancel,
}

/// Maps a key press to what it means in the current state. Modifier changes
/// are not commands; Command release is tracked by the session itself.
pub fn command_for(event: &InputEvent, showing: bool) -> Option<Command> {
    let InputEvent::KeyDown { key, modifiers } = *event else {
        return None;
    };
    if !showing {
        return event.is_command_tab().then_some(Command::Open);
    }
    match key {
        KeyCode::TAB if modifiers.command() && modifiers.shift() => Some(Command::Previous),
        KeyCode::TAB if modifiers.command() => Some(Command::Next),
        KeyCode::LEFT_ARROW => Some(Command::Previous),
        KeyCode::RIGHT_ARROW => Some(Command::Next),
        KeyCode::DOWN_ARROW => Some(Command::PageDown),
        KeyCode::UP_ARROW => Some(Command::PageUp),
        KeyCode::ESCAPE => Some(Command::Cancel),
        KeyCode::RETURN | KeyCode::KEYPAD_ENTER => Some(Command::Commit),
        _ => None,
    }
}

/// Where windows come from and how one is brought to the front.
pub trait WindowSource {
    type Handle;

    /// The switchable windows, in switching order.
    fn windows(&mut self) -> Vec<WindowInfo<Self::Handle>>;

    fn activate(
        &mut self,
        window: &WindowInfo<Self::Handle>,
    ) -> Result<Activation, ActivationError>;
}

pub trait Presenter<H> {
    /// Shows the session, or updates it after the selection moved.
    fn present(&mut self, view: &SwitcherView<'_, H>);

    fn dismiss(&mut self);
}

pub struct SwitcherActor<S: WindowSource, P> {
    source: S,
    presenter: P,
    switcher: Switcher<S::Handle>,
    showing: Arc<AtomicBool>,
    rx: Receiver,
}

impl<S, P> SwitcherActor<S, P>
where
    S: WindowSource,
    P: Presenter<S::Handle>,
{
    pub fn new(source: S, presenter: P, settings: &SwitcherSettings, rx: Receiver) -> Self {
        SwitcherActor {
            source,
            presenter,
            switcher: Switcher::new(Pager::new(settings.columns, settings.rows)),
            showing: Arc::new(AtomicBool::new(false)),
            rx,
        }
    }

    /// Mirrors whether a session is on screen, for the event tap to decide
    /// which keys to swallow.
    pub fn showing_flag(&self) -> Arc<AtomicBool> { self.showing.clone() }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.rx.recv().await {
            let _guard = span.enter();
            if !self.handle_event(event) {
                break;
            }
        }
        if self.switcher.is_showing() {
            self.switcher.close();
            self.presenter.dismiss();
        }
        self.showing.store(false, Ordering::Release);
        debug!("switcher actor stopped");
    }

    /// Returns false once the actor should stop.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: Event) -> bool {
        let keep_running = match event {
            Event::Input(InputEvent::FlagsChanged(modifiers)) => {
                if self.switcher.modifiers_changed(modifiers) {
                    self.commit();
                }
                true
            }
            Event::Input(input) => {
                if let Some(command) = command_for(&input, self.switcher.is_showing()) {
                    self.handle_command(command);
                }
                true
            }
            Event::Shutdown => false,
        };
        self.showing.store(self.switcher.is_showing(), Ordering::Release);
        keep_running
    }

    fn handle_command(&mut self, command: Command) {
        trace!(?command);
        match command {
            Command::Open => {
                let windows = self.source.windows();
                if !self.switcher.open(windows) {
                    info!("no windows to switch to");
                    return;
                }
            }
            Command::Next => self.switcher.select_next(),
            Command::Previous => self.switcher.select_previous(),
            Command::PageDown => self.switcher.page_down(),
            Command::PageUp => self.switcher.page_up(),
            Command::Commit => return self.commit(),
            Command::Cancel => {
                self.switcher.close();
                self.presenter.dismiss();
                return;
            }
        }
        self.presenter.present(&self.switcher.view());
    }

    fn commit(&mut self) {
        let Some(window) = self.switcher.take_selection() else {
            return;
        };
        match self.source.activate(&window) {
            Ok(activation) => info!(
                window = %window.display_title(),
                app_activated = activation.app_activated,
                window_raised = ?activation.window_raised,
                "activated window"
            ),
            Err(err) => warn!(window = %window.display_title(), "could not activate: {err}"),
        }
        self.presenter.dismiss();
    }
}
