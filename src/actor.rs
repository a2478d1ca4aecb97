//! Actors own a piece of state and react to events sent over a channel.
//!
//! Every event travels with the [`Span`] that was current when it was sent,
//! so log lines emitted while handling it nest under the sender's context.

use tokio::sync::mpsc;
use tracing::Span;

#[cfg(target_os = "macos")]
pub mod notification_center;
pub mod switcher;

pub type Receiver<Event> = mpsc::UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

#[derive(Debug)]
pub struct Sender<Event>(mpsc::UnboundedSender<(Span, Event)>);

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<Event> Sender<Event> {
    /// Sends an event, dropping it if the actor has already exited.
    pub fn send(&self, event: Event) { _ = self.try_send(event); }

    pub fn try_send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.0
            .send((Span::current(), event))
            .map_err(|mpsc::error::SendError((_, event))| mpsc::error::SendError(event))
    }

    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_current_span() {
        let (tx, mut rx) = channel();
        let span = tracing::info_span!("sender");
        span.in_scope(|| tx.send(7));
        let (received_span, event) = rx.try_recv().unwrap();
        assert_eq!(event, 7);
        assert_eq!(received_span.id(), span.id());
    }

    #[test]
    fn try_send_returns_the_event_when_closed() {
        let (tx, rx) = channel::<&str>();
        drop(rx);
        assert!(tx.is_closed());
        let err = tx.try_send("lost").unwrap_err();
        assert_eq!(err.0, "lost");
        tx.send("ignored");
    }
}
