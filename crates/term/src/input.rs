//! The dedicated input-reader thread: blocks on `crossterm::event::read`
//! and forwards decoded `EngineEvent`s to the main loop over a bounded
//! channel. This realizes spec §5's "self-pipe/poll discipline" for
//! terminal resize delivery without a hand-rolled signal handler —
//! `crossterm` already coalesces the platform's resize notification into
//! `Event::Resize`.

use crossbeam_channel::Receiver;
use crossterm::event::{self, Event, KeyEventKind};
use editor_state::EngineEvent;
use util::EventChannel;

use crate::keys;

/// Spawns the reader thread and returns the receiving end of its channel.
/// The thread runs until a read fails (terminal closed) or the receiver is
/// dropped, at which point sends start failing and the thread exits.
#[must_use]
pub fn spawn() -> Receiver<EngineEvent> {
    let channel = EventChannel::<EngineEvent>::bounded(64);
    let receiver = channel.receiver();
    let sender = channel.sender();

    EventChannel::spawn_producer(sender, |tx| loop {
        let event = match event::read() {
            Ok(ev) => ev,
            Err(_) => break,
        };

        let engine_event = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => keys::decode(key).map(EngineEvent::Key),
            Event::Resize(cols, lines) => Some(EngineEvent::Resize(cols, lines)),
            _ => None,
        };

        if let Some(ev) = engine_event {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    receiver
}
