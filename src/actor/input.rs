//! Input Actor: Dedicated thread for polling terminal events.
//!
//! Blocking on crossterm's event reader would stall the animation clock, so
//! polling happens here and events reach the session loop over a channel.

use super::messages::{InputEvent, KeyCode, KeyModifiers};
use crossbeam_channel::{Sender, TrySendError};
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Input actor that polls terminal events.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// `poll_timeout` bounds how long the thread waits for an event before
    /// re-checking the shutdown flag.
    pub fn spawn(sender: Sender<InputEvent>, poll_timeout: Duration) -> std::io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("typeout-input".to_string())
            .spawn(move || Self::run_loop(&sender, &flag, poll_timeout))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main input polling loop.
    fn run_loop(sender: &Sender<InputEvent>, shutdown: &AtomicBool, poll_timeout: Duration) {
        while !shutdown.load(Ordering::Relaxed) {
            let event = match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(event) => convert_event(event),
                    Err(e) => Some(InputEvent::Error(e.to_string())),
                },
                Ok(false) => None,
                Err(e) => Some(InputEvent::Error(e.to_string())),
            };

            let Some(event) = event else {
                continue;
            };
            if let InputEvent::Error(message) = &event {
                warn!(%message, "terminal input error");
            }
            if sender.send(event).is_err() {
                debug!("input receiver dropped, stopping");
                return;
            }
        }
        announce_shutdown(sender);
    }
}

/// Tell the session the input thread is stopping, unless the channel is full
/// or closed. Never blocks, so `join` cannot hang on an undrained channel.
fn announce_shutdown(sender: &Sender<InputEvent>) -> bool {
    match sender.try_send(InputEvent::Shutdown) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("input channel full, shutdown notice dropped");
            false
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a crossterm event to an [`InputEvent`].
///
/// Key repeats are kept so a held key keeps typing; releases are dropped.
/// Mouse events are not used by the transcript.
pub fn convert_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return None;
            }
            Some(InputEvent::Key {
                code: convert_key_code(key.code)?,
                modifiers: convert_modifiers(key.modifiers),
            })
        }
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        Event::FocusGained => Some(InputEvent::FocusGained),
        Event::FocusLost => Some(InputEvent::FocusLost),
        Event::Paste(text) => Some(InputEvent::Paste(text)),
        Event::Mouse(_) => None,
    }
}

fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
    Some(match code {
        event::KeyCode::Char(c) => KeyCode::Char(c),
        event::KeyCode::Backspace => KeyCode::Backspace,
        event::KeyCode::Enter => KeyCode::Enter,
        event::KeyCode::Left => KeyCode::Left,
        event::KeyCode::Right => KeyCode::Right,
        event::KeyCode::Home => KeyCode::Home,
        event::KeyCode::End => KeyCode::End,
        event::KeyCode::Delete => KeyCode::Delete,
        event::KeyCode::Esc => KeyCode::Esc,
        _ => return None,
    })
}

fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: mods.contains(event::KeyModifiers::SHIFT),
        control: mods.contains(event::KeyModifiers::CONTROL),
        alt: mods.contains(event::KeyModifiers::ALT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyEventState};

    fn key(code: event::KeyCode, modifiers: event::KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_shutdown_notice_never_blocks() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        assert!(announce_shutdown(&tx));
        assert_eq!(rx.try_recv(), Ok(InputEvent::Shutdown));

        tx.send(InputEvent::FocusLost).unwrap();
        assert!(!announce_shutdown(&tx));
        assert_eq!(rx.len(), 1);

        drop(rx);
        assert!(!announce_shutdown(&tx));
    }

    #[test]
    fn test_convert_shift_arrow() {
        let event = key(event::KeyCode::Left, event::KeyModifiers::SHIFT, KeyEventKind::Press);
        assert_eq!(convert_event(event), Some(InputEvent::shift(KeyCode::Left)));
    }

    #[test]
    fn test_release_is_dropped_repeat_is_kept() {
        let release = key(event::KeyCode::Char('a'), event::KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(convert_event(release), None);

        let repeat = key(event::KeyCode::Char('a'), event::KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(convert_event(repeat), Some(InputEvent::key(KeyCode::Char('a'))));
    }

    #[test]
    fn test_focus_and_unmapped_keys() {
        assert_eq!(convert_event(Event::FocusLost), Some(InputEvent::FocusLost));
        let f5 = key(event::KeyCode::F(5), event::KeyModifiers::NONE, KeyEventKind::Press);
        assert_eq!(convert_event(f5), None);
    }
}
