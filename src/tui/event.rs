//! Terminal event polling for the interactive shell

use crate::client::SubmitOutcome;
use crossterm::event::{self, Event, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ShellEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    /// Redraw tick for the spinner
    Tick,
    /// A submit finished in the background
    Finished(SubmitOutcome),
}

/// Polls the terminal on a dedicated thread and forwards events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<ShellEvent>,
    tx: mpsc::UnboundedSender<ShellEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        std::thread::spawn(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => ShellEvent::Key(key),
                    Ok(Event::Paste(text)) => ShellEvent::Paste(text),
                    Ok(Event::Resize(_, _)) => ShellEvent::Resize,
                    _ => continue,
                }
            } else {
                ShellEvent::Tick
            };

            if event_tx.send(event).is_err() {
                break;
            }
        });

        Self { rx, tx }
    }

    /// Sender for events produced outside the terminal
    pub fn sender(&self) -> mpsc::UnboundedSender<ShellEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<ShellEvent> {
        self.rx.recv().await
    }
}
