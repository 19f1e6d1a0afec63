//! Interactive terminal client
//!
//! Full-screen editor over a [`ClientController`]: the input area takes
//! keystrokes and pastes, Ctrl/Cmd+Enter submits in the background, and the
//! screen redraws on every event so the spinner, copy feedback and notices
//! stay current.

pub mod commands;
pub mod event;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::client::{is_submit_chord, ClientController, RequestStatus, SubmitOutcome};

use commands::{parse_key, ShellCommand};
use event::{EventHandler, ShellEvent};
use renderer::{TerminalRenderer, View};

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(80);

/// Raw mode and alternate screen, restored on drop
struct TerminalGuard {
    enhanced_keys: bool,
}

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, EnableBracketedPaste)?;

        // Needed for terminals to report modifiers on Enter
        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
        }

        Ok(Self { enhanced_keys })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.enhanced_keys {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, DisableBracketedPaste, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub struct InteractiveShell {
    controller: Arc<ClientController>,
    renderer: TerminalRenderer,
    view: View,
}

impl InteractiveShell {
    pub fn new(controller: ClientController) -> Self {
        Self {
            controller: Arc::new(controller),
            renderer: TerminalRenderer::new(),
            view: View::default(),
        }
    }

    /// Run until the user quits
    pub async fn run(&mut self) -> Result<()> {
        let mut out = io::stdout();
        let _guard = TerminalGuard::enter(&mut out)?;
        let mut events = EventHandler::new(TICK_RATE);

        self.redraw(&mut out)?;

        while let Some(event) = events.next().await {
            match event {
                ShellEvent::Key(key) if key.kind != KeyEventKind::Release => {
                    if let Some(command) = parse_key(&key) {
                        if !self.apply(command, &events) {
                            break;
                        }
                    } else if is_submit_chord(&key) {
                        self.spawn_submit(&events);
                    } else {
                        self.controller.handle_key(key).await;
                    }
                }
                ShellEvent::Key(_) => continue,
                ShellEvent::Paste(text) => self.controller.append_input(&text),
                ShellEvent::Tick => self.view.tick = self.view.tick.wrapping_add(1),
                ShellEvent::Resize | ShellEvent::Finished(_) => {}
            }

            if let Some(notice) = self.controller.take_notices().pop() {
                self.view.notice = Some(notice);
            }
            self.redraw(&mut out)?;
        }

        Ok(())
    }

    /// Returns false when the shell should exit
    fn apply(&mut self, command: ShellCommand, events: &EventHandler) -> bool {
        match command {
            ShellCommand::Optimize => self.spawn_submit(events),
            ShellCommand::Copy => {
                self.controller.copy_output();
            }
            ShellCommand::ToggleAutoClear => {
                self.controller.toggle_auto_clear();
            }
            ShellCommand::ClearInput => self.controller.clear_input(),
            ShellCommand::Help => self.view.show_help = !self.view.show_help,
            ShellCommand::Quit => return false,
        }
        true
    }

    // Submits run off the event loop so keys keep flowing while Pending;
    // the controller turns overlapping submits into no-ops.
    fn spawn_submit(&mut self, events: &EventHandler) {
        self.clear_notice_for_new_cycle();
        let controller = self.controller.clone();
        let tx = events.sender();
        tokio::spawn(async move {
            let outcome: SubmitOutcome = controller.submit().await;
            let _ = tx.send(ShellEvent::Finished(outcome));
        });
    }

    // A submit while Pending comes back Busy, so the current notice still applies
    fn clear_notice_for_new_cycle(&mut self) {
        if self.controller.status() != RequestStatus::Pending {
            self.view.notice = None;
        }
    }

    fn redraw(&self, out: &mut Stdout) -> Result<()> {
        let session = self.controller.snapshot();
        self.renderer.draw(out, &session, &self.view)?;
        Ok(())
    }
}
