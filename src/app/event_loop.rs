use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::dialogs::Preferences;
use crate::options::OptionSchema;
use crate::spawn::ProcessSpawner;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure. Document errors are shown in the window.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - mdview requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = self.initial_model((size.width, size.height));
        if !self.files.is_empty() {
            model.open_files(&self.files);
        }

        let result = self.event_loop(&mut terminal, &mut model);

        // Restore terminal
        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// The model before any file is opened.
    pub(super) fn initial_model(&self, size: (u16, u16)) -> Model {
        let schema = Arc::new(OptionSchema::markdown());
        let preferences = Preferences::load(schema, self.settings_path.clone());
        tracing::debug!(persistent = preferences.is_persistent(), "preferences loaded");
        Model::new(size, preferences, Box::new(ProcessSpawner::from_env()))
    }

    /// Apply `msg` to the model, then run its side effects.
    pub(super) fn dispatch(&self, model: &mut Model, msg: Message) {
        tracing::trace!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, &side_msg);
    }

    fn event_loop(&self, terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut shown_title = String::new();
        let mut needs_render = true;

        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        set_mouse_motion_tracking(true)?;

        loop {
            if model.title != shown_title {
                execute!(stdout(), SetTitle(&model.title))?;
                shown_title.clone_from(&model.title);
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::trace!(width, height, "resize applied");
                self.dispatch(model, Message::Resize(width, height));
                needs_render = true;
            }

            if let Some(event) = model.poll_watch() {
                self.dispatch(model, Message::FileEvent(event));
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() || model.is_watching() {
                50
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    self.handle_event(event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    self.dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        self.handle_event(event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        self.dispatch(model, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| self.view(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }

        let _ = set_mouse_motion_tracking(false);
        Ok(())
    }
}

fn set_mouse_motion_tracking(enable: bool) -> std::io::Result<()> {
    // Request any-event mouse motion reporting (1003) with SGR encoding (1006).
    // Hovering links needs motion events without a pressed button.
    let mut out = stdout();
    if enable {
        out.write_all(b"\x1b[?1003h\x1b[?1006h")?;
    } else {
        out.write_all(b"\x1b[?1003l\x1b[?1006l")?;
    }
    out.flush()
}
