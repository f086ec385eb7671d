//! Session: the cooperative host loop.
//!
//! [`Transcript`] holds everything that animates (the output chain and the
//! prompt) and knows nothing about terminals, so it can be driven with a fake
//! clock. [`Session`] owns the terminal and the input actor and runs a
//! transcript in real time:
//!
//! ```text
//!            InputEvent                 advance(now)
//! Input ───────────────▶ Session loop ──────────────▶ Transcript
//! Thread                 │  ▲                         │
//!                        │  └── wait until next ──────┘
//!                        ▼      deadline or input
//!                   OutputBuffer ──▶ stdout
//! ```

use crate::actor::{InputActor, InputEvent, KeyCode};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::output::OutputChain;
use crate::prompt::{Prompt, PromptAction};
use crate::render::{output_lines, prompt_line, Line, OutputBuffer, Palette};
use crate::script::{OutputBlock, Script};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Receives submitted command lines.
///
/// The transcript does not interpret commands; whatever blocks the handler
/// returns are appended to the output chain.
pub trait CommandHandler {
    /// Handle one submitted line.
    fn on_command(&mut self, command: &str) -> Vec<OutputBlock>;
}

impl<F> CommandHandler for F
where
    F: FnMut(&str) -> Vec<OutputBlock>,
{
    fn on_command(&mut self, command: &str) -> Vec<OutputBlock> {
        self(command)
    }
}

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Nothing visible changed.
    Idle,
    /// Repaint.
    Redraw,
    /// Leave the loop.
    Quit,
}

/// Output chain plus prompt, advanced on a virtual clock.
#[derive(Debug)]
pub struct Transcript {
    chain: OutputChain,
    prompt: Prompt,
    label: String,
    palette: Palette,
}

impl Transcript {
    /// Create a transcript and start playing `script` at `now`.
    pub fn new(script: &Script, config: &SessionConfig, now: Duration) -> Self {
        let mut chain = OutputChain::new(&script.blocks);
        chain.start(now);
        Self {
            chain,
            prompt: Prompt::new(config.blink_interval, now),
            label: config.prompt_label.clone(),
            palette: config.palette.clone(),
        }
    }

    /// The output chain.
    pub const fn chain(&self) -> &OutputChain {
        &self.chain
    }

    /// The prompt.
    pub const fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Process every timer due at `now`. Returns `true` if anything may have changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        let due = self.next_deadline().is_some_and(|deadline| deadline <= now);
        self.chain.advance(now);
        self.prompt.advance(now);
        due
    }

    /// Earliest pending timer across the chain and the prompt.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.chain.next_deadline(), self.prompt.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feed an input event at `now`.
    pub fn handle_input<H: CommandHandler>(
        &mut self,
        event: &InputEvent,
        now: Duration,
        handler: &mut H,
    ) -> Flow {
        match event {
            InputEvent::Key { code: KeyCode::Esc, .. } | InputEvent::Shutdown => return Flow::Quit,
            InputEvent::Key {
                code: KeyCode::Char('c'),
                modifiers,
            } if modifiers.control => return Flow::Quit,
            InputEvent::Resize { .. } => return Flow::Redraw,
            _ => {}
        }

        match self.prompt.handle_input(event, now) {
            PromptAction::Ignored => Flow::Idle,
            PromptAction::Changed => Flow::Redraw,
            PromptAction::Submitted(command) => {
                let blocks = handler.on_command(&command);
                debug!(%command, blocks = blocks.len(), "command handled");
                self.chain.extend(&blocks, now);
                Flow::Redraw
            }
        }
    }

    /// Lay the transcript out on a `width` x `height` screen.
    ///
    /// The newest output rows that fit are shown from the top and the
    /// prompt takes the last row. Older blocks that would scroll off are
    /// never laid out. Always returns `height` rows.
    pub fn render(&self, width: u16, height: u16) -> Vec<Line> {
        let width = usize::from(width);
        let height = usize::from(height);
        if height == 0 {
            return Vec::new();
        }

        // Newest first, stopping once the screen is full.
        let room = height - 1;
        let mut rows: Vec<Line> = Vec::with_capacity(height);
        for frame in self.chain.frames().rev() {
            if rows.len() >= room {
                break;
            }
            rows.extend(output_lines(&frame, &self.palette, width).into_iter().rev());
        }
        rows.truncate(room);
        rows.reverse();
        rows.resize(room, Line::new());

        rows.push(prompt_line(
            &self.label,
            &self.prompt.segments(),
            self.prompt.caret_mode(),
            &self.palette,
            width,
        ));
        rows
    }

    /// Stop every timer and listener.
    pub fn teardown(&mut self) {
        self.chain.teardown();
        self.prompt.teardown();
    }
}

/// A live terminal running a [`Transcript`].
pub struct Session {
    /// Configuration.
    config: SessionConfig,
    /// Input event receiver.
    input_rx: Receiver<InputEvent>,
    /// Input actor handle.
    input_actor: Option<InputActor>,
    /// Animated state.
    transcript: Transcript,
    /// Origin of the virtual clock.
    origin: Instant,
    /// Terminal width.
    width: u16,
    /// Terminal height.
    height: u16,
    /// Frame output.
    output: OutputBuffer,
    stdout: Stdout,
    /// Whether the session is running.
    running: bool,
}

impl Session {
    /// Create a session with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails (raw mode, alternate screen, etc.).
    pub fn new(script: &Script) -> Result<Self> {
        Self::with_config(script, SessionConfig::default())
    }

    /// Create a session with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn with_config(script: &Script, config: SessionConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if config.alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, EnableFocusChange, EnableBracketedPaste, cursor::Hide)?;

        let (input_tx, input_rx) = bounded::<InputEvent>(64);
        let input_actor = InputActor::spawn(input_tx, config.input_poll_timeout)?;

        let origin = Instant::now();
        let transcript = Transcript::new(script, &config, Duration::ZERO);
        info!(width, height, blocks = transcript.chain().plan_len(), "session started");

        Ok(Self {
            config,
            input_rx,
            input_actor: Some(input_actor),
            transcript,
            origin,
            width,
            height,
            output: OutputBuffer::new(),
            stdout,
            running: true,
        })
    }

    /// Virtual time since the session started.
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// The running transcript.
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Check if the session is still running.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the session loop.
    pub const fn stop(&mut self) {
        self.running = false;
    }

    /// Run until Esc, Ctrl-C, or the input thread shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails or the input
    /// thread disconnects.
    pub fn run<H: CommandHandler>(&mut self, handler: &mut H) -> Result<()> {
        self.paint()?;

        while self.running {
            let timeout = self.transcript.next_deadline().map_or(self.config.idle_wait, |deadline| {
                deadline.saturating_sub(self.now()).min(self.config.idle_wait)
            });

            let flow = match self.input_rx.recv_timeout(timeout) {
                Ok(event) => self.handle_event(&event, handler)?,
                Err(RecvTimeoutError::Timeout) => Flow::Idle,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Terminal("input channel disconnected".to_string()));
                }
            };

            let ticked = self.transcript.advance(self.now());
            match flow {
                Flow::Quit => self.stop(),
                Flow::Redraw => self.paint()?,
                Flow::Idle if ticked => self.paint()?,
                Flow::Idle => {}
            }
        }

        debug!("session loop finished");
        Ok(())
    }

    fn handle_event<H: CommandHandler>(&mut self, event: &InputEvent, handler: &mut H) -> Result<Flow> {
        match event {
            InputEvent::Resize { width, height } => {
                self.width = *width;
                self.height = *height;
            }
            InputEvent::Error(message) => return Err(Error::Terminal(message.clone())),
            _ => {}
        }
        let now = self.now();
        Ok(self.transcript.handle_input(event, now, handler))
    }

    fn paint(&mut self) -> Result<()> {
        let rows = self.transcript.render(self.width, self.height);
        self.output.clear();
        self.output.paint_rows(0, &rows);
        self.output.flush_to(&mut self.stdout)?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.transcript.teardown();
        // Disconnect first so a blocked send in the input thread fails.
        drop(std::mem::replace(&mut self.input_rx, crossbeam_channel::never()));
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }

        // Restore terminal state
        let _ = execute!(
            self.stdout,
            cursor::Show,
            DisableBracketedPaste,
            DisableFocusChange
        );
        if self.config.alternate_screen {
            let _ = execute!(self.stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TYPING_GLYPH;

    const fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn transcript(blocks: Vec<OutputBlock>) -> Transcript {
        let config = SessionConfig {
            blink_interval: Duration::ZERO,
            ..SessionConfig::default()
        };
        Transcript::new(&Script::new(blocks), &config, Duration::ZERO)
    }

    fn no_commands(_: &str) -> Vec<OutputBlock> {
        Vec::new()
    }

    #[test]
    fn test_render_places_prompt_last() {
        let mut transcript = transcript(vec![OutputBlock::text("hello").reveal_budget(500)]);
        transcript.advance(ms(200));

        let rows = transcript.render(40, 5);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].text(), format!("  he{TYPING_GLYPH}"));
        assert_eq!(rows[4].text(), "$  ");
    }

    #[test]
    fn test_render_keeps_newest_rows() {
        let blocks = (0..10).map(|i| OutputBlock::text(format!("line {i}")).reveal_budget(0)).collect();
        let mut transcript = transcript(blocks);
        transcript.advance(ms(1));

        let rows = transcript.render(40, 4);
        assert_eq!(rows[0].text(), "▎ line 7");
        assert_eq!(rows[2].text(), "▎ line 9");
    }

    #[test]
    fn test_render_cuts_oldest_block_mid_way() {
        let blocks = vec![
            OutputBlock::text("a\nb").reveal_budget(0),
            OutputBlock::text("c\nd").reveal_budget(0),
        ];
        let transcript = transcript(blocks);

        let texts: Vec<_> = transcript.render(20, 4).iter().map(Line::text).collect();
        assert_eq!(texts, ["▎ b", "▎ c", "▎ d", "$  "]);
    }

    #[test]
    fn test_render_keeps_caret_visible_on_long_command() {
        let mut transcript = transcript(Vec::new());
        let mut handler = no_commands;
        for _ in 0..60 {
            transcript.handle_input(&InputEvent::key(KeyCode::Char('x')), ms(10), &mut handler);
        }

        let rows = transcript.render(40, 3);
        let prompt = &rows[2];
        assert_eq!(prompt.width(), 40);
        assert!(prompt.text().starts_with("$ x"));
        let accent = SessionConfig::default().palette.accent;
        assert!(prompt.spans.iter().any(|span| span.style.bg == Some(accent)));

        // Moving the caret home scrolls back to the start of the command.
        transcript.handle_input(&InputEvent::key(KeyCode::Home), ms(20), &mut handler);
        let rows = transcript.render(40, 3);
        assert_eq!(rows[2].spans[1].style.bg, Some(accent));
    }

    #[test]
    fn test_advance_reports_due_timers() {
        let mut transcript = transcript(vec![OutputBlock::text("ab").reveal_budget(100)]);
        assert_eq!(transcript.next_deadline(), Some(ms(50)));
        assert!(!transcript.advance(ms(10)));
        assert!(transcript.advance(ms(50)));
    }

    #[test]
    fn test_submitted_command_extends_chain() {
        let mut transcript = transcript(vec![OutputBlock::text("hi").reveal_budget(0)]);
        transcript.advance(ms(1));

        let mut seen = Vec::new();
        let mut handler = |command: &str| {
            seen.push(command.to_string());
            vec![OutputBlock::text(format!("echo {command}")).reveal_budget(0)]
        };

        for c in "ls".chars() {
            transcript.handle_input(&InputEvent::key(KeyCode::Char(c)), ms(10), &mut handler);
        }
        let flow = transcript.handle_input(&InputEvent::key(KeyCode::Enter), ms(20), &mut handler);
        assert_eq!(flow, Flow::Redraw);
        assert_eq!(seen, ["ls"]);

        transcript.advance(ms(20));
        let texts: Vec<_> = transcript.chain().frames().map(|frame| frame.revealed).collect();
        assert_eq!(texts, ["hi", "echo ls"]);
    }

    #[test]
    fn test_quit_keys() {
        let mut transcript = transcript(Vec::new());
        let mut handler = no_commands;
        assert_eq!(
            transcript.handle_input(&InputEvent::key(KeyCode::Esc), ms(0), &mut handler),
            Flow::Quit
        );
        let ctrl_c = InputEvent::Key {
            code: KeyCode::Char('c'),
            modifiers: crate::actor::KeyModifiers {
                control: true,
                ..crate::actor::KeyModifiers::NONE
            },
        };
        assert_eq!(transcript.handle_input(&ctrl_c, ms(0), &mut handler), Flow::Quit);
        let ctrl_x = InputEvent::Key {
            code: KeyCode::Char('x'),
            modifiers: crate::actor::KeyModifiers {
                control: true,
                ..crate::actor::KeyModifiers::NONE
            },
        };
        assert_eq!(transcript.handle_input(&ctrl_x, ms(0), &mut handler), Flow::Idle);
    }

    #[test]
    fn test_teardown_silences_everything() {
        let mut transcript = transcript(vec![OutputBlock::text("abc").reveal_budget(300)]);
        transcript.teardown();
        assert_eq!(transcript.next_deadline(), None);
        assert!(!transcript.advance(ms(1000)));
        assert_eq!(transcript.chain().head().unwrap().state().revealed, 0);
    }
}
