use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use engine::{
    Buyable, DirectionalInput, GameSession, SessionError, TransitionContext, TransitionEvent,
};
use tracing::{info, warn};

use super::bootstrap::AppWiring;
use super::commands::{CommandRegistry, ConsoleCommand};
use super::presentation::ConsolePresentation;

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub(crate) target_tps: u32,
    pub(crate) max_frame_delta: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
        }
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        loop_config,
        session,
    } = app;
    let lines = match spawn_stdin_reader() {
        Ok(lines) => lines,
        Err(error) => {
            warn!(error = %error, "stdin_reader_spawn_failed");
            return ExitCode::FAILURE;
        }
    };

    let mut driver = ConsoleDriver::new(session, io::stdout());
    driver.print_banner();

    let target_tps = loop_config.target_tps.max(1);
    let frame_target = Duration::from_secs_f64(1.0 / target_tps as f64);
    info!(
        target_tps,
        max_frame_delta_ms = loop_config.max_frame_delta.as_millis() as u64,
        "loop_config"
    );

    let mut stdin_open = true;
    let mut last_frame_instant = Instant::now();
    loop {
        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;
        let frame_dt = raw_frame_dt.min(loop_config.max_frame_delta);

        while stdin_open && driver.accepts_commands() {
            match lines.try_recv() {
                Ok(line) => driver.handle_line(&line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => stdin_open = false,
            }
        }
        if driver.quit_requested() {
            info!(reason = "quit_command", "shutdown_requested");
            break;
        }

        driver.tick(frame_dt);
        if !stdin_open && driver.is_idle() {
            info!(reason = "stdin_closed", "shutdown_requested");
            break;
        }

        let elapsed = Instant::now().saturating_duration_since(now);
        if elapsed < frame_target {
            thread::sleep(frame_target - elapsed);
        }
    }

    info!("shutdown");
    ExitCode::SUCCESS
}

fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(line).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "stdin_read_failed");
                        break;
                    }
                }
            }
        })?;
    Ok(receiver)
}

/// Turns console lines into session calls and advances the session once per frame.
pub(crate) struct ConsoleDriver<W: Write> {
    session: GameSession,
    presentation: ConsolePresentation<W>,
    registry: CommandRegistry,
    held: DirectionalInput,
    sleep_remaining: Duration,
    quit_requested: bool,
}

impl<W: Write> ConsoleDriver<W> {
    pub(crate) fn new(session: GameSession, out: W) -> Self {
        Self {
            session,
            presentation: ConsolePresentation::new(out),
            registry: CommandRegistry::with_session_commands(),
            held: DirectionalInput::none(),
            sleep_remaining: Duration::ZERO,
            quit_requested: false,
        }
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Commands are held back while a `sleep` is pending.
    pub(crate) fn accepts_commands(&self) -> bool {
        self.sleep_remaining.is_zero() && !self.quit_requested
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.sleep_remaining.is_zero() && !self.session.is_transitioning()
    }

    fn print_banner(&mut self) {
        let continue_hint = if self.session.can_continue() {
            "a saved game is available: continue"
        } else {
            "no saved game"
        };
        self.presentation
            .line(format!("Emberwake ({continue_hint}). Type 'help' for commands."));
    }

    pub(crate) fn tick(&mut self, dt: Duration) {
        self.sleep_remaining = self.sleep_remaining.saturating_sub(dt);
        let event = self
            .session
            .tick(dt, self.held, &mut self.presentation);
        if let Some(TransitionEvent::Completed { plan, .. }) = event {
            self.presentation
                .line(format!("[travel] arrived at {}", plan.to));
        }
    }

    pub(crate) fn handle_line(&mut self, raw_line: &str) {
        match self.registry.parse_line(raw_line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => {}
            Err(message) => self.presentation.line(message),
        }
    }

    fn execute(&mut self, command: ConsoleCommand) {
        let result = match command {
            ConsoleCommand::NewGame { hero_name } => {
                self.held = DirectionalInput::none();
                self.session.new_game(&hero_name, &mut self.presentation)
            }
            ConsoleCommand::Continue => {
                self.held = DirectionalInput::none();
                self.session.continue_game(&mut self.presentation)
            }
            ConsoleCommand::Go { location } => self
                .session
                .request_transition(location, TransitionContext::Console, &mut self.presentation)
                .map(|plan| {
                    self.presentation
                        .line(format!("[travel] heading to {} ({})", plan.to, plan.entry));
                }),
            ConsoleCommand::Hold { action } => {
                self.held.set(action, true);
                Ok(())
            }
            ConsoleCommand::Release { action } => {
                match action {
                    Some(action) => self.held.set(action, false),
                    None => self.held = DirectionalInput::none(),
                }
                Ok(())
            }
            ConsoleCommand::Sleep { millis } => {
                self.sleep_remaining = Duration::from_millis(millis);
                Ok(())
            }
            ConsoleCommand::Save => self.session.save(&mut self.presentation),
            ConsoleCommand::Erase => self
                .session
                .erase_save(&mut self.presentation)
                .map(|outcome| {
                    self.held = DirectionalInput::none();
                    self.presentation.line(format!("[save] erase: {outcome:?}"));
                }),
            ConsoleCommand::Status => {
                self.print_status();
                Ok(())
            }
            ConsoleCommand::Items => {
                self.print_items();
                Ok(())
            }
            ConsoleCommand::Buy { item_id } => self.session.purchase(&item_id).map(|gold| {
                self.presentation
                    .line(format!("[shop] bought {item_id}; {gold} gold left"));
            }),
            ConsoleCommand::Sell { item_id } => self.session.sell(&item_id).map(|gold| {
                let left = self
                    .session
                    .hero()
                    .map_or(0, |hero| hero.count_of(&item_id));
                self.presentation
                    .line(format!("[shop] sold {item_id}; {gold} gold now, {left} left"));
            }),
            ConsoleCommand::Modal { open } => {
                self.session.ui_mut().set_modal_open(open);
                Ok(())
            }
            ConsoleCommand::Help => {
                for line in self.registry.help_lines() {
                    self.presentation.line(line);
                }
                Ok(())
            }
            ConsoleCommand::Quit => {
                self.quit_requested = true;
                Ok(())
            }
        };

        if let Err(error) = result {
            self.report_error(&error);
        }
    }

    fn report_error(&mut self, error: &SessionError) {
        match error {
            // Load outcomes were already announced through the presentation hooks.
            SessionError::Load(_) => {}
            SessionError::Write(_) | SessionError::Delete(_) => {
                warn!(error = %error, "save_slot_io_failed");
            }
            other => self.presentation.line(format!("error: {other}")),
        }
    }

    fn print_status(&mut self) {
        let phase = self.session.phase();
        let line = match self.session.state() {
            Some(state) => {
                let hero = &state.hero;
                let position = hero
                    .last_position
                    .map(|position| position.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "hero={} location={} position={} hp={}/{} gold={} items=[{}] flags={} phase={:?} modal={}",
                    hero.name,
                    hero.current_location,
                    position,
                    hero.vitals.health,
                    hero.vitals.max_health,
                    hero.vitals.gold,
                    hero.inventory.join(","),
                    hero.flags.len() + state.world_flags.len(),
                    phase,
                    self.session.ui().is_modal_open(),
                )
            }
            None => format!(
                "no game in progress (save slot: {})",
                if self.session.can_continue() {
                    "present"
                } else {
                    "empty"
                }
            ),
        };
        self.presentation.line(line);
    }

    fn print_items(&mut self) {
        let lines = self
            .session
            .catalog()
            .items()
            .iter()
            .map(|item| {
                format!(
                    "{} [{}] {} buy={} sell={}",
                    item.id,
                    item.kind.label(),
                    item.name,
                    item.buy_price(),
                    item.sell_price()
                )
            })
            .collect::<Vec<_>>();
        for line in lines {
            self.presentation.line(line);
        }
    }

    #[cfg(test)]
    fn session(&self) -> &GameSession {
        &self.session
    }
}

#[cfg(test)]
impl ConsoleDriver<Vec<u8>> {
    fn into_output(self) -> String {
        String::from_utf8(self.presentation.into_inner()).unwrap_or_default()
    }
}
