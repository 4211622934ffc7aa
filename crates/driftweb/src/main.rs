use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::window_size,
};
use driftweb_config::Config;
use driftweb_field::{
    Environment, FieldOptions, LoopState, ParticleField, TickScheduler, Visibility,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Layout, Size},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::Paragraph,
};

mod logging;
mod signals;
mod surface;

use signals::TerminalSignals;
use surface::{TerminalSurface, logical_bounds};

/// Poll interval while no frame is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load()?;
    logging::init(config.log_file.as_deref())?;

    let terminal = ratatui::init();
    let result = execute!(stdout(), EnableFocusChange)
        .map_err(Into::into)
        .and_then(|()| App::new(&config, &terminal))
        .and_then(|app| app.run(terminal));
    if let Err(err) = execute!(stdout(), DisableFocusChange) {
        tracing::warn!(%err, "failed to disable focus reporting");
    }
    ratatui::restore();
    result
}

/// The backdrop application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Paused by the user, independent of terminal focus.
    paused: bool,
    field: ParticleField<TerminalSurface>,
    scheduler: TickScheduler,
    signals: TerminalSignals,
    clock: FrameClock,
    cell_px: (u16, u16),
}

impl App {
    /// Mount the particle field on the terminal.
    pub fn new(config: &Config, terminal: &DefaultTerminal) -> color_eyre::Result<Self> {
        let cell_px = (config.cell_width_px.max(1), config.cell_height_px.max(1));
        let bounds = logical_bounds(terminal.size()?, reported_pixels(), cell_px);
        let surface = TerminalSurface::new(bounds, config.pixel_ratio, config.variant);

        // the surface tag selects the preset unless the palette is overridden
        let custom = if config.palette.is_empty() {
            None
        } else {
            Some(config.field_config()?)
        };

        let scheduler = TickScheduler::new();
        let signals = TerminalSignals::default();
        let mut container = signals.clone();
        let mut window = signals.clone();
        let mut visibility = signals.clone();

        let field = ParticleField::mount(
            surface,
            Environment {
                reduced_motion: config.reduced_motion,
                container_resize: Some(&mut container),
                window_resize: &mut window,
                visibility: &mut visibility,
            },
            Box::new(scheduler.clone()),
            FieldOptions {
                config: custom,
                seed: None,
            },
        );

        Ok(Self {
            running: false,
            paused: false,
            field,
            scheduler,
            signals,
            clock: FrameClock::new(
                Duration::from_millis(config.frame_interval_ms.max(1)),
                Instant::now(),
            ),
            cell_px,
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            if self.clock.tick(Instant::now()) {
                for token in self.scheduler.take_due() {
                    self.field.on_frame(token);
                }
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    /// Renders the backdrop and the caption on top of it.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(self.field.surface(), area);

        let chunks = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1), // Title
            Constraint::Length(1), // Status
            Constraint::Fill(1),
            Constraint::Length(1), // Help text
        ])
        .split(area);

        let title = Paragraph::new("d r i f t w e b")
            .style(Style::new().fg(Color::White).bold())
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        let status = match self.field.state() {
            LoopState::Disabled(reason) => format!("animation off: {reason}"),
            LoopState::Suspended => "paused".to_string(),
            _ => String::new(),
        };
        frame.render_widget(
            Paragraph::new(status)
                .style(Style::new().dark_gray())
                .alignment(Alignment::Center),
            chunks[2],
        );

        let help = Line::from(vec![
            "q".bold().white(),
            " quit  ".dark_gray(),
            "space".bold().white(),
            " pause".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[4]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls no longer than the time left until the next frame while the
    /// field is running.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        let timeout = match self.field.state() {
            LoopState::Running { .. } => self.clock.poll_timeout(Instant::now()),
            _ => IDLE_POLL,
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(columns, rows) => self.on_resize(Size::new(columns, rows)),
                Event::FocusLost => self.signals.visibility_changed(Visibility::Hidden),
                Event::FocusGained if !self.paused => {
                    self.signals.visibility_changed(Visibility::Visible)
                }
                _ => {}
            }
        }
        // apply signals even while no frame is due
        self.field.pump();
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char(' ')) => self.toggle_pause(),
            _ => {}
        }
    }

    /// Measure the new terminal size and let the field reseed.
    fn on_resize(&mut self, cells: Size) {
        let bounds = logical_bounds(cells, reported_pixels(), self.cell_px);
        self.field.surface_mut().set_bounds(bounds);
        self.signals.resized();
    }

    /// Pause or resume the animation.
    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let visibility = if self.paused {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
        self.signals.visibility_changed(visibility);
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Fixed-rate frame deadline, independent of how often input wakes the loop.
#[derive(Debug, Clone, Copy)]
struct FrameClock {
    interval: Duration,
    next_frame: Instant,
}

impl FrameClock {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_frame: now,
        }
    }

    /// How long to wait for input before the next frame is due.
    fn poll_timeout(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }

    /// Whether a frame is due at `now`. Advances the deadline when it is.
    fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.interval;
        // after a stall, skip missed frames instead of bursting through them
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
        true
    }
}

/// Pixel size reported by the terminal, when it reports one.
fn reported_pixels() -> Option<(u16, u16)> {
    window_size().ok().map(|size| (size.width, size.height))
}
