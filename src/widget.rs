use crate::field::{FrameStats, ParticleField};
use crate::graphics::Canvas;
use crate::state::{AppState, PointerState};
use crate::terminal::{Overlay, Presenter};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::time::Instant;
use tracing::{debug, info};

/// Most recent git tag at build time, empty when there is none
const LATEST_TAG: &str = include_str!(concat!(env!("OUT_DIR"), "/latest_tag.txt"));

/// What the run loop should do after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Converts a terminal cell to the simulation coordinates of its centre.
///
/// A cell is one pixel wide and two pixels tall, each pixel `scale` units.
pub fn cell_to_units(col: u16, row: u16, scale: f64) -> [f64; 2] {
    [
        (col as f64 + 0.5) * scale,
        (row as f64 + 0.5) * 2.0 * scale,
    ]
}

/// Particle field widget
pub struct FieldWidget {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Simulation units per canvas pixel
    scale: f64,
    field: ParticleField,
    canvas: Canvas,
    presenter: Presenter,
    pointer: PointerState,
    last_stats: FrameStats,
}

impl FieldWidget {
    pub fn new(cols: u16, rows: u16, scale: f64, data: &AppState, rng: StdRng) -> Self {
        let canvas = Canvas::new(cols as usize, rows as usize * 2, scale);
        let field = ParticleField::new(canvas.viewport(), data.theme, rng);
        FieldWidget {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            scale,
            field,
            canvas,
            presenter: Presenter::new(cols, rows),
            pointer: PointerState::default(),
            last_stats: FrameStats::default(),
        }
    }

    #[cfg(test)]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[cfg(test)]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Rebuilds the surface for a new terminal size and starts a fresh field
    fn resize(&mut self, cols: u16, rows: u16, data: &AppState) {
        self.canvas = Canvas::new(cols as usize, rows as usize * 2, self.scale);
        self.presenter = Presenter::new(cols, rows);
        self.field
            .reinitialize(self.canvas.viewport(), data.theme, &mut self.pointer);
        info!(cols, rows, "terminal resized");
    }

    /// Handle events for the field widget
    pub fn event(&mut self, event: &Event, data: &mut AppState) -> Control {
        match event {
            Event::Key(key_event) => return self.key(key_event, data),
            Event::Mouse(mouse_event) => match mouse_event.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                    self.pointer
                        .move_to(cell_to_units(mouse_event.column, mouse_event.row, self.scale));
                }
                _ => {}
            },
            Event::Resize(cols, rows) => {
                if *cols > 0 && *rows > 0 {
                    self.resize(*cols, *rows, data);
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn key(&mut self, key_event: &KeyEvent, data: &mut AppState) -> Control {
        if key_event.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('d') | KeyCode::Char('D') => data.debug = !data.debug,
            KeyCode::Char('p') | KeyCode::Char('P') => data.paused = !data.paused,
            KeyCode::Char('t') | KeyCode::Char('T') => {
                data.theme = data.theme.toggled();
                self.field
                    .reinitialize(self.canvas.viewport(), data.theme, &mut self.pointer);
                info!(theme = %data.theme, "theme changed");
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.field
                    .reinitialize(self.canvas.viewport(), data.theme, &mut self.pointer);
            }
            _ => {}
        }
        Control::Continue
    }

    /// Advances the simulation by one frame unless paused
    pub fn tick(&mut self, data: &AppState) {
        if data.paused {
            return;
        }
        self.last_stats = self.field.frame(&self.pointer, &mut self.canvas);
    }

    /// Paint the field widget
    pub fn paint<W: Write>(&mut self, out: &mut W, data: &AppState) -> io::Result<()> {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
            debug!(
                fps = self.fps,
                connections = self.last_stats.connections,
                "frame rate"
            );
        }

        let overlay = self.overlay(data);
        let cells = self
            .presenter
            .compose(&self.canvas, data.theme.config(), &overlay);
        self.presenter.present(out, &cells)?;
        Ok(())
    }

    fn overlay(&self, data: &AppState) -> Overlay {
        let mut overlay = Overlay::default();

        if data.debug {
            overlay
                .lines
                .push(format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
            let tag = LATEST_TAG.trim();
            if !tag.is_empty() {
                overlay.lines.push(format!("Version: {}", tag));
            }
            let [width, height] = self.field.viewport();
            overlay.lines.push(format!(
                "Theme: {}  Particles: {}  Links: {}",
                data.theme,
                self.field.particles().len(),
                self.last_stats.connections
            ));
            overlay
                .lines
                .push(format!("Viewport: {:.0}x{:.0}", width, height));
            let pointer = match self.pointer.position {
                Some([x, y]) => format!("Pointer: ({:.0}, {:.0})", x, y),
                None => "Pointer: none".to_string(),
            };
            overlay.lines.push(pointer);
            overlay.lines.push(format!("FPS: {:.2}", self.fps));
        }

        if data.paused {
            overlay.banner = Some("Paused".to_string());
        }
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent};
    use rand::SeedableRng;

    fn widget(data: &AppState) -> FieldWidget {
        FieldWidget::new(100, 40, 8.0, data, StdRng::seed_from_u64(42))
    }

    fn press(c: char) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn cell_centres_map_to_units() {
        assert_eq!(cell_to_units(0, 0, 8.0), [4.0, 8.0]);
        assert_eq!(cell_to_units(10, 3, 8.0), [84.0, 56.0]);
    }

    #[test]
    fn viewport_follows_terminal_size() {
        let data = AppState::new(Theme::Light);
        let widget = widget(&data);
        assert_eq!(widget.field().viewport(), [800.0, 640.0]);
        assert_eq!(widget.field().particles().len(), 80);
    }

    #[test]
    fn mouse_motion_updates_pointer() {
        let mut data = AppState::new(Theme::Light);
        let mut widget = widget(&data);
        assert_eq!(widget.pointer().position, None);

        widget.event(&mouse(MouseEventKind::Moved, 10, 3), &mut data);
        assert_eq!(widget.pointer().position, Some([84.0, 56.0]));

        widget.event(&mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0), &mut data);
        assert_eq!(widget.pointer().position, Some([4.0, 8.0]));

        widget.event(&mouse(MouseEventKind::ScrollUp, 50, 20), &mut data);
        assert_eq!(widget.pointer().position, Some([4.0, 8.0]));
    }

    #[test]
    fn theme_key_reinitializes_field() {
        let mut data = AppState::new(Theme::Light);
        let mut widget = widget(&data);
        widget.event(&mouse(MouseEventKind::Moved, 1, 1), &mut data);

        assert_eq!(widget.event(&press('t'), &mut data), Control::Continue);

        assert_eq!(data.theme, Theme::Dark);
        assert_eq!(widget.field().theme(), Theme::Dark);
        assert_eq!(widget.field().particles().len(), 70);
        assert_eq!(widget.pointer().position, None);
    }

    #[test]
    fn resize_rebuilds_viewport() {
        let mut data = AppState::new(Theme::Dark);
        let mut widget = widget(&data);
        widget.event(&mouse(MouseEventKind::Moved, 5, 5), &mut data);
        assert!(widget.pointer().position.is_some());

        widget.event(&Event::Resize(50, 10), &mut data);
        assert_eq!(widget.field().viewport(), [400.0, 160.0]);
        assert_eq!(widget.field().particles().len(), 70);
        assert_eq!(widget.pointer().position, None);

        widget.event(&Event::Resize(0, 10), &mut data);
        assert_eq!(widget.field().viewport(), [400.0, 160.0]);
    }

    #[test]
    fn quit_and_toggle_keys() {
        let mut data = AppState::new(Theme::Light);
        let mut widget = widget(&data);

        widget.event(&press('p'), &mut data);
        assert!(data.paused);
        widget.event(&press('d'), &mut data);
        assert!(data.debug);
        assert_eq!(widget.event(&press('q'), &mut data), Control::Quit);

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(widget.event(&ctrl_c, &mut data), Control::Quit);
        assert_eq!(widget.event(&press('c'), &mut data), Control::Continue);
    }

    #[test]
    fn paused_widget_does_not_advance() {
        let mut data = AppState::new(Theme::Light);
        let mut widget = widget(&data);
        widget.event(&mouse(MouseEventKind::Moved, 50, 20), &mut data);
        data.paused = true;

        let before = widget.field().particles().to_vec();
        widget.tick(&data);
        assert_eq!(widget.field().particles(), &before[..]);
    }

    #[test]
    fn paint_shows_banner_and_debug_lines() {
        let mut data = AppState::new(Theme::Dark);
        data.paused = true;
        data.debug = true;
        let mut widget = widget(&data);
        widget.tick(&AppState::new(Theme::Dark));

        let overlay = widget.overlay(&data);
        assert_eq!(overlay.banner.as_deref(), Some("Paused"));
        assert!(overlay.lines[0].starts_with("particlefield "));
        assert!(overlay
            .lines
            .iter()
            .any(|line| line.starts_with("Theme: dark  Particles: 70")));
        assert!(overlay.lines.iter().any(|line| line == "Viewport: 800x640"));

        let mut sink = Vec::new();
        widget.paint(&mut sink, &data).unwrap();
        assert!(!sink.is_empty());
    }
}
