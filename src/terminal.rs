use crate::error::SurfaceError;
use crate::graphics::{Canvas, Rgba};
use crate::theme::ThemeConfig;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Glyph whose upper half takes the foreground colour
const UPPER_HALF: char = '▀';

/// Current terminal size as `(cols, rows)`
pub fn terminal_size() -> Result<(u16, u16), SurfaceError> {
    let size = termsize::get().ok_or(SurfaceError::SizeUnavailable)?;
    if size.cols == 0 || size.rows == 0 {
        return Err(SurfaceError::Empty {
            cols: size.cols,
            rows: size.rows,
        });
    }
    Ok((size.cols, size.rows))
}

/// Raw-mode, alternate-screen terminal with mouse capture; restores the
/// terminal when dropped
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        Ok(TerminalSession { out })
    }

    pub fn out(&mut self) -> &mut Stdout {
        &mut self.out
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// One terminal character cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: (u8, u8, u8),
    pub bg: (u8, u8, u8),
}

/// Text drawn on top of the field
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    /// Lines drawn from the top-left corner
    pub lines: Vec<String>,
    /// Text centred on screen
    pub banner: Option<String>,
}

fn rgb(color: Rgba) -> (u8, u8, u8) {
    (color.r, color.g, color.b)
}

fn to_color((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Converts the canvas into terminal cells, two pixels per cell, and writes
/// only the cells that changed since the previous frame
pub struct Presenter {
    cols: usize,
    rows: usize,
    last: Vec<Option<Cell>>,
}

impl Presenter {
    pub fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Presenter {
            cols,
            rows,
            last: vec![None; cols * rows],
        }
    }

    /// Builds the full grid of cells for a frame
    pub fn compose(&self, canvas: &Canvas, config: &ThemeConfig, overlay: &Overlay) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.cols * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let top = canvas.composite(col, row * 2, config.background, config.surface_opacity);
                let bottom =
                    canvas.composite(col, row * 2 + 1, config.background, config.surface_opacity);
                cells.push(Cell {
                    ch: UPPER_HALF,
                    fg: top,
                    bg: bottom,
                });
            }
        }

        for (row, line) in overlay.lines.iter().enumerate() {
            self.write_text(&mut cells, row, 1, line, config);
        }
        if let Some(banner) = &overlay.banner {
            let width = banner.chars().count();
            let col = self.cols.saturating_sub(width) / 2;
            self.write_text(&mut cells, self.rows / 2, col, banner, config);
        }
        cells
    }

    fn write_text(
        &self,
        cells: &mut [Cell],
        row: usize,
        col: usize,
        text: &str,
        config: &ThemeConfig,
    ) {
        if row >= self.rows {
            return;
        }
        for (offset, ch) in text.chars().enumerate() {
            let x = col + offset;
            if x >= self.cols {
                break;
            }
            let cell = &mut cells[row * self.cols + x];
            *cell = Cell {
                ch,
                fg: rgb(config.foreground),
                bg: cell.fg,
            };
        }
    }

    /// Writes changed cells and returns how many were written
    pub fn present<W: Write>(&mut self, out: &mut W, cells: &[Cell]) -> io::Result<usize> {
        queue!(out, BeginSynchronizedUpdate)?;

        let mut written = 0;
        let mut colors: Option<((u8, u8, u8), (u8, u8, u8))> = None;
        let mut cursor_at: Option<(usize, usize)> = None;

        for (index, cell) in cells.iter().enumerate().take(self.last.len()) {
            if self.last[index] == Some(*cell) {
                continue;
            }
            let (col, row) = (index % self.cols, index / self.cols);
            if cursor_at != Some((col, row)) {
                queue!(out, cursor::MoveTo(col as u16, row as u16))?;
            }
            if colors != Some((cell.fg, cell.bg)) {
                queue!(
                    out,
                    SetForegroundColor(to_color(cell.fg)),
                    SetBackgroundColor(to_color(cell.bg))
                )?;
                colors = Some((cell.fg, cell.bg));
            }
            queue!(out, Print(cell.ch))?;
            cursor_at = Some((col + 1, row));
            self.last[index] = Some(*cell);
            written += 1;
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Surface;
    use crate::theme::Theme;

    #[test]
    fn empty_canvas_shows_background() {
        let config = Theme::Dark.config();
        let presenter = Presenter::new(3, 2);
        let canvas = Canvas::new(3, 4, 8.0);
        let cells = presenter.compose(&canvas, config, &Overlay::default());
        assert_eq!(cells.len(), 6);
        assert!(cells.iter().all(|cell| {
            cell.fg == (18, 18, 18) && cell.bg == (18, 18, 18) && cell.ch == UPPER_HALF
        }));
    }

    #[test]
    fn cell_halves_map_to_pixel_rows() {
        let config = Theme::Light.config();
        let presenter = Presenter::new(1, 1);
        let mut canvas = Canvas::new(1, 2, 1.0);
        canvas.fill_circle([0.5, 1.5], 0.1, Rgba::new(0, 0, 0, 1.0));
        let cells = presenter.compose(&canvas, config, &Overlay::default());
        assert_eq!(cells[0].fg, (245, 247, 250));
        assert_ne!(cells[0].bg, (245, 247, 250));
    }

    #[test]
    fn overlay_text_is_clipped_to_the_grid() {
        let config = Theme::Light.config();
        let presenter = Presenter::new(4, 3);
        let canvas = Canvas::new(4, 6, 8.0);
        let overlay = Overlay {
            lines: vec!["abcdef".to_string()],
            banner: Some("ok".to_string()),
        };
        let cells = presenter.compose(&canvas, config, &overlay);
        let row0: String = cells[..4].iter().map(|cell| cell.ch).collect();
        assert_eq!(row0, "▀abc");
        assert_eq!(cells[4 + 1].ch, 'o');
        assert_eq!(cells[4 + 2].ch, 'k');
        assert_eq!(cells[1].fg, (33, 37, 41));
    }

    #[test]
    fn unchanged_cells_are_not_rewritten() {
        let config = Theme::Light.config();
        let mut presenter = Presenter::new(2, 2);
        let mut canvas = Canvas::new(2, 4, 1.0);
        let mut sink = Vec::new();

        let cells = presenter.compose(&canvas, config, &Overlay::default());
        assert_eq!(presenter.present(&mut sink, &cells).unwrap(), 4);
        assert_eq!(presenter.present(&mut sink, &cells).unwrap(), 0);

        canvas.fill_circle([1.5, 3.5], 0.1, Rgba::new(0, 0, 0, 1.0));
        let cells = presenter.compose(&canvas, config, &Overlay::default());
        assert_eq!(presenter.present(&mut sink, &cells).unwrap(), 1);
    }
}
