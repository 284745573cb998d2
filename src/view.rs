// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::grid::Grid;
use crate::palette::{self, Rgb};
use crate::runtime::{ColorMode, SpeedMode};

/// Terminal columns per grid cell, so cells look roughly square.
pub const CELL_WIDTH: u16 = 2;
const GRID_TOP: u16 = 4;

/// Everything the view needs from one moment of the controller.
pub struct Snapshot<'a> {
    pub grid: &'a Grid,
    pub score: u64,
    pub running: bool,
    pub speed: SpeedMode,
}

pub struct View {
    mode: ColorMode,
}

impl View {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    fn color(&self, rgb: Rgb) -> Option<Color> {
        palette::term_color(self.mode, rgb)
    }

    fn button(&self, frame: &mut Frame, x: u16, y: u16, label: &str, fill: Rgb) -> u16 {
        let bg = self.color(fill);
        let fg = self.color(palette::TEXT);
        let end = frame.put_str(x, y, &format!(" {} ", label), fg, bg, true);
        end.saturating_add(2)
    }

    /// Paints `snap` into `frame`. Only cells whose content changed end up dirty.
    pub fn render(&self, frame: &mut Frame, snap: &Snapshot<'_>) {
        let start_fill = if snap.running {
            palette::DISABLED
        } else {
            palette::START_ON
        };
        let stop_fill = if snap.running {
            palette::STOP_ON
        } else {
            palette::DISABLED
        };
        let mut x = 1;
        x = self.button(frame, x, 0, "[s] Start", start_fill);
        x = self.button(frame, x, 0, "[x] Stop", stop_fill);
        self.button(frame, x, 0, "[r] Reset Score", palette::RESET);

        let mut x = 1;
        for (i, mode) in SpeedMode::ALL.iter().enumerate() {
            let fill = if *mode == snap.speed {
                palette::SPEED_ACTIVE
            } else {
                palette::SPEED_IDLE
            };
            let label = format!("[{}] {}", i + 1, mode.label());
            x = self.button(frame, x, 1, &label, fill);
        }

        let fg = self.color(palette::TEXT);
        let end = frame.put_str(1, 2, &format!("Score: {}", snap.score), fg, None, true);
        frame.fill_row(2, end, Cell::BLANK);

        self.render_grid(frame, snap.grid);

        let hint_y = GRID_TOP + snap.grid.rows() + 1;
        if hint_y < frame.height {
            let dim = self.color(palette::SPEED_IDLE);
            frame.put_str(
                1,
                hint_y,
                "space toggle  up/down speed  q quit",
                dim,
                None,
                false,
            );
        }
    }

    fn render_grid(&self, frame: &mut Frame, grid: &Grid) {
        let grid_w = grid.cols() * CELL_WIDTH;
        let left = frame.width.saturating_sub(grid_w) / 2;
        let border = self.color(palette::GRID_FRAME);

        for row in 0..grid.rows() {
            let y = GRID_TOP + row;
            if y >= frame.height {
                break;
            }
            if left > 0 {
                frame.set(left - 1, y, Cell::glyph('▐', border, None));
            }
            for col in 0..grid.cols() {
                let shade = grid.get(row, col);
                let cell = match self.mode {
                    ColorMode::Mono => Cell::glyph(palette::mono_glyph(shade), None, None),
                    _ => Cell::glyph(' ', None, self.color(palette::shade_rgb(shade))),
                };
                let x = left + col * CELL_WIDTH;
                for dx in 0..CELL_WIDTH {
                    frame.set(x + dx, y, cell);
                }
            }
            frame.set(left + grid_w, y, Cell::glyph('▌', border, None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Hue, Shade};

    fn text_at(frame: &Frame, y: u16) -> String {
        (0..frame.width)
            .filter_map(|x| frame.get(x, y).map(|c| c.ch))
            .collect()
    }

    #[test]
    fn shows_controls_and_score() {
        let grid = Grid::new(3, 3);
        let mut frame = Frame::new(80, 10);
        let snap = Snapshot {
            grid: &grid,
            score: 17,
            running: false,
            speed: SpeedMode::Fast,
        };
        View::new(ColorMode::TrueColor).render(&mut frame, &snap);

        assert!(text_at(&frame, 0).contains("[r] Reset Score"));
        assert!(text_at(&frame, 1).contains("[3] Fast"));
        assert!(text_at(&frame, 2).contains("Score: 17"));
    }

    #[test]
    fn grid_cells_are_two_columns_wide_and_colored() {
        let mut grid = Grid::new(2, 2);
        grid.set(1, 1, Shade::lit(Hue(240), 1.0));
        let mut frame = Frame::new(10, 8);
        let snap = Snapshot {
            grid: &grid,
            score: 0,
            running: true,
            speed: SpeedMode::Medium,
        };
        View::new(ColorMode::TrueColor).render(&mut frame, &snap);

        let left = (10 - 4) / 2;
        let lit = Some(Color::Rgb {
            r: 51,
            g: 51,
            b: 255,
        });
        assert_eq!(frame.get(left + 2, GRID_TOP + 1).and_then(|c| c.bg), lit);
        assert_eq!(frame.get(left + 3, GRID_TOP + 1).and_then(|c| c.bg), lit);
        assert_ne!(frame.get(left, GRID_TOP + 1).and_then(|c| c.bg), lit);
    }

    #[test]
    fn mono_uses_shade_glyphs() {
        let mut grid = Grid::new(1, 1);
        grid.set(0, 0, Shade::lit(Hue(280), 1.0));
        let mut frame = Frame::new(6, 6);
        let snap = Snapshot {
            grid: &grid,
            score: 0,
            running: true,
            speed: SpeedMode::Medium,
        };
        View::new(ColorMode::Mono).render(&mut frame, &snap);
        assert_eq!(frame.get(2, GRID_TOP).map(|c| c.ch), Some('█'));
    }
}
