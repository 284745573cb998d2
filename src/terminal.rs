// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Current SGR state of the real terminal, so unchanged attributes are not re-sent.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn emit(&mut self, out: &mut Stdout, x: u16, y: u16, cell: Cell, width: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        out.queue(Print(cell.ch))?;
        self.pos = (x + 1 < width).then_some((x + 1, y));
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    last_size: Option<(u16, u16)>,
    pending: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        log::debug!("terminal entered raw mode");
        Ok(Self {
            stdout: out,
            last_size: None,
            pending: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flushes `frame` to the screen. Small updates only touch dirty cells;
    /// a size change or a mostly dirty frame is redrawn in full.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let resized = self.last_size != Some(size);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last_size = Some(size);
        }

        let total = frame.width as usize * frame.height as usize;
        let dirty_is_large = total > 0 && frame.dirty_indices().len() >= total / 3;
        let mut pen = Pen::default();

        if resized || frame.is_dirty_all() || dirty_is_large {
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    pen.emit(&mut self.stdout, x, y, frame.cell_at_index(idx), frame.width)?;
                }
            }
        } else {
            self.pending.clear();
            self.pending.extend_from_slice(frame.dirty_indices());
            self.pending.sort_unstable();
            let width = frame.width as usize;
            for &idx in &self.pending {
                let x = (idx % width) as u16;
                let y = (idx / width) as u16;
                pen.emit(&mut self.stdout, x, y, frame.cell_at_index(idx), frame.width)?;
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        log::debug!("terminal restored");
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
