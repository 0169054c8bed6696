use crate::config::Rgb;
use crate::{Cell, TermCoords, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

const CELL_CHAR: char = '█';
// Grid cells are two characters wide so they look square in a terminal
const CELL_WIDTH: TermInt = 2;

#[derive(Copy, Clone, PartialEq)]
struct Glyph {
    ch: char,
    color: Option<Rgb>,
}

const BLANK: Glyph = Glyph { ch: ' ', color: None };

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Glyph>,
    current_msg: Option<Message>,
    origin: TermCoords,
    columns: TermInt,
    rows: TermInt,
}

struct Message {
    lines: Vec<String>,
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    /// Sizes the play-field for a grid of `columns` x `rows` cells.
    pub fn new(columns: TermInt, rows: TermInt) -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![BLANK; width as usize * height as usize];
        let (field_w, field_h) = Self::required_size(columns, rows);
        let origin = (width.saturating_sub(field_w) / 2 + 1, height.saturating_sub(field_h) / 2 + 1);
        Ok(TermManager { width, height, stdout, screen, current_msg: None, origin, columns, rows })
    }

    /// Terminal size needed for the bordered field plus the status line.
    pub fn required_size(columns: TermInt, rows: TermInt) -> TermCoords {
        (columns * CELL_WIDTH + 2, rows + 3)
    }

    pub fn fits(&self) -> bool {
        let (w, h) = Self::required_size(self.columns, self.rows);
        w <= self.width && h <= self.height
    }

    pub fn get_terminal_size(&self) -> TermCoords {
        (self.width, self.height)
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_key_events_queue(&self) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn clear(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn draw_borders(&mut self) -> crossterm::Result<()> {
        let (left, top) = (self.origin.0 - 1, self.origin.1 - 1);
        let right = self.origin.0 + self.columns * CELL_WIDTH;
        let bottom = self.origin.1 + self.rows;

        for x in left..=right {
            let ch = if x == left || x == right {'+'} else {'-'};
            self.print_at((x, top), Glyph { ch, color: None })?;
            self.print_at((x, bottom), Glyph { ch, color: None })?;
        }

        for y in top + 1..bottom {
            self.print_at((left, y), Glyph { ch: '|', color: None })?;
            self.print_at((right, y), Glyph { ch: '|', color: None })?;
        }

        Ok(())
    }

    /// Paints the grid cell at column `col`, row `row`. `None` blanks it.
    pub fn fill_cell(&mut self, (col, row): Cell, color: Option<Rgb>) -> crossterm::Result<()> {
        if col < 0 || row < 0 || col >= self.columns as i32 || row >= self.rows as i32 {
            return Ok(());
        }

        let ch = if color.is_some() {CELL_CHAR} else {' '};
        let x = self.origin.0 + col as TermInt * CELL_WIDTH;
        let y = self.origin.1 + row as TermInt;
        for dx in 0..CELL_WIDTH {
            self.print_at((x + dx, y), Glyph { ch, color })?;
        }

        Ok(())
    }

    /// Writes a line of text below the field, blanking whatever was there before.
    pub fn print_status(&mut self, text: &str) -> crossterm::Result<()> {
        let y = self.origin.1 + self.rows + 1;
        let x0 = self.origin.0 - 1;
        let width = (self.columns * CELL_WIDTH + 2) as usize;
        let padded = format!("{text: <width$}", text = text, width = width);

        for (i, ch) in padded.chars().take(width).enumerate() {
            self.print_at((x0 + i as TermInt, y), Glyph { ch, color: None })?;
        }

        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> crossterm::Result<()> {
        if let Some(msg) = &self.current_msg {
            if msg.lines.iter().map(String::as_str).eq(lines.iter().copied()) {
                return Ok(());
            }
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        let lines = lines.iter().map(|l| l.to_string()).collect();
        self.current_msg = Some(Message { lines, width: msg_width, height: msg_height, top_left });
        Ok(())
    }

    pub fn hide_message(&mut self) -> crossterm::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y in msg.top_left.1..msg.top_left.1 + msg.height {
            for x in msg.top_left.0..msg.top_left.0 + msg.width {
                if let Some(glyph) = self.glyph_at((x, y)) {
                    self.emit((x, y), glyph)?;
                }
            }
        }

        Ok(())
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, (x, y): TermCoords) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.width as usize * y as usize + x as usize)
        } else {
            None
        }
    }

    fn glyph_at(&self, pos: TermCoords) -> Option<Glyph> {
        self.index(pos).map(|i| self.screen[i])
    }

    /// Draws into the saved screen, skipping positions that already show `glyph`.
    fn print_at(&mut self, pos: TermCoords, glyph: Glyph) -> crossterm::Result<()> {
        let i = match self.index(pos) {
            Some(i) => i,
            None => return Ok(()),
        };
        if self.screen[i] == glyph {
            return Ok(());
        }

        self.screen[i] = glyph;
        if self.covered_by_message(pos) {
            // Shown once the message is hidden
            return Ok(());
        }
        self.emit(pos, glyph)
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> crossterm::Result<()> {
        if self.index(pos).is_some() {
            queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::ResetColor, style::Print(ch))?;
        }
        Ok(())
    }

    fn emit(&mut self, pos: TermCoords, glyph: Glyph) -> crossterm::Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1))?;
        match glyph.color {
            Some(Rgb { r, g, b }) => queue!(self.stdout, style::SetForegroundColor(Color::Rgb { r, g, b }))?,
            None => queue!(self.stdout, style::ResetColor)?,
        }
        queue!(self.stdout, style::Print(glyph.ch))
    }

    fn covered_by_message(&self, (x, y): TermCoords) -> bool {
        self.current_msg.as_ref().map_or(false, |msg| {
            x >= msg.top_left.0 && x < msg.top_left.0 + msg.width
                && y >= msg.top_left.1 && y < msg.top_left.1 + msg.height
        })
    }
}
