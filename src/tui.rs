//! TUI (Terminal User Interface) frontend
//!
//! Renders the session with Ratatui: status and menu on the left, the last
//! printed candidate list on the right, and an input line at the bottom.
//!
//! Every prompt is answered on the input line. ENTER submits, ESC cancels
//! the current prompt (and quits from the main menu), PAGE UP/DOWN scroll
//! the candidate list.

use crate::menu::{Interface, StatusReport};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const COLUMN_WIDTH: u16 = 18;
const PAGE_ROWS: usize = 10;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const INPUT_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

fn words_per_row(width: u16) -> usize {
    usize::from((width / COLUMN_WIDTH).max(1))
}

/// Rows of the candidate grid for `count` words in a panel `width` cells wide.
fn grid_rows(count: usize, width: u16) -> usize {
    count.div_ceil(words_per_row(width))
}

/// First row to show: never past the last row of the grid.
fn clamp_scroll(scroll: usize, rows: usize) -> usize {
    scroll.min(rows.saturating_sub(1))
}

/// Result of a single key press while editing the input line.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Pending,
    Submit(String),
    Cancel,
}

struct RenderContext<'a> {
    status: &'a [String],
    menu: &'a [String],
    candidates_title: &'a str,
    candidates: &'a [String],
    scroll: usize,
    message: &'a str,
    error_message: &'a str,
    prompt: &'a str,
    input: &'a str,
}

/// Terminal frontend. Restores the terminal when dropped.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    status: Vec<String>,
    menu: Vec<String>,
    candidates_title: String,
    candidates: Vec<String>,
    scroll: usize,
    /// Grid rows at the last draw.
    candidate_rows: usize,
    message: String,
    error_message: String,
    prompt: String,
    input: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            status: Vec::new(),
            menu: Vec::new(),
            candidates_title: "Candidates".to_string(),
            candidates: Vec::new(),
            scroll: 0,
            candidate_rows: 0,
            message: String::new(),
            error_message: String::new(),
            prompt: String::new(),
            input: String::new(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            status: &self.status,
            menu: &self.menu,
            candidates_title: &self.candidates_title,
            candidates: &self.candidates,
            scroll: self.scroll,
            message: &self.message,
            error_message: &self.error_message,
            prompt: &self.prompt,
            input: &self.input,
        };
        let mut rows = 0;
        self.terminal.draw(|f| rows = Self::render_static(f, &ctx))?;
        self.candidate_rows = rows;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_static(f: &mut Frame, ctx: &RenderContext) -> usize {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(8),    // Status, menu, candidates
                Constraint::Length(4), // Messages
                Constraint::Length(3), // Input
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(ctx.menu.len() as u16 + 2),
            ])
            .split(columns[0]);

        Self::render_title(f, rows[0]);
        Self::render_lines(f, left[0], "Status", ctx.status);
        Self::render_lines(f, left[1], "Commands", ctx.menu);
        let candidate_rows =
            Self::render_candidates(f, columns[1], ctx.candidates_title, ctx.candidates, ctx.scroll);
        Self::render_messages(f, rows[2], ctx.message, ctx.error_message);
        Self::render_input(f, rows[3], ctx.prompt, ctx.input);
        Self::render_instructions(f, rows[4]);
        candidate_rows
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("WORD FILTER")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_lines(f: &mut Frame, area: Rect, title: &str, lines: &[String]) {
        let text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
        let paragraph = Paragraph::new(text)
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Returns the number of grid rows.
    fn render_candidates(f: &mut Frame, area: Rect, title: &str, candidates: &[String], scroll: usize) -> usize {
        let block = Block::default()
            .title(format!("{title} ({})", candidates.len()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        let per_row = words_per_row(inner.width);
        let rows = grid_rows(candidates.len(), inner.width);

        let lines: Vec<Line> = if candidates.is_empty() {
            vec![Line::from(Span::styled("***NO ENTRY MATCHES THE FILTERS***", INFO_STYLE))]
        } else {
            candidates
                .chunks(per_row)
                .skip(clamp_scroll(scroll, rows))
                .map(|row| {
                    Line::from(
                        row.iter()
                            .map(|w| format!("{w:<width$}", width = usize::from(COLUMN_WIDTH)))
                            .collect::<String>(),
                    )
                })
                .collect()
        };

        f.render_widget(Paragraph::new(lines).block(block), area);
        rows
    }

    fn render_messages(f: &mut Frame, area: Rect, message: &str, error_message: &str) {
        let mut lines = Vec::new();
        if !message.is_empty() {
            lines.push(Line::from(Span::styled(message, MESSAGE_STYLE)));
        }
        if !error_message.is_empty() {
            lines.extend(error_message.lines().map(|l| Line::from(Span::styled(l, ERROR_STYLE))));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Messages").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_input(f: &mut Frame, area: Rect, prompt: &str, input: &str) {
        let line = Line::from(vec![
            Span::styled(prompt, HEADER_STYLE),
            Span::styled(format!("{input}_"), INPUT_STYLE),
        ]);
        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new("ENTER: Submit | ESC: Cancel / Quit | PGUP/PGDN: Scroll candidates")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Pending;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => KeyOutcome::Cancel,
            KeyCode::Esc => KeyOutcome::Cancel,
            KeyCode::Enter => KeyOutcome::Submit(std::mem::take(&mut self.input)),
            KeyCode::Backspace => {
                self.input.pop();
                KeyOutcome::Pending
            }
            KeyCode::PageDown => {
                self.scroll = clamp_scroll(self.scroll.saturating_add(PAGE_ROWS), self.candidate_rows);
                KeyOutcome::Pending
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE_ROWS);
                KeyOutcome::Pending
            }
            KeyCode::Char(c) if !ctrl => {
                // Garbage from escape sequences (alt-tab etc.)
                if c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD {
                    debug_log!("Ignoring invalid character {:?}", c);
                } else {
                    self.input.push(c);
                }
                KeyOutcome::Pending
            }
            _ => KeyOutcome::Pending,
        }
    }
}

impl Interface for TuiInterface {
    fn display_status(&mut self, report: &StatusReport, menu: &[String]) {
        self.status = report.lines();
        self.menu = menu.to_vec();
        self.draw_or_log();
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompt = prompt.to_string();
        self.input.clear();
        loop {
            if self.draw().is_err() {
                info_log!("read_line() - Draw failed, ending input");
                return None;
            }
            match event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    debug_log!("read_line() - Poll error: {}", e);
                    return None;
                }
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    debug_log!("read_line() - Read error: {}", e);
                    return None;
                }
            };
            match self.handle_key(key) {
                KeyOutcome::Pending => {}
                KeyOutcome::Submit(line) => {
                    self.message.clear();
                    self.error_message.clear();
                    return Some(line);
                }
                KeyOutcome::Cancel => return None,
            }
        }
    }

    fn display_candidates(&mut self, title: &str, candidates: &[String]) {
        self.candidates_title = title.to_string();
        self.candidates = candidates.to_vec();
        self.scroll = 0;
        self.draw_or_log();
    }

    fn display_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.draw_or_log();
    }

    fn display_error(&mut self, message: &str) {
        self.error_message = message.to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
