use crate::history::History;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
    tty::IsTty,
};
use std::io::{self, BufRead, Write};
use std::sync::Once;

static SET_PANIC_HOOK: Once = Once::new();

/// Restores cooked mode when dropped, including on panic.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        SET_PANIC_HOOK.call_once(|| {
            let prev = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = terminal::disable_raw_mode();
                prev(info);
            }));
        });

        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Raw-mode line editor with history recall. When stdin is not a terminal
/// (piped or scripted input) it degrades to plain buffered line reads.
pub struct LineEditor {
    buffer: String,
    cursor_pos: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor_pos: 0,
        }
    }

    /// Read one line. `Ok(None)` is end of input: the session should stop.
    pub fn read_line(&mut self, prompt: &str, history: &mut History) -> io::Result<Option<String>> {
        if !io::stdin().is_tty() {
            return self.read_line_plain(prompt);
        }

        self.buffer.clear();
        self.cursor_pos = 0;

        let mut stdout = io::stdout();
        let _guard = RawModeGuard::enter()?;

        execute!(stdout, Print(prompt))?;
        stdout.flush()?;

        loop {
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != KeyEventKind::Press {
                continue;
            }

            match key_event {
                KeyEvent {
                    code: KeyCode::Enter,
                    ..
                } => {
                    execute!(stdout, Print("\r\n"))?;
                    break;
                }

                KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    // Cancel the line, keep the session.
                    self.buffer.clear();
                    self.cursor_pos = 0;
                    execute!(stdout, Print("^C\r\n"))?;
                    break;
                }

                KeyEvent {
                    code: KeyCode::Char('d'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    if self.buffer.is_empty() {
                        execute!(stdout, Print("\r\n"))?;
                        return Ok(None);
                    }
                }

                KeyEvent {
                    code: KeyCode::Char('a'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.cursor_pos = 0;
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::Char('e'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    self.cursor_pos = self.buffer.chars().count();
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::Char('u'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => {
                    let end = self.byte_index(self.cursor_pos);
                    self.buffer.drain(..end);
                    self.cursor_pos = 0;
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::Char(c),
                    modifiers,
                    ..
                } if !modifiers.contains(KeyModifiers::CONTROL) => {
                    let at = self.byte_index(self.cursor_pos);
                    self.buffer.insert(at, c);
                    self.cursor_pos += 1;
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::Backspace,
                    ..
                } => {
                    if self.cursor_pos > 0 {
                        self.cursor_pos -= 1;
                        let at = self.byte_index(self.cursor_pos);
                        self.buffer.remove(at);
                        self.redraw(prompt)?;
                    }
                }

                KeyEvent {
                    code: KeyCode::Delete,
                    ..
                } => {
                    if self.cursor_pos < self.buffer.chars().count() {
                        let at = self.byte_index(self.cursor_pos);
                        self.buffer.remove(at);
                        self.redraw(prompt)?;
                    }
                }

                KeyEvent {
                    code: KeyCode::Left,
                    ..
                } => {
                    if self.cursor_pos > 0 {
                        self.cursor_pos -= 1;
                        self.redraw(prompt)?;
                    }
                }

                KeyEvent {
                    code: KeyCode::Right,
                    ..
                } => {
                    if self.cursor_pos < self.buffer.chars().count() {
                        self.cursor_pos += 1;
                        self.redraw(prompt)?;
                    }
                }

                KeyEvent {
                    code: KeyCode::Home,
                    ..
                } => {
                    self.cursor_pos = 0;
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::End,
                    ..
                } => {
                    self.cursor_pos = self.buffer.chars().count();
                    self.redraw(prompt)?;
                }

                KeyEvent {
                    code: KeyCode::Up, ..
                } => {
                    if let Some(entry) = history.previous() {
                        self.buffer = entry.clone();
                        self.cursor_pos = self.buffer.chars().count();
                        self.redraw(prompt)?;
                    }
                }

                KeyEvent {
                    code: KeyCode::Down,
                    ..
                } => {
                    match history.next() {
                        Some(entry) => self.buffer = entry.clone(),
                        None => self.buffer.clear(),
                    }
                    self.cursor_pos = self.buffer.chars().count();
                    self.redraw(prompt)?;
                }

                _ => {}
            }
        }

        Ok(Some(std::mem::take(&mut self.buffer)))
    }

    fn read_line_plain(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn redraw(&self, prompt: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(prompt),
            Print(&self.buffer),
            cursor::MoveToColumn((prompt.chars().count() + self.cursor_pos) as u16),
        )?;
        stdout.flush()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }
}
