//! Line input for the command shells.
//!
//! A [`LineReader`] produces one line per prompt, bounded by an optional
//! timeout. The terminal implementation runs the keyboard in raw mode so it
//! can offer tab completion and recall of the previous line; the stdin
//! implementation is used when input is piped; the scripted implementation
//! feeds a fixed sequence of outcomes and backs the session tests.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// What a single read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The timeout elapsed before a line was entered
    TimedOut,
    /// Input closed (Ctrl-D / Ctrl-C / end of stream)
    Eof,
}

pub trait LineReader {
    /// Show `prompt` and read one line, giving up after `timeout`.
    ///
    /// `completer` maps the text typed so far to candidate words for the
    /// word under the cursor.
    fn read_line(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
        completer: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadOutcome>;

    /// Ask a yes/no question without a timeout.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Input and output for one interactive run.
///
/// Sessions write their output through the console so nested sessions and
/// tests share a single stream.
pub struct Console {
    reader: Box<dyn LineReader>,
    out: Box<dyn Write>,
}

impl Console {
    pub fn new(reader: Box<dyn LineReader>, out: Box<dyn Write>) -> Self {
        Self { reader, out }
    }

    /// Console bound to the process's stdin/stdout.
    pub fn stdio() -> Self {
        let reader: Box<dyn LineReader> = if io::stdin().is_terminal() {
            Box::new(TerminalReader::new())
        } else {
            Box::new(StdinReader::spawn())
        };
        Self::new(reader, Box::new(io::stdout()))
    }

    pub fn read_line(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
        completer: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadOutcome> {
        self.out.flush()?;
        self.reader.read_line(prompt, timeout, completer)
    }

    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.out.flush()?;
        self.reader.confirm(prompt)
    }
}

impl Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Restores cooked mode when dropped, including on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Keyboard reader for an attached terminal.
#[derive(Default)]
pub struct TerminalReader {
    /// Last non-empty line, recalled with the Up arrow
    previous: Option<String>,
    /// Text typed before a timeout, restored at the next prompt
    partial: String,
}

const ERASE_ONE: &str = "\u{8} \u{8}";

impl TerminalReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn complete(
        buffer: &mut String,
        prompt: &str,
        completer: &dyn Fn(&str) -> Vec<String>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let word_start = buffer
            .rfind([' ', ','])
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let word = buffer[word_start..].to_string();
        let matches = completer(buffer);

        match matches.as_slice() {
            [] => {}
            [only] => {
                if let Some(rest) = only.strip_prefix(word.as_str()) {
                    buffer.push_str(rest);
                    write!(out, "{rest}")?;
                }
            }
            many => {
                write!(out, "\r\n{}\r\n{prompt}{buffer}", many.join("  "))?;
            }
        }
        Ok(())
    }
}

impl LineReader for TerminalReader {
    fn read_line(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
        completer: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadOutcome> {
        let mut stdout = io::stdout();
        let mut buffer = std::mem::take(&mut self.partial);
        write!(stdout, "{prompt}{buffer}")?;
        stdout.flush()?;

        let _raw = RawModeGuard::enable()?;
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let wait = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        write!(stdout, "\r\n")?;
                        stdout.flush()?;
                        self.partial = buffer;
                        return Ok(ReadOutcome::TimedOut);
                    }
                    deadline - now
                }
                None => Duration::from_millis(500),
            };

            if !event::poll(wait)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Enter => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    if !buffer.trim().is_empty() {
                        self.previous = Some(buffer.clone());
                    }
                    return Ok(ReadOutcome::Line(buffer));
                }
                KeyCode::Char('c') | KeyCode::Char('d')
                    if key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(ReadOutcome::Eof);
                }
                KeyCode::Backspace => {
                    if buffer.pop().is_some() {
                        write!(stdout, "{ERASE_ONE}")?;
                    }
                }
                KeyCode::Up => {
                    if let Some(previous) = &self.previous {
                        write!(stdout, "{}", ERASE_ONE.repeat(buffer.chars().count()))?;
                        buffer = previous.clone();
                        write!(stdout, "{buffer}")?;
                    }
                }
                KeyCode::Tab => {
                    Self::complete(&mut buffer, prompt, completer, &mut stdout)?;
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    write!(stdout, "{c}")?;
                }
                _ => {}
            }
            stdout.flush()?;
        }
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(io::Error::other)
    }
}

/// Line reader for piped stdin.
///
/// A background thread forwards lines so reads can still time out.
pub struct StdinReader {
    lines: Receiver<io::Result<String>>,
}

impl StdinReader {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    fn next_line(&self, timeout: Option<Duration>) -> io::Result<ReadOutcome> {
        let received = match timeout {
            Some(timeout) => match self.lines.recv_timeout(timeout) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Timeout) => return Ok(ReadOutcome::TimedOut),
                Err(RecvTimeoutError::Disconnected) => None,
            },
            None => self.lines.recv().ok(),
        };
        match received {
            Some(line) => Ok(ReadOutcome::Line(line?.trim_end_matches('\r').to_string())),
            None => Ok(ReadOutcome::Eof),
        }
    }
}

impl LineReader for StdinReader {
    fn read_line(
        &mut self,
        prompt: &str,
        timeout: Option<Duration>,
        _completer: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadOutcome> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let outcome = self.next_line(timeout)?;
        if outcome == ReadOutcome::TimedOut {
            writeln!(stdout)?;
        }
        Ok(outcome)
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        Ok(matches!(self.next_line(None)?, ReadOutcome::Line(answer) if is_yes(&answer)))
    }
}

/// Replays a fixed list of outcomes, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    script: VecDeque<ReadOutcome>,
    prompts: Vec<String>,
}

impl ScriptedReader {
    pub fn new(script: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            script: script.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Script made only of typed lines.
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|line| ReadOutcome::Line(line.into())))
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineReader for ScriptedReader {
    fn read_line(
        &mut self,
        prompt: &str,
        _timeout: Option<Duration>,
        _completer: &dyn Fn(&str) -> Vec<String>,
    ) -> io::Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.script.pop_front().unwrap_or(ReadOutcome::Eof))
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(matches!(self.script.pop_front(), Some(ReadOutcome::Line(answer)) if is_yes(&answer)))
    }
}

/// Only an explicit "y" confirms.
fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
