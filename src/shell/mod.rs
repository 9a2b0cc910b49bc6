//! Line-oriented command interpreter shared by the playback and metadata shells.
//!
//! A [`Dispatcher`] owns the command table, the alias table and the help
//! layout. Commands are registered explicitly as plain function pointers over
//! the session state, so dispatch is a map lookup rather than any form of
//! name-based reflection. The read-eval loop in [`Dispatcher::run`] reads one
//! line at a time (bounded by the session's timeout), executes exactly one
//! command to completion, and lets the session decide what happens next
//! through its [`Session::postcmd`] hook.

pub mod help;
pub mod input;

pub use input::{Console, LineReader, ReadOutcome, ScriptedReader, StdinReader, TerminalReader};

use crate::error::{Error, Result};
use help::{columnize, terminal_width, trim_docstring};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

/// Command name produced when input reaches end of stream.
pub const EOF_COMMAND: &str = "EOF";

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A command implementation: session state, console, argument text.
pub type Handler<S> = fn(&mut S, &mut Console, &str) -> Result<Flow>;

/// Argument completion: session state, word being completed, whole line.
pub type Completer<S> = fn(&S, &str, &str) -> Vec<String>;

/// Hooks a session state exposes to the loop.
pub trait Session {
    fn prompt(&self) -> String;

    /// Input timeout for the next read; `None` blocks indefinitely.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Text printed once when the loop starts.
    fn intro(&self) -> Option<String> {
        None
    }

    fn preloop(&mut self, _console: &mut Console) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Runs after every command, including empty lines and timeouts.
    fn postcmd(&mut self, _console: &mut Console, flow: Flow) -> Result<Flow> {
        Ok(flow)
    }
}

enum Action<S> {
    Help,
    Alias,
    Run(Handler<S>),
}

impl<S> Clone for Action<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Action<S> {}

struct Command<S> {
    action: Action<S>,
    doc: String,
    completer: Option<Completer<S>>,
}

/// Section headings for the `help` listing.
///
/// A section whose heading is `None` is left out entirely.
#[derive(Debug, Clone, Default)]
pub struct HelpHeaders {
    pub leader: String,
    pub documented: Option<String>,
    pub misc: Option<String>,
    pub undocumented: Option<String>,
}

impl HelpHeaders {
    /// Documented commands and help topics are listed, undocumented commands are not.
    pub fn standard() -> Self {
        Self {
            leader: String::new(),
            documented: Some("Commands (type help <topic>):".to_string()),
            misc: Some("Reference/help guides (type help <topic>):".to_string()),
            undocumented: None,
        }
    }
}

const HELP_DOC: &str = "
    Display help for the given topic or command. Without an argument, list commands.

    Usage:
    help [topic|command]

    Options:
    [topic|command] -- name of topic or command to print
    ";

const ALIAS_DOC: &str = "
    Set/clear aliases.
    If no options are provided, print aliases and their corresponding commands.

    Usage:
      alias [alias] [command]

    Options:
      [alias]: alias to create
      [command]: command to map [alias] to.
                 If blank it will clear the alias for [alias]
    ";

pub struct Dispatcher<S> {
    commands: BTreeMap<String, Command<S>>,
    aliases: BTreeMap<String, String>,
    topics: BTreeMap<String, String>,
    headers: HelpHeaders,
    show_aliases: bool,
}

impl<S> Dispatcher<S> {
    /// Dispatcher with the built-in `help` and `alias` commands (`a` aliases `alias`).
    pub fn new(headers: HelpHeaders) -> Self {
        let mut dispatcher = Self {
            commands: BTreeMap::new(),
            aliases: BTreeMap::new(),
            topics: BTreeMap::new(),
            headers,
            show_aliases: false,
        };
        dispatcher.insert("help", Action::Help, HELP_DOC, None);
        dispatcher.insert("alias", Action::Alias, ALIAS_DOC, None);
        dispatcher.aliases.insert("a".to_string(), "alias".to_string());
        dispatcher
    }

    /// Offer aliases alongside command names in completion.
    pub fn with_alias_completion(mut self, show: bool) -> Self {
        self.show_aliases = show;
        self
    }

    fn insert(
        &mut self,
        name: &str,
        action: Action<S>,
        doc: &str,
        completer: Option<Completer<S>>,
    ) -> &mut Self {
        if self.commands.contains_key(name) {
            log::warn!("command '{name}' registered twice; keeping the first");
            return self;
        }
        self.commands.insert(
            name.to_string(),
            Command {
                action,
                doc: doc.to_string(),
                completer,
            },
        );
        self
    }

    pub fn register(&mut self, name: &str, handler: Handler<S>, doc: &str) -> &mut Self {
        self.insert(name, Action::Run(handler), doc, None)
    }

    pub fn register_with_completion(
        &mut self,
        name: &str,
        handler: Handler<S>,
        doc: &str,
        completer: Completer<S>,
    ) -> &mut Self {
        self.insert(name, Action::Run(handler), doc, Some(completer))
    }

    /// Add a help topic listed under the misc header (or override a command's help).
    pub fn help_topic(&mut self, name: &str, text: &str) -> &mut Self {
        self.topics.insert(name.to_string(), text.to_string());
        self
    }

    /// Point `alias` at a command or another alias; an empty target removes it.
    ///
    /// A target that resolves to nothing leaves the alias table unchanged and
    /// returns [`Error::UnknownCommand`]. The built-in `alias` command prints
    /// that error as a diagnostic and carries on; other callers decide for
    /// themselves how to report it.
    pub fn alias(&mut self, alias: &str, target: Option<&str>) -> Result<()> {
        match target.map(str::trim).filter(|t| !t.is_empty()) {
            None => {
                self.aliases.remove(alias);
                Ok(())
            }
            Some(target) => {
                let command = self
                    .resolve(target)
                    .map(str::to_string)
                    .ok_or_else(|| Error::UnknownCommand(target.to_string()))?;
                log::debug!("alias {alias} -> {command}");
                self.aliases.insert(alias.to_string(), command);
                Ok(())
            }
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    /// Map a command or alias name to the command it runs. Case-sensitive.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.commands.get_key_value(name) {
            return Some(key.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Split a line into command token and argument text.
    ///
    /// Returns `None` for a blank line. A leading `?` is shorthand for `help`.
    pub fn split_line(line: &str) -> Option<(&str, &str)> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix('?') {
            return Some(("help", rest.trim()));
        }
        Some(match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        })
    }

    /// Execute one line against `state`.
    pub fn onecmd(&mut self, state: &mut S, console: &mut Console, line: &str) -> Result<Flow> {
        let Some((name, arg)) = Self::split_line(line) else {
            return Ok(Flow::Continue);
        };
        let action = self
            .resolve(name)
            .and_then(|command| self.commands.get(command))
            .map(|command| command.action);

        match action {
            Some(Action::Help) => {
                self.help(console, arg)?;
                Ok(Flow::Continue)
            }
            Some(Action::Alias) => {
                self.alias_command(console, arg)?;
                Ok(Flow::Continue)
            }
            Some(Action::Run(handler)) => handler(state, console, arg),
            None => {
                writeln!(console, "*** Unknown syntax: {}", line.trim())?;
                Ok(Flow::Continue)
            }
        }
    }

    fn alias_command(&mut self, console: &mut Console, arg: &str) -> Result<()> {
        let mut parts = arg.split_whitespace();
        match parts.next() {
            None => {
                for (alias, command) in &self.aliases {
                    writeln!(console, "{alias}: {command}")?;
                }
            }
            Some(alias) => {
                if let Err(e) = self.alias(alias, parts.next()) {
                    writeln!(console, "failed to create alias.\n{e}")?;
                }
            }
        }
        Ok(())
    }

    fn is_documented(&self, name: &str, command: &Command<S>) -> bool {
        !command.doc.trim().is_empty() || self.topics.contains_key(name)
    }

    /// Documented command names (and aliases, when shown) starting with `prefix`.
    pub fn complete_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .iter()
            .filter(|(name, command)| name.starts_with(prefix) && self.is_documented(name, command))
            .map(|(name, _)| name.clone())
            .collect();
        if self.show_aliases {
            names.extend(
                self.aliases
                    .iter()
                    .filter(|(alias, command)| {
                        alias.starts_with(prefix)
                            && self
                                .commands
                                .get(command.as_str())
                                .is_some_and(|c| self.is_documented(command, c))
                    })
                    .map(|(alias, _)| alias.clone()),
            );
        }
        names
    }

    /// Candidates for the word at the end of `line`.
    ///
    /// The first word completes against command names; later words use the
    /// command's completer, reached through aliases too.
    pub fn complete(&self, state: &S, line: &str) -> Vec<String> {
        let line = line.trim_start();
        let Some((name, _)) = line.split_once(char::is_whitespace) else {
            return self.complete_names(line);
        };

        let word_start = line.rfind([' ', ',']).map(|idx| idx + 1).unwrap_or(0);
        let (before, text) = line.split_at(word_start);
        let Some(completer) = self
            .resolve(name)
            .and_then(|command| self.commands.get(command))
            .and_then(|command| command.completer)
        else {
            return Vec::new();
        };

        let used: Vec<&str> = before
            .split([' ', ','])
            .skip(1)
            .filter(|word| !word.is_empty())
            .collect();
        completer(state, text, line)
            .into_iter()
            .filter(|candidate| !used.contains(&candidate.as_str()))
            .collect()
    }

    /// `help` with no argument lists commands; `help <name>` prints its documentation.
    pub fn help(&self, console: &mut Console, arg: &str) -> Result<()> {
        let arg = arg.trim();
        if !arg.is_empty() {
            if let Some(topic) = self.topics.get(arg) {
                writeln!(console, "{}", trim_docstring(topic))?;
                return Ok(());
            }
            let doc = self
                .resolve(arg)
                .and_then(|command| self.commands.get(command))
                .map(|command| command.doc.as_str())
                .unwrap_or("");
            if doc.trim().is_empty() {
                writeln!(console, "*** No help on {arg}")?;
            } else {
                writeln!(console, "{}", trim_docstring(doc))?;
            }
            return Ok(());
        }

        let mut documented = Vec::new();
        let mut undocumented = Vec::new();
        for (name, command) in &self.commands {
            if self.is_documented(name, command) {
                documented.push(name.clone());
            } else {
                undocumented.push(name.clone());
            }
        }
        let misc: Vec<String> = self
            .topics
            .keys()
            .filter(|topic| !self.commands.contains_key(topic.as_str()))
            .cloned()
            .collect();

        if !self.headers.leader.is_empty() {
            writeln!(console, "{}", self.headers.leader)?;
        }
        let width = terminal_width().saturating_sub(1);
        print_topics(console, self.headers.documented.as_deref(), &documented, width)?;
        print_topics(console, self.headers.misc.as_deref(), &misc, width)?;
        print_topics(console, self.headers.undocumented.as_deref(), &undocumented, width)?;
        Ok(())
    }
}

fn print_topics(
    console: &mut Console,
    header: Option<&str>,
    names: &[String],
    width: usize,
) -> Result<()> {
    let Some(header) = header else {
        return Ok(());
    };
    if names.is_empty() {
        return Ok(());
    }
    writeln!(console, "{header}")?;
    writeln!(console, "{}", "=".repeat(header.chars().count()))?;
    write!(console, "{}", columnize(names, width))?;
    writeln!(console)?;
    Ok(())
}

impl<S: Session> Dispatcher<S> {
    /// Read-eval loop.
    ///
    /// `timeout` overrides the session's own timeout; `intro` overrides its
    /// introduction text. A timed-out read counts as an empty line. The loop
    /// ends when a command (or the session's `postcmd`) returns [`Flow::Stop`].
    pub fn run(
        &mut self,
        state: &mut S,
        console: &mut Console,
        timeout: Option<Duration>,
        intro: Option<&str>,
    ) -> Result<()> {
        if state.preloop(console)? == Flow::Stop {
            return Ok(());
        }

        let intro = intro.map(str::to_string).or_else(|| state.intro());
        if let Some(intro) = intro.filter(|text| !text.is_empty()) {
            writeln!(console, "{intro}")?;
        }

        loop {
            let wait = timeout.or_else(|| state.timeout());
            let prompt = state.prompt();
            let outcome = {
                let dispatcher = &*self;
                let view = &*state;
                console.read_line(&prompt, wait, &|text| dispatcher.complete(view, text))?
            };

            let line = match outcome {
                ReadOutcome::Line(line) => line,
                ReadOutcome::TimedOut => {
                    log::debug!("input timed out after {wait:?}");
                    String::new()
                }
                ReadOutcome::Eof => EOF_COMMAND.to_string(),
            };

            let flow = self.onecmd(state, console, &line)?;
            let flow = state.postcmd(console, flow)?;
            console.flush()?;
            if flow == Flow::Stop {
                return Ok(());
            }
        }
    }
}
