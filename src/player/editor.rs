//! Nested shell for inspecting and editing a track's tags.
//!
//! Edits go to a working buffer. `save` writes the buffer through to the
//! file, `quit` keeps it in memory only, `cancel` throws it away.

use crate::constants::RECOGNIZED_TAGS;
use crate::error::{Error, Result};
use crate::media::{TagMap, Track, format_field, format_fields, parse_field_edits};
use crate::shell::{Console, Dispatcher, EOF_COMMAND, Flow, HelpHeaders, Session};
use std::io::Write;

const PROMPT: &str = "Metadata: ";

/// State of one metadata session.
pub struct EditState {
    track: Track,
    buffer: TagMap,
    intro: String,
    prompt: String,
}

impl EditState {
    fn reset(&mut self) {
        self.buffer = self.track.tags().clone();
    }
}

impl Session for EditState {
    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn intro(&self) -> Option<String> {
        Some(self.intro.clone())
    }
}

fn intro_for(track: &Track) -> String {
    let summary = track.summary();
    if summary.is_empty() {
        format!("Metadata for: {}", track.file_name())
    } else {
        format!("Metadata for: {}\n{summary}", track.file_name())
    }
}

/// Prompt for a session nested under a shell showing `parent`.
fn nested_prompt(parent: &str) -> String {
    let parent: String = parent.trim().chars().take(30).collect();
    format!("{parent} -> {PROMPT}")
}

pub struct MetadataEditor {
    dispatcher: Dispatcher<EditState>,
    state: EditState,
}

impl MetadataEditor {
    pub fn new(track: Track, parent_prompt: Option<&str>) -> Self {
        let mut dispatcher = Dispatcher::new(HelpHeaders::standard());
        dispatcher
            .register_with_completion("view", view, VIEW_DOC, complete_field)
            .register_with_completion("edit", edit, EDIT_DOC, complete_field)
            .register("save", save, SAVE_DOC)
            .register("cancel", cancel, CANCEL_DOC)
            .register("quit", quit, QUIT_DOC)
            .register(EOF_COMMAND, cancel, "");
        for (alias, command) in [
            ("e", "edit"),
            ("q", "quit"),
            ("s", "save"),
            ("v", "view"),
            ("c", "cancel"),
        ] {
            if let Err(e) = dispatcher.alias(alias, Some(command)) {
                log::warn!("metadata alias {alias}: {e}");
            }
        }

        let state = EditState {
            buffer: track.tags().clone(),
            intro: intro_for(&track),
            prompt: parent_prompt.map_or_else(|| PROMPT.to_string(), nested_prompt),
            track,
        };
        Self { dispatcher, state }
    }

    /// Run the session until `cancel` or `quit`.
    pub fn run(&mut self, console: &mut Console) -> Result<()> {
        self.dispatcher.run(&mut self.state, console, None, None)
    }

    /// Execute one command line.
    pub fn onecmd(&mut self, console: &mut Console, line: &str) -> Result<Flow> {
        self.dispatcher.onecmd(&mut self.state, console, line)
    }

    /// Completion candidates for a partially typed line.
    pub fn complete(&self, line: &str) -> Vec<String> {
        self.dispatcher.complete(&self.state, line)
    }

    pub fn track(&self) -> &Track {
        &self.state.track
    }

    pub fn buffer(&self) -> &TagMap {
        &self.state.buffer
    }

    pub fn intro(&self) -> &str {
        &self.state.intro
    }

    pub fn prompt(&self) -> &str {
        &self.state.prompt
    }
}

const VIEW_DOC: &str = "
    View the working set of tags.

    Usage:
    view [<field1>,<field2>,...]

    Options:
    [field] -- comma separated fields to show.
               Without fields every non-empty tag is shown.

    Example:
    view artist,title,tracknumber
    ";

fn view(state: &mut EditState, console: &mut Console, arg: &str) -> Result<Flow> {
    let names: Vec<String> = arg
        .split([',', ' '])
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase)
        .collect();

    if names.is_empty() {
        let listing = format_fields(&state.buffer);
        if !listing.is_empty() {
            writeln!(console, "{listing}")?;
        }
        return Ok(Flow::Continue);
    }

    for name in names {
        match state.buffer.get(&name) {
            Some(values) => {
                let value = values.first().map(String::as_str).unwrap_or("");
                writeln!(console, "{}", format_field(&name, value))?;
            }
            None => writeln!(console, "{}", Error::UnknownField(name))?,
        }
    }
    Ok(Flow::Continue)
}

const EDIT_DOC: &str = "
    Edit tags of the current file. Changes stay in the working set until saved.

    Usage:
    edit [pairs | -c]

    Options:
    [pairs] -- field and value pairs:
               <field1>::<value>,, <field2>::<value>,, ...
    [-c]    -- reset the working set from the track.

    Example:
    edit artist::Some Band,, title::First Song,, tracknumber::1/12
    ";

fn edit(state: &mut EditState, console: &mut Console, arg: &str) -> Result<Flow> {
    if arg.trim() == "-c" {
        state.reset();
        writeln!(console, "reset metadata")?;
        return Ok(Flow::Continue);
    }

    let edits = parse_field_edits(arg);
    for error in &edits.errors {
        writeln!(console, "{error}")?;
    }
    if edits.fields.is_empty() && edits.errors.is_empty() {
        writeln!(console, "nothing to edit (see 'help edit')")?;
    }
    state.buffer.extend(edits.fields);
    Ok(Flow::Continue)
}

const SAVE_DOC: &str = "
    Write the working set of tags to the current file.

    Usage:
    save
    ";

fn save(state: &mut EditState, console: &mut Console, _arg: &str) -> Result<Flow> {
    match state.track.save(&state.buffer) {
        Ok(()) => {
            log::info!("saved tags for {}", state.track.path().display());
            writeln!(console, "saved {}", state.track.file_name())?;
        }
        Err(e @ (Error::Tags(_) | Error::Io(_))) => {
            log::error!("saving tags for {}: {e}", state.track.path().display());
            writeln!(console, "failed to save: {e}")?;
        }
        Err(e) => return Err(e),
    }
    Ok(Flow::Continue)
}

const CANCEL_DOC: &str = "
    Leave without keeping changes. The track is left untouched.

    Usage:
    cancel
    ";

fn cancel(state: &mut EditState, _console: &mut Console, _arg: &str) -> Result<Flow> {
    state.reset();
    Ok(Flow::Stop)
}

const QUIT_DOC: &str = "
    Leave, keeping changes on the track in memory. Nothing is written to the file.

    Usage:
    quit [-c]

    Options:
    [-c] -- reset the working set from the track instead, and stay.
    ";

fn quit(state: &mut EditState, console: &mut Console, arg: &str) -> Result<Flow> {
    if arg.split_whitespace().any(|word| word == "-c") {
        state.reset();
        writeln!(console, "reset metadata")?;
        return Ok(Flow::Continue);
    }
    state.track.update(&state.buffer);
    state.intro = intro_for(&state.track);
    Ok(Flow::Stop)
}

/// Fields on the track first; recognized field names when none match.
fn complete_field(state: &EditState, text: &str, _line: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let present: Vec<String> = state
        .track
        .tags()
        .keys()
        .filter(|field| field.starts_with(&text))
        .cloned()
        .collect();
    if !present.is_empty() {
        return present;
    }
    RECOGNIZED_TAGS
        .iter()
        .filter(|field| field.starts_with(&text))
        .map(|field| field.to_string())
        .collect()
}
