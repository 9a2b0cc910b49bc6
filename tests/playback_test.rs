mod common;

use common::*;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tunesift::Error;
use tunesift::media::{ScanOptions, file_sequence};
use tunesift::player::{PlaybackOptions, PlaybackSession, PlaybackStatus, remaining_timeout};
use tunesift::shell::{Flow, ReadOutcome};

fn started(
    library: &Library,
    engine: FakeEngine,
    options: PlaybackOptions,
) -> (PlaybackSession, EventLog, SharedOutput, tunesift::shell::Console) {
    let events = engine.events.clone();
    let mut session = library.session(engine, options);
    let (mut console, output) = console(Vec::new());
    assert_eq!(session.start(&mut console).unwrap(), Flow::Continue);
    (session, events, output, console)
}

#[test]
fn test_three_tracks_advance_without_input() {
    let library = Library::new(&["01.mp3", "02.mp3", "03.mp3"]);
    let music = library.music_dir();
    let scan = ScanOptions {
        extensions: vec!["mp3".to_string()],
        recursive: true,
    };
    let files = file_sequence(&[music], &scan, &[]).unwrap();

    // every track has ended by the time the idle timeout fires
    let engine = FakeEngine::new(0);
    let events = engine.events.clone();
    let mut session = PlaybackSession::new(
        files,
        Box::new(engine),
        library.tags.clone(),
        library.bookmarks(),
        PlaybackOptions::default(),
    );
    let (mut console, output) = console(vec![
        ReadOutcome::TimedOut,
        ReadOutcome::TimedOut,
        ReadOutcome::TimedOut,
    ]);

    session.run(&mut console).unwrap();

    assert_eq!(opened(&events), library.tracks);
    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(events.borrow().last(), Some(&Event::Released));

    let text = output.text();
    let first = text.find("playing: 01.mp3").unwrap();
    let second = text.find("playing: 02.mp3").unwrap();
    let third = text.find("playing: 03.mp3").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_banner_shows_tags_and_path() {
    let library = Library::new(&["song.mp3"]);
    let (_session, _events, output, _console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    let text = output.text();
    assert!(text.starts_with(&"-".repeat(78)));
    assert!(text.contains("playing: song.mp3\nTitle: Title 1\nArtist: The Band\n"));
    assert!(text.contains(&format!("Path: {}", library.tracks[0].display())));
}

#[test]
fn test_empty_file_list_is_an_error() {
    let library = Library::new(&[]);
    let mut session = library.session(FakeEngine::new(0), PlaybackOptions::default());
    let (mut console, output) = console(lines(&["quit"]));

    let result = session.run(&mut console);

    assert!(matches!(result, Err(Error::EmptyFileList)));
    assert!(!output.text().contains(" > "));
}

#[test]
fn test_idle_timeout_keeps_playing_track() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let mut engine = FakeEngine::new(10);
    engine.start_position = 0.5;
    let (mut session, events, _output, mut console) =
        started(&library, engine, PlaybackOptions::default());

    assert_eq!(session.timeout(), Some(remaining_timeout(TRACK_SECONDS, 0.0)));
    session.execute(&mut console, "").unwrap();

    assert_eq!(opened(&events).len(), 1);
    assert_eq!(session.timeout(), Some(Duration::from_secs_f64(60.0 + 0.1)));
}

#[test]
fn test_alias_skip_matches_command() {
    let library = Library::new(&["a.mp3"]);

    let mut positions = Vec::new();
    for line in ["skip 10", "s 10"] {
        let mut engine = FakeEngine::new(10);
        engine.start_position = 0.25;
        let (mut session, events, _output, mut console) =
            started(&library, engine, PlaybackOptions::default());
        session.execute(&mut console, line).unwrap();
        positions.push(seeks(&events));
    }

    assert_eq!(positions[0], positions[1]);
    assert_eq!(positions[0].len(), 1);
    assert!((positions[0][0] - (0.25 + 10.0 / TRACK_SECONDS)).abs() < 1e-9);
}

#[test]
fn test_bare_skip_uses_configured_seconds() {
    let library = Library::new(&["a.mp3"]);
    let options = PlaybackOptions {
        skip_seconds: 60.0,
        ..PlaybackOptions::default()
    };
    let (mut session, events, _output, mut console) =
        started(&library, FakeEngine::new(10), options);

    session.execute(&mut console, "skip").unwrap();

    assert_eq!(seeks(&events), vec![0.5]);
}

#[test]
fn test_skip_backwards_past_start_rewinds() {
    let library = Library::new(&["a.mp3"]);
    let mut engine = FakeEngine::new(10);
    engine.start_position = 0.1;
    let (mut session, events, _output, mut console) =
        started(&library, engine, PlaybackOptions::default());

    session.execute(&mut console, "skip -60").unwrap();

    assert_eq!(seeks(&events), vec![0.0]);
}

#[test]
fn test_skip_past_end_moves_to_next_track() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let (mut session, events, _output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    session.execute(&mut console, "skip 500").unwrap();

    assert!(seeks(&events).is_empty());
    assert!(events
        .borrow()
        .contains(&Event::Stopped(library.tracks[0].clone())));
    assert_eq!(opened(&events), library.tracks);
}

#[test]
fn test_skip_rejects_non_numbers() {
    let library = Library::new(&["a.mp3"]);
    let (mut session, events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    let flow = session.execute(&mut console, "skip soon").unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(seeks(&events).is_empty());
    assert!(output.text().contains("invalid skip amount 'soon'"));
}

#[test]
fn test_delete_removes_file_and_advances() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let (mut session, events, _output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    session.execute(&mut console, "d").unwrap();

    assert!(!library.tracks[0].exists());
    assert!(library.tracks[1].exists());
    assert_eq!(opened(&events), library.tracks);
}

#[test]
fn test_interactive_delete_declined_keeps_file() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let engine = FakeEngine::new(10);
    let events = engine.events.clone();
    let options = PlaybackOptions {
        interactive: true,
        ..PlaybackOptions::default()
    };
    let mut session = library.session(engine, options);
    let (mut console, output) = console(lines(&["n"]));
    session.start(&mut console).unwrap();

    session.execute(&mut console, "delete").unwrap();

    assert!(library.tracks[0].exists());
    assert_eq!(opened(&events), library.tracks);
    assert!(!output.text().contains("deleted"));
}

#[test]
fn test_interactive_delete_confirmed() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let options = PlaybackOptions {
        interactive: true,
        ..PlaybackOptions::default()
    };
    let mut session = library.session(FakeEngine::new(10), options);
    let (mut console, _output) = console(lines(&["y"]));
    session.start(&mut console).unwrap();

    session.execute(&mut console, "delete").unwrap();

    assert!(!library.tracks[0].exists());
    assert_eq!(
        session.current_track().map(|track| track.path().to_path_buf()),
        Some(library.tracks[1].clone())
    );
}

#[test]
fn test_failed_delete_is_reported_and_playback_moves_on() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let (mut session, events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());
    fs::remove_file(&library.tracks[0]).unwrap();

    let flow = session.execute(&mut console, "delete").unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(output.text().contains("failed to delete"));
    assert_eq!(opened(&events), library.tracks);
}

#[test]
fn test_bookmark_current_and_explicit() {
    let library = Library::new(&["a.mp3"]);
    let (mut session, _events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());
    let current = library.tracks[0].display().to_string();

    session.execute(&mut console, "bookmark").unwrap();
    session.execute(&mut console, "b").unwrap();
    session.execute(&mut console, "bookmark /elsewhere/x.mp3").unwrap();

    let stored = fs::read_to_string(library.bookmark_path()).unwrap();
    assert_eq!(stored.lines().count(), 2);
    assert!(stored.lines().any(|line| line == current));
    assert!(session.bookmarks().contains("/elsewhere/x.mp3"));
    assert!(output.text().contains("already bookmarked"));

    session.execute(&mut console, "remove").unwrap();
    session.execute(&mut console, "r /not/there.mp3").unwrap();
    assert!(!session.bookmarks().contains(&current));
    assert_eq!(session.bookmarks().len(), 1);
}

#[test]
fn test_move_copies_under_parent_folder() {
    let library = Library::new(&["a.mp3"]);
    let dest = library.temp_dir.path().join("keep");
    let options = PlaybackOptions {
        move_dir: Some(dest.clone()),
        ..PlaybackOptions::default()
    };
    let (mut session, _events, _output, mut console) =
        started(&library, FakeEngine::new(10), options);

    session.execute(&mut console, "m").unwrap();

    let copy: PathBuf = dest.join("music").join("a.mp3");
    assert!(copy.exists());
    assert!(library.tracks[0].exists());
}

#[test]
fn test_move_without_destination_does_nothing() {
    let library = Library::new(&["a.mp3"]);
    let (mut session, _events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    let flow = session.execute(&mut console, "move").unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(output.text().contains("no move destination"));
    let entries = fs::read_dir(library.temp_dir.path()).unwrap().count();
    // music/ and the bookmark file
    assert_eq!(entries, 2);
}

#[test]
fn test_quit_releases_player() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let (mut session, events, _output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    let flow = session.execute(&mut console, "q").unwrap();

    assert_eq!(flow, Flow::Stop);
    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(opened(&events).len(), 1);
    assert_eq!(events.borrow().last(), Some(&Event::Released));
}

#[test]
fn test_end_of_input_quits() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let engine = FakeEngine::new(100);
    let events = engine.events.clone();
    let mut session = library.session(engine, PlaybackOptions::default());
    let (mut console, _output) = console(Vec::new());

    session.run(&mut console).unwrap();

    assert_eq!(session.status(), PlaybackStatus::Stopped);
    assert_eq!(opened(&events).len(), 1);
}

#[test]
fn test_unplayable_file_is_skipped() {
    let library = Library::new(&["a.mp3", "b.mp3", "c.mp3"]);
    let mut engine = FakeEngine::new(10);
    engine.unplayable.insert(library.tracks[0].clone());
    let (session, events, output, _console) =
        started(&library, engine, PlaybackOptions::default());

    assert_eq!(opened(&events), vec![library.tracks[1].clone()]);
    assert!(output.text().contains("skipping"));
    assert_eq!(session.prompt(), "b > ");
}

#[test]
fn test_file_that_fails_to_start_is_skipped() {
    let library = Library::new(&["a.mp3", "b.mp3"]);
    let mut engine = FakeEngine::new(10);
    engine.unstartable.insert(library.tracks[0].clone());
    let (session, events, output, _console) =
        started(&library, engine, PlaybackOptions::default());

    assert_eq!(opened(&events), library.tracks);
    assert_eq!(
        events.borrow().last(),
        Some(&Event::Played(library.tracks[1].clone()))
    );
    assert!(output.text().contains("skipping"));
    assert!(!output.text().contains("playing: a.mp3"));
    assert_eq!(session.status(), PlaybackStatus::Playing);
    assert_eq!(session.prompt(), "b > ");
}

#[test]
fn test_nested_edit_keeps_changes_in_memory() {
    let library = Library::new(&["a.mp3"]);
    let mut session = library.session(FakeEngine::new(10), PlaybackOptions::default());
    let (mut console, output) = console(lines(&["edit title::Renamed", "view title", "quit"]));
    session.start(&mut console).unwrap();

    let flow = session.execute(&mut console, "e").unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(
        session
            .current_track()
            .and_then(|track| track.first_value("title")),
        Some("Renamed")
    );
    assert_eq!(library.tags.write_count(), 0);
    let text = output.text();
    assert!(text.contains("Metadata for: a.mp3"));
    assert!(text.contains("          title: Renamed"));
}

#[test]
fn test_unknown_command_is_reported() {
    let library = Library::new(&["a.mp3"]);
    let (mut session, _events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    let flow = session.execute(&mut console, "Quit").unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(output.text().contains("*** Unknown syntax: Quit"));
    assert_eq!(session.status(), PlaybackStatus::Playing);
}

#[test]
fn test_help_listing() {
    let library = Library::new(&["a.mp3"]);
    let (mut session, _events, output, mut console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    session.execute(&mut console, "h").unwrap();

    let text = output.text();
    assert!(text.contains("Commands (type help <topic>):"));
    assert!(text.contains("remove_bookmark"));
    assert!(text.contains("Reference/help guides (type help <topic>):"));
    assert!(text.contains("keys"));
    assert!(!text.contains("EOF"));
}

#[test]
fn test_command_completion() {
    let library = Library::new(&["a.mp3"]);
    let session = library.session(FakeEngine::new(10), PlaybackOptions::default());
    assert_eq!(session.complete_names("re"), vec!["remove_bookmark"]);

    let options = PlaybackOptions {
        show_aliases: true,
        ..PlaybackOptions::default()
    };
    let session = library.session(FakeEngine::new(10), options);
    assert_eq!(session.complete_names("re"), vec!["remove_bookmark", "remove"]);
}

#[test]
fn test_prompt_shows_track_name() {
    let library = Library::new(&["A Rather Long Track Name That Keeps Going.mp3"]);
    let (session, _events, _output, _console) =
        started(&library, FakeEngine::new(10), PlaybackOptions::default());

    assert_eq!(session.prompt(), "A Rather Long Track Name Th... > ");
}
