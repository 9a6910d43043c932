use std::time::Duration;

use super::RodioSink;
use super::source::{Location, fetch, locate};
use super::thread::coalesce;
use super::types::{AudioCmd, AudioError, Tagged};
use crate::player::{MediaSink, SinkEvent};

#[test]
fn locate_classifies_references() {
    assert_eq!(
        locate("https://cdn.example.com/a.mp3").unwrap(),
        Location::Remote("https://cdn.example.com/a.mp3".into())
    );
    assert_eq!(
        locate("HTTP://cdn.example.com/a.mp3").unwrap(),
        Location::Remote("HTTP://cdn.example.com/a.mp3".into())
    );
    assert_eq!(
        locate("file:///music/a.flac").unwrap(),
        Location::File("/music/a.flac".into())
    );
    assert_eq!(locate(" songs/b.ogg ").unwrap(), Location::File("songs/b.ogg".into()));
    assert!(matches!(locate("ftp://host/a.mp3"), Err(AudioError::Unsupported(_))));
    assert!(matches!(locate("  "), Err(AudioError::Unsupported(_))));
}

#[test]
fn fetch_reads_local_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.bin");
    std::fs::write(&path, b"not really audio").unwrap();

    let bytes = fetch(path.to_str().unwrap()).unwrap();
    assert_eq!(&bytes[..], b"not really audio");

    let missing = dir.path().join("missing.mp3");
    assert!(matches!(
        fetch(missing.to_str().unwrap()),
        Err(AudioError::Read { .. })
    ));
}

#[test]
fn load_sends_a_new_generation_and_resets_cached_times() {
    let (mut sink, cmds, events) = RodioSink::detached();

    sink.load("a.mp3");
    events
        .send(Tagged {
            generation: 1,
            event: SinkEvent::DurationKnown(Duration::from_secs(10)),
        })
        .unwrap();
    assert_eq!(sink.poll_event(), Some(SinkEvent::DurationKnown(Duration::from_secs(10))));
    assert_eq!(sink.duration(), Some(Duration::from_secs(10)));

    sink.load("b.mp3");
    assert_eq!(sink.duration(), None);
    assert_eq!(sink.current_time(), Duration::ZERO);

    let loads: Vec<(String, u64)> = cmds
        .try_iter()
        .filter_map(|c| match c {
            AudioCmd::Load { source, generation } => Some((source, generation)),
            _ => None,
        })
        .collect();
    assert_eq!(loads, vec![("a.mp3".into(), 1), ("b.mp3".into(), 2)]);
}

#[test]
fn stale_events_from_an_earlier_load_are_dropped() {
    let (mut sink, _cmds, events) = RodioSink::detached();
    sink.load("a.mp3");
    sink.load("b.mp3");

    for (generation, event) in [
        (1, SinkEvent::Finished),
        (1, SinkEvent::TimeUpdated(Duration::from_secs(99))),
        (2, SinkEvent::TimeUpdated(Duration::from_secs(3))),
    ] {
        events.send(Tagged { generation, event }).unwrap();
    }

    assert_eq!(sink.poll_event(), Some(SinkEvent::TimeUpdated(Duration::from_secs(3))));
    assert_eq!(sink.current_time(), Duration::from_secs(3));
    assert_eq!(sink.poll_event(), None);
}

#[test]
fn seek_updates_the_cached_time_immediately() {
    let (mut sink, cmds, _events) = RodioSink::detached();
    sink.load("a.mp3");
    sink.set_current_time(Duration::from_secs(42));

    assert_eq!(sink.current_time(), Duration::from_secs(42));
    assert!(cmds
        .try_iter()
        .any(|c| matches!(c, AudioCmd::Seek(d) if d == Duration::from_secs(42))));
}

#[test]
fn commands_after_the_thread_is_gone_do_not_panic() {
    let (mut sink, cmds, _events) = RodioSink::detached();
    drop(cmds);
    sink.load("a.mp3");
    sink.play();
    sink.quit_softly(Duration::ZERO);
}

fn load(generation: u64) -> AudioCmd {
    AudioCmd::Load {
        source: format!("https://cdn.example.com/{generation}.mp3"),
        generation,
    }
}

#[test]
fn rapid_loads_collapse_to_the_newest() {
    let batch = vec![
        load(1),
        AudioCmd::Play,
        load(2),
        AudioCmd::Play,
        AudioCmd::SetLoop(true),
        load(3),
        AudioCmd::Play,
        AudioCmd::Seek(Duration::from_secs(4)),
    ];
    assert_eq!(
        coalesce(batch),
        vec![
            AudioCmd::SetLoop(true),
            load(3),
            AudioCmd::Play,
            AudioCmd::Seek(Duration::from_secs(4)),
        ]
    );
}

#[test]
fn quit_jumps_ahead_of_queued_work() {
    let batch = vec![
        load(1),
        AudioCmd::Play,
        load(2),
        AudioCmd::Quit { fade_out_ms: 300 },
        load(3),
    ];
    assert_eq!(coalesce(batch), vec![AudioCmd::Quit { fade_out_ms: 300 }]);
}

#[test]
fn batches_without_loads_pass_through() {
    let batch = vec![AudioCmd::Pause, AudioCmd::Seek(Duration::from_secs(1)), AudioCmd::Play];
    assert_eq!(coalesce(batch.clone()), batch);
    assert!(coalesce(Vec::new()).is_empty());
}
