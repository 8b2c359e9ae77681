//! Offline replay of recorded frames
//!
//! Reads a JSON-lines file of frame results, runs them through the same
//! pipeline the server uses and writes every emitted message, one per line.

use anyhow::{anyhow, Result};
use handcast_core::{Broadcaster, FrameDispatcher, FrameResult, Message, WireFormat};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::Config;
use crate::pipeline::{self, Pipeline};

/// Broadcaster writing encoded messages as lines
pub struct LineBroadcaster<W> {
    out: Mutex<W>,
    format: WireFormat,
}

impl<W: Write + Send> LineBroadcaster<W> {
    pub fn new(out: W, format: WireFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Broadcaster for LineBroadcaster<W> {
    fn broadcast(&self, message: &Message) {
        let text = match message.encode(self.format) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to encode message");
                return;
            }
        };
        if let Ok(mut out) = self.out.lock() {
            if let Err(e) = writeln!(out, "{}", text) {
                warn!(error = %e, "Failed to write message");
            }
        }
    }
}

/// Result of a replay run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Frames fed to the pipeline
    pub frames: usize,
    /// Lines that did not parse as a frame
    pub malformed: usize,
    /// Hand observations dropped for missing landmarks
    pub hands_skipped: u64,
}

/// Replay a frame file, writing messages to `out`
pub async fn run<W>(path: &Path, config: &Config, out: W) -> Result<(ReplaySummary, W)>
where
    W: Write + Send + 'static,
{
    let content = tokio::fs::read_to_string(path).await?;
    info!(path = %path.display(), "Replaying frames");

    let sink = Arc::new(LineBroadcaster::new(out, config.server.wire_format));
    let dispatcher = FrameDispatcher::new(config.classifier(), config.dispatch_config());
    let Pipeline {
        frames: sender,
        stats,
        task,
        ..
    } = pipeline::spawn(dispatcher, sink.clone(), config.server.frame_queue);

    let mut summary = ReplaySummary::default();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match FrameResult::from_json(line) {
            Ok(frame) => {
                sender.send(frame).await?;
                summary.frames += 1;
            }
            Err(e) => {
                warn!(line = number + 1, error = %e, "Skipping malformed frame");
                summary.malformed += 1;
            }
        }
    }

    // Closing the queue lets the pipeline drain and stop
    drop(sender);
    task.await?;
    summary.hands_skipped = stats.hands_skipped();

    let sink = Arc::try_unwrap(sink).map_err(|_| anyhow!("Replay output still in use"))?;
    Ok((summary, sink.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_line(handedness: &str, spread: f32, count: usize) -> String {
        // World tips `spread` meters from the origin, knuckles at the origin
        let world: Vec<String> = (0..count)
            .map(|i| {
                let x = if [4, 8, 12, 16, 20].contains(&i) { spread } else { 0.0 };
                format!(r#"{{"x": {}, "y": 0.0}}"#, x)
            })
            .collect();
        let image = vec![r#"{"x": 0.25, "y": 0.75}"#; count].join(",");
        format!(
            r#"{{"timestamp_ms": 0, "hands": [{{"handedness": "{}", "landmarks": [{}], "world_landmarks": [{}]}}]}}"#,
            handedness,
            image,
            world.join(",")
        )
    }

    fn write_frames(lines: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_replay_emits_edges_once() {
        let mut config = Config::default();
        config.pipeline.stream_positions = false;

        // Reported "Left" is the right hand: bent, bent again, then open
        let file = write_frames(&[
            hand_line("Left", 0.0, 21),
            hand_line("Left", 0.0, 21),
            String::new(),
            hand_line("Left", 0.2, 21),
        ]);

        let (summary, out) = run(file.path(), &config, Vec::new()).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.malformed, 0);
        assert_eq!(
            lines,
            vec![
                "1! 1? 0? 0", "1! 1? 1? 0", "1! 1? 2? 0", "1! 1? 3? 0", "1! 1? 4? 0",
                "1! 1? 0? 1", "1! 1? 1? 1", "1! 1? 2? 1", "1! 1? 3? 1", "1! 1? 4? 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_replay_skips_bad_input() {
        let config = Config::default();
        let file = write_frames(&["not json".to_string(), hand_line("Right", 0.0, 20)]);

        let (summary, out) = run(file.path(), &config, Vec::new()).await.unwrap();

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.hands_skipped, 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_replay_streams_positions() {
        let config = Config::default();
        let file = write_frames(&[hand_line("Right", 0.2, 21)]);

        let (_, out) = run(file.path(), &config, Vec::new()).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), "0! 0? [0.25, 0.25, 0.25, 0.25, 0.25] ? [0.75, 0.75, 0.75, 0.75, 0.75]");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(&dir.path().join("absent.jsonl"), &Config::default(), Vec::new()).await;
        assert!(result.is_err());
    }
}
