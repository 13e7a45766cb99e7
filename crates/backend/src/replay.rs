use std::sync::Arc;
use std::time::Duration;

use minirts_shared::command::Command;
use minirts_shared::controls::SpeedControl;
use minirts_shared::models::{PlayerId, Tick};

use crate::assets::Replay;

/// Playback position of one connection. Every socket gets its own.
pub struct ReplayCursor {
    replay: Arc<Replay>,
    next: usize,
    speed: SpeedControl,
    paused: bool,
    players: Vec<PlayerId>,
    viewer: Option<usize>,
}

impl ReplayCursor {
    pub fn new(replay: Arc<Replay>, min_speed: i32, max_speed: i32) -> Self {
        let players = replay.player_ids();
        ReplayCursor {
            replay,
            next: 0,
            speed: SpeedControl::new(min_speed, max_speed),
            paused: false,
            players,
            viewer: None,
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed.speed()
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn position(&self) -> usize {
        self.next
    }

    pub fn viewer(&self) -> Option<PlayerId> {
        self.viewer.map(|i| self.players[i])
    }

    /// Wait between frames at the current speed.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.speed.fps().max(1) as f64)
    }

    /// Next frame as a JSON line, or `None` while paused or past the end.
    pub fn advance(&mut self) -> Option<String> {
        if self.paused {
            return None;
        }
        let frame = self.replay.frames.get(self.next)?;
        self.next += 1;

        let mut frame = frame.clone();
        frame.replay_length = Some(self.replay.length());
        if let Some(id) = self.viewer() {
            frame.player_id = Some(id);
        }
        match serde_json::to_string(&frame) {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::error!(tick = frame.tick, %e, "frame serialization failed");
                None
            }
        }
    }

    /// Apply one client command line. Malformed lines are logged and dropped.
    pub fn apply_line(&mut self, line: &str) {
        match Command::parse(line) {
            Ok((tick, cmd)) => self.apply(tick, cmd),
            Err(e) => tracing::warn!(line, %e, "bad command"),
        }
    }

    pub fn apply(&mut self, tick: Tick, cmd: Command) {
        match cmd {
            Command::Faster => {
                self.speed.faster();
                tracing::info!(speed = self.speed(), fps = self.speed.fps(), "speed up");
            }
            Command::Slower => {
                self.speed.slower();
                tracing::info!(speed = self.speed(), fps = self.speed.fps(), "slow down");
            }
            Command::Pause => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "pause toggled");
            }
            Command::Scrub(percent) => {
                self.seek(percent);
                tracing::info!(percent, frame = self.next, "seek");
            }
            Command::Cycle => {
                self.cycle();
                tracing::info!(viewer = ?self.viewer(), "viewing player changed");
            }
            other => {
                tracing::debug!(tick, cmd = %other, "unit command ignored during replay");
            }
        }
    }

    /// Jump to the first frame at or after `percent` of the replay length.
    fn seek(&mut self, percent: u32) {
        let target = self.replay.length() * percent.min(100) as Tick / 100;
        self.next = self
            .replay
            .frames
            .iter()
            .position(|f| f.tick >= target)
            .unwrap_or(self.replay.frames.len());
    }

    /// Observer, then each player in turn, then back to the observer.
    fn cycle(&mut self) {
        self.viewer = match self.viewer {
            None if !self.players.is_empty() => Some(0),
            Some(i) if i + 1 < self.players.len() => Some(i + 1),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use minirts_shared::models::Snapshot;

    fn replay(ticks: &[Tick]) -> Arc<Replay> {
        let text: Vec<String> = ticks
            .iter()
            .map(|t| {
                format!(
                    r#"{{"tick":{},"rts_map":{{"width":1,"height":1,"slots":[0]}},"players":[{{"player_id":0,"resource":5}},{{"player_id":1,"resource":5}}]}}"#,
                    t
                )
            })
            .collect();
        Arc::new(Replay::parse(&text.join("\n"), Path::new("t.jsonl")).unwrap())
    }

    fn decode(line: &str) -> Snapshot {
        Snapshot::from_json(line).unwrap()
    }

    #[test]
    fn test_advance_stamps_replay_length() {
        let mut cur = ReplayCursor::new(replay(&[0, 1, 2, 3]), -10, 5);
        let first = decode(&cur.advance().unwrap());
        assert_eq!(first.tick, 0);
        assert_eq!(first.replay_length, Some(3));
        assert_eq!(first.player_id, None);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut cur = ReplayCursor::new(replay(&[0, 1]), -10, 5);
        assert!(cur.advance().is_some());
        assert!(cur.advance().is_some());
        assert!(cur.advance().is_none());
        assert_eq!(cur.position(), 2);
    }

    #[test]
    fn test_pause_holds_position() {
        let mut cur = ReplayCursor::new(replay(&[0, 1, 2]), -10, 5);
        cur.apply_line("0 P");
        assert!(cur.paused());
        assert!(cur.advance().is_none());
        cur.apply_line("0 P");
        assert_eq!(decode(&cur.advance().unwrap()).tick, 0);
    }

    #[test]
    fn test_speed_commands_change_period() {
        let mut cur = ReplayCursor::new(replay(&[0]), -10, 5);
        assert_eq!(cur.period(), Duration::from_secs_f64(1.0 / 50.0));
        cur.apply_line("4 F");
        assert_eq!(cur.speed(), 1);
        // floor(50 * 1.3) = 65
        assert_eq!(cur.period(), Duration::from_secs_f64(1.0 / 65.0));
        cur.apply_line("4 W");
        cur.apply_line("4 W");
        assert_eq!(cur.speed(), -1);
    }

    #[test]
    fn test_speed_is_bounded() {
        let mut cur = ReplayCursor::new(replay(&[0]), -1, 1);
        for _ in 0..5 {
            cur.apply(0, Command::Faster);
        }
        assert_eq!(cur.speed(), 1);
    }

    #[test]
    fn test_seek_to_percent() {
        let mut cur = ReplayCursor::new(replay(&[0, 10, 20, 30, 40]), -10, 5);
        cur.apply_line("0 S 50");
        assert_eq!(decode(&cur.advance().unwrap()).tick, 20);
        cur.apply_line("0 S 0");
        assert_eq!(decode(&cur.advance().unwrap()).tick, 0);
        cur.apply_line("0 S 100");
        assert_eq!(decode(&cur.advance().unwrap()).tick, 40);
    }

    #[test]
    fn test_cycle_visits_every_player_then_observer() {
        let mut cur = ReplayCursor::new(replay(&[0]), -10, 5);
        cur.apply_line("0 C");
        assert_eq!(cur.viewer(), Some(0));
        cur.apply_line("0 C");
        assert_eq!(cur.viewer(), Some(1));
        cur.apply_line("0 C");
        assert_eq!(cur.viewer(), None);
    }

    #[test]
    fn test_cycle_stamps_player_id() {
        let mut cur = ReplayCursor::new(replay(&[0, 1]), -10, 5);
        cur.apply_line("0 C");
        cur.apply_line("0 C");
        assert_eq!(decode(&cur.advance().unwrap()).player_id, Some(1));
    }

    #[test]
    fn test_unit_commands_do_not_move_playback() {
        let mut cur = ReplayCursor::new(replay(&[0, 1]), -10, 5);
        cur.apply_line("0 L 3 4");
        cur.apply_line("0 B 0 0 5 5");
        cur.apply_line("0 a");
        cur.apply_line("garbage");
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.speed(), 0);
        assert!(!cur.paused());
    }
}
