//! Replay speed and scrub widgets, expressed as commands.
use crate::command::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Speed slider moved to an absolute position.
    SetSpeed(i32),
    Faster,
    Slower,
    Cycle,
    Pause,
    /// Scrub slider moved, in percent.
    Scrub(u32),
}

/// Frames per second the server plays at for `speed`.
pub fn fps_for(speed: i32) -> u32 {
    (50.0 * 1.3f64.powi(speed)).floor() as u32
}

/// Replay speed level bounded to `[min, max]`. The viewer keeps a mirror of the server's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedControl {
    speed: i32,
    min: i32,
    max: i32,
}

impl SpeedControl {
    pub fn new(min: i32, max: i32) -> Self {
        SpeedControl { speed: 0, min, max }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn fps(&self) -> u32 {
        fps_for(self.speed)
    }

    pub fn range(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// One step command per level between the current and the clamped target.
    pub fn set(&mut self, target: i32) -> Vec<Command> {
        let target = target.clamp(self.min, self.max);
        let delta = target - self.speed;
        self.speed = target;
        let step = if delta > 0 { Command::Faster } else { Command::Slower };
        vec![step; delta.unsigned_abs() as usize]
    }

    pub fn faster(&mut self) -> Option<Command> {
        if self.speed >= self.max {
            return None;
        }
        self.speed += 1;
        Some(Command::Faster)
    }

    pub fn slower(&mut self) -> Option<Command> {
        if self.speed <= self.min {
            return None;
        }
        self.speed -= 1;
        Some(Command::Slower)
    }
}
