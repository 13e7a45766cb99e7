//! Tick-stamped text commands exchanged with the game server.
//!
//! Wire grammar, one command per line: `<tick> <code> [args...]`.
//!
//! | command   | code | args          |
//! |-----------|------|---------------|
//! | point     | `L`  | `x y`         |
//! | context   | `R`  | `x y`         |
//! | box       | `B`  | `x0 y0 x1 y1` |
//! | scrub     | `S`  | `percent`     |
//! | faster    | `F`  |               |
//! | slower    | `W`  |               |
//! | cycle     | `C`  |               |
//! | pause     | `P`  |               |
//! | hotkey    | key  |               |
//!
//! A hotkey whose character collides with a control code decodes as the control.
pub mod gate;

use std::fmt;

use crate::coords::GridCell;
use crate::error::CommandError;
use crate::models::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Primary click on a cell.
    Point(GridCell),
    /// Secondary click on a cell.
    Context(GridCell),
    /// Box selection from the press cell to the release cell.
    Box(GridCell, GridCell),
    Hotkey(char),
    /// Replay seek, in percent.
    Scrub(u32),
    Faster,
    Slower,
    Cycle,
    Pause,
}

impl Command {
    pub fn encode(&self, tick: Tick) -> String {
        format!("{} {}", tick, self)
    }

    /// Decode a line produced by [`Command::encode`].
    ///
    /// Coordinates are accepted as decimals and rounded to the nearest cell.
    pub fn parse(line: &str) -> Result<(Tick, Command), CommandError> {
        let mut tokens = line.split_whitespace();
        let tick_tok = tokens.next().ok_or(CommandError::Empty)?;
        let tick = tick_tok
            .parse::<Tick>()
            .map_err(|_| CommandError::BadTick(tick_tok.to_string()))?;
        let code_tok = tokens.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = tokens.collect();

        let mut chars = code_tok.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(CommandError::UnknownCode(code_tok.to_string())),
        };
        let expected = match code {
            'L' | 'R' => 2,
            'B' => 4,
            'S' => 1,
            _ => 0,
        };
        if args.len() != expected {
            return Err(CommandError::Arity { code, expected, got: args.len() });
        }

        let cmd = match code {
            'L' => Command::Point(parse_cell(args[0], args[1])?),
            'R' => Command::Context(parse_cell(args[0], args[1])?),
            'B' => Command::Box(parse_cell(args[0], args[1])?, parse_cell(args[2], args[3])?),
            'S' => {
                let pct = args[0]
                    .parse::<f64>()
                    .map_err(|_| CommandError::BadArgument(args[0].to_string()))?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(CommandError::BadArgument(args[0].to_string()));
                }
                Command::Scrub(pct.round() as u32)
            }
            'F' => Command::Faster,
            'W' => Command::Slower,
            'C' => Command::Cycle,
            'P' => Command::Pause,
            c if c.is_ascii_graphic() => Command::Hotkey(c),
            _ => return Err(CommandError::UnknownCode(code_tok.to_string())),
        };
        Ok((tick, cmd))
    }
}

fn parse_coord(tok: &str) -> Result<i32, CommandError> {
    tok.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i32)
        .ok_or_else(|| CommandError::BadArgument(tok.to_string()))
}

fn parse_cell(x: &str, y: &str) -> Result<GridCell, CommandError> {
    Ok(GridCell::new(parse_coord(x)?, parse_coord(y)?))
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Point(c) => write!(f, "L {c}"),
            Command::Context(c) => write!(f, "R {c}"),
            Command::Box(a, b) => write!(f, "B {a} {b}"),
            Command::Hotkey(k) => write!(f, "{k}"),
            Command::Scrub(p) => write!(f, "S {p}"),
            Command::Faster => f.write_str("F"),
            Command::Slower => f.write_str("W"),
            Command::Cycle => f.write_str("C"),
            Command::Pause => f.write_str("P"),
        }
    }
}

/// Where encoded commands go. Sending never blocks and nothing is acknowledged.
pub trait CommandSink {
    fn send(&mut self, line: String);
}

impl CommandSink for Vec<String> {
    fn send(&mut self, line: String) {
        self.push(line);
    }
}

/// Encode `cmd` at `tick` and hand it to `sink`.
pub fn emit(sink: &mut dyn CommandSink, tick: Tick, cmd: Command) {
    let line = cmd.encode(tick);
    tracing::trace!(%line, "command");
    sink.send(line);
}
