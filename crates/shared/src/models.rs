use std::fmt;

use serde::{Deserialize, Serialize};

pub type UnitId = i32;
pub type PlayerId = i32;
pub type Tick = u64;

/// Terrain index the server writes for cells outside current vision.
pub const TERRAIN_FOG: usize = 2;

/// NORMAL, IMPASSABLE, FOG.
pub const TERRAIN_KINDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub fn new(x: f64, y: f64) -> Self {
        PointF { x, y }
    }
}

/// One tick of authoritative game state. Replaces the previous snapshot wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: Tick,
    pub rts_map: MapGrid,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_units: Option<Vec<UnitId>>,
    #[serde(default)]
    pub gamedef: GameDef,
    #[serde(default)]
    pub spectator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_length: Option<Tick>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Units previously seen but not currently visible. Empty in spectator mode.
    pub fn remembered_units(&self) -> &[Unit] {
        if self.spectator {
            return &[];
        }
        self.rts_map.units.as_deref().unwrap_or(&[])
    }

    /// Replay progress in percent, when the server reports a replay length.
    pub fn replay_progress(&self) -> Option<u32> {
        match self.replay_length {
            Some(len) if len > 0 => Some((100 * self.tick.min(len) / len) as u32),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapGrid {
    pub width: usize,
    pub height: usize,
    /// Terrain index per cell, row-major.
    #[serde(default)]
    pub slots: Vec<usize>,
    /// Cells outside current vision that were observed before. Player mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_before: Option<Vec<bool>>,
    /// Units remembered on previously seen cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<Unit>>,
}

impl MapGrid {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn terrain_at(&self, idx: usize) -> usize {
        self.slots.get(idx).copied().unwrap_or(TERRAIN_FOG)
    }

    pub fn was_seen_before(&self, idx: usize) -> bool {
        self.seen_before
            .as_ref()
            .and_then(|s| s.get(idx).copied())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub player_id: PlayerId,
    pub unit_type: usize,
    pub p: PointF,
    pub last_p: PointF,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<UnitCommand>,
    #[serde(default)]
    pub cds: Vec<Cooldown>,
}

impl Unit {
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp as f64 / self.max_hp as f64
    }

    /// Short on-map label for a non-idle command, e.g. `A0` or `G2`.
    pub fn status_label(&self) -> Option<String> {
        let cmd = self.cmd.as_ref()?;
        let first = cmd.cmd.chars().next()?;
        if first == 'I' {
            return None;
        }
        Some(format!("{}{}", first, cmd.state))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCommand {
    pub cmd: String,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub state: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub cd: i64,
    pub last: i64,
    pub name: String,
}

impl Cooldown {
    /// Elapsed progress `(current, ratio)` at `tick`, or `None` for a zero-length cooldown.
    pub fn progress(&self, tick: Tick) -> Option<(i64, f64)> {
        if self.cd <= 0 {
            return None;
        }
        let curr = (tick as i64 - self.last).clamp(0, self.cd);
        Some((curr, curr as f64 / self.cd as f64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulletState {
    BulletReady,
    BulletExplode1,
    BulletExplode2,
    BulletExplode3,
    BulletDone,
}

impl BulletState {
    pub fn as_key(&self) -> &'static str {
        match self {
            BulletState::BulletReady => "BULLET_READY",
            BulletState::BulletExplode1 => "BULLET_EXPLODE1",
            BulletState::BulletExplode2 => "BULLET_EXPLODE2",
            BulletState::BulletExplode3 => "BULLET_EXPLODE3",
            BulletState::BulletDone => "BULLET_DONE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub p: PointF,
    pub state: BulletState,
    #[serde(default)]
    pub id_from: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub resource: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameDef {
    #[serde(default)]
    pub units: Vec<UnitDef>,
}

impl GameDef {
    pub fn unit_def(&self, unit_type: usize) -> Option<&UnitDef> {
        self.units.get(unit_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitDef {
    #[serde(default)]
    pub allowed_cmds: Vec<AllowedCommand>,
    #[serde(default)]
    pub build_skills: Vec<BuildSkill>,
}

/// Engine `CmdType` codes of the unit commands.
pub const CMD_ATTACK: i32 = 200;
pub const CMD_MOVE: i32 = 201;
pub const CMD_BUILD: i32 = 202;
pub const CMD_GATHER: i32 = 203;

/// Command type in `allowed_cmds`: the engine's numeric code or its registered name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandId {
    Code(i32),
    Name(String),
}

impl CommandId {
    /// Registered name, when known.
    pub fn name(&self) -> Option<&str> {
        match self {
            CommandId::Name(n) => Some(n),
            CommandId::Code(CMD_ATTACK) => Some("ATTACK"),
            CommandId::Code(CMD_MOVE) => Some("MOVE"),
            CommandId::Code(CMD_BUILD) => Some("BUILD"),
            CommandId::Code(CMD_GATHER) => Some("GATHER"),
            CommandId::Code(_) => None,
        }
    }
}

impl From<&str> for CommandId {
    fn from(name: &str) -> Self {
        CommandId::Name(name.to_string())
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self) {
            (Some(n), _) => f.write_str(n),
            (None, CommandId::Code(c)) => write!(f, "CMD_{}", c),
            (None, CommandId::Name(n)) => f.write_str(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedCommand {
    pub id: CommandId,
    /// Explicit key binding; when absent the command class default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSkill {
    pub unit_type: usize,
    pub hotkey: char,
    #[serde(default)]
    pub price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_JSON: &str = r#"{
        "tick": 42,
        "rts_map": { "width": 2, "height": 1, "slots": [0, 2] },
        "players": [{ "player_id": 0, "resource": 150 }],
        "units": [{
            "id": 7, "player_id": 0, "unit_type": 1,
            "p": { "x": 1.0, "y": 0.0 }, "last_p": { "x": 0.5, "y": 0.0 },
            "hp": 30, "max_hp": 50,
            "cmd": { "cmd": "GATHER", "id": 7, "state": 2 },
            "cds": [{ "cd": 40, "last": 20, "name": "CD_GATHER" }]
        }],
        "bullets": [{ "p": { "x": 0.2, "y": 0.3 }, "state": "BULLET_EXPLODE2", "id_from": 7 }],
        "gamedef": { "units": [{}, { "allowed_cmds": [{ "id": "GATHER" }], "build_skills": [{ "unit_type": 5, "hotkey": "c", "price": 500 }] }] },
        "spectator": false
    }"#;

    #[test]
    fn test_parse_server_snapshot() {
        let s = Snapshot::from_json(SNAPSHOT_JSON).unwrap();
        assert_eq!(s.tick, 42);
        assert_eq!(s.rts_map.slots, vec![0, 2]);
        assert_eq!(s.units[0].status_label().as_deref(), Some("G2"));
        assert_eq!(s.bullets[0].state, BulletState::BulletExplode2);
        assert_eq!(s.gamedef.units[1].build_skills[0].hotkey, 'c');
        assert!(s.selected_units.is_none());
        assert!(s.replay_progress().is_none());
        assert!(s.remembered_units().is_empty());
    }

    #[test]
    fn test_parse_numeric_command_ids() {
        let json = r#"{
            "tick": 1,
            "rts_map": { "width": 1, "height": 1, "slots": [0] },
            "gamedef": { "units": [{ "allowed_cmds": [{ "id": 201 }, { "id": 200 }, { "id": 203 }, { "id": 999 }] }] }
        }"#;
        let s = Snapshot::from_json(json).unwrap();
        let ids: Vec<String> = s.gamedef.units[0].allowed_cmds.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["MOVE", "ATTACK", "GATHER", "CMD_999"]);
        assert_eq!(s.gamedef.units[0].allowed_cmds[0].id, CommandId::Code(CMD_MOVE));
    }

    #[test]
    fn test_named_command_ids_still_parse() {
        let s = Snapshot::from_json(SNAPSHOT_JSON).unwrap();
        assert_eq!(s.gamedef.units[1].allowed_cmds[0].id, CommandId::from("GATHER"));
        assert_eq!(s.gamedef.units[1].allowed_cmds[0].id.name(), Some("GATHER"));
    }

    #[test]
    fn test_idle_command_has_no_label() {
        let mut s = Snapshot::from_json(SNAPSHOT_JSON).unwrap();
        s.units[0].cmd = Some(UnitCommand { cmd: "I".into(), id: 7, state: 0 });
        assert!(s.units[0].status_label().is_none());
        s.units[0].cmd = None;
        assert!(s.units[0].status_label().is_none());
    }

    #[test]
    fn test_cooldown_progress_clamps() {
        let cd = Cooldown { cd: 40, last: 20, name: "CD_ATTACK".into() };
        let (curr, ratio) = cd.progress(30).unwrap();
        assert_eq!(curr, 10);
        assert!((ratio - 0.25).abs() < 1e-9);
        assert_eq!(cd.progress(500).unwrap().0, 40);
        let idle = Cooldown { cd: 0, last: 0, name: "CD_MOVE".into() };
        assert!(idle.progress(10).is_none());
    }

    #[test]
    fn test_remembered_units_hidden_for_spectator() {
        let mut s = Snapshot::from_json(SNAPSHOT_JSON).unwrap();
        s.rts_map.units = Some(s.units.clone());
        assert_eq!(s.remembered_units().len(), 1);
        s.spectator = true;
        assert!(s.remembered_units().is_empty());
    }

    #[test]
    fn test_replay_progress_percent() {
        let s = Snapshot { tick: 250, replay_length: Some(1000), ..Default::default() };
        assert_eq!(s.replay_progress(), Some(25));
    }

    #[test]
    fn test_map_bounds() {
        let m = MapGrid { width: 20, height: 10, ..Default::default() };
        assert!(m.contains(0, 0));
        assert!(m.contains(19, 9));
        assert!(!m.contains(20, 0));
        assert!(!m.contains(0, 10));
        assert!(!m.contains(-1, 3));
    }
}
