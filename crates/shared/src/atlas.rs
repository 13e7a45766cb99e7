//! Sprite atlas lookup: logical (type, facing/state, tick) -> source rectangle.
//!
//! Animation is globally synchronized: the frame depends only on the tick,
//! never on the entity, so every walking worker steps in unison. That is the
//! intended look, not a missing per-entity phase.
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::AtlasError;
use crate::models::{BulletState, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
}

pub const ORIENTATIONS: [Orientation; 4] =
    [Orientation::Up, Orientation::Down, Orientation::Left, Orientation::Right];

pub const BULLET_STATES: [BulletState; 4] = [
    BulletState::BulletReady,
    BulletState::BulletExplode1,
    BulletState::BulletExplode2,
    BulletState::BulletExplode3,
];

impl Orientation {
    /// Facing from frame-to-frame displacement.
    ///
    /// Horizontal wins only when strictly dominant. A unit that did not move
    /// keeps `last`, or faces down when nothing is known.
    pub fn infer(dx: f64, dy: f64, last: Option<Orientation>) -> Orientation {
        if dx == 0.0 && dy == 0.0 {
            return last.unwrap_or(Orientation::Down);
        }
        if dx.abs() > dy.abs() {
            if dx >= 0.0 {
                Orientation::Right
            } else {
                Orientation::Left
            }
        } else if dy >= 0.0 {
            Orientation::Down
        } else {
            Orientation::Up
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Orientation::Up => "up",
            Orientation::Down => "down",
            Orientation::Left => "left",
            Orientation::Right => "right",
        }
    }
}

/// Column indices and row indices cycled through by the animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTable(pub Vec<u32>, pub Vec<u32>);

impl FrameTable {
    pub fn new(cols: Vec<u32>, rows: Vec<u32>) -> Self {
        FrameTable(cols, rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// `floor(tick / ticks_per_frame) % len`.
pub fn frame_index(tick: Tick, ticks_per_frame: u64, len: usize) -> usize {
    debug_assert!(len > 0 && ticks_per_frame > 0);
    ((tick / ticks_per_frame.max(1)) % len.max(1) as u64) as usize
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpriteSpec {
    /// A whole image drawn as-is.
    Static {
        image: String,
        /// Draw size in pixels at full scale.
        size: [f64; 2],
        #[serde(default = "one")]
        scale: f64,
        #[serde(default = "one")]
        select_scale: f64,
    },
    /// A sheet of equally sized cells addressed by frame tables.
    Directional {
        image: String,
        cell: [f64; 2],
        frames: HashMap<String, FrameTable>,
        #[serde(default = "one")]
        scale: f64,
        #[serde(default = "one")]
        select_scale: f64,
    },
}

impl SpriteSpec {
    pub fn image(&self) -> &str {
        match self {
            SpriteSpec::Static { image, .. } | SpriteSpec::Directional { image, .. } => image,
        }
    }

    pub fn scale(&self) -> f64 {
        match self {
            SpriteSpec::Static { scale, .. } | SpriteSpec::Directional { scale, .. } => *scale,
        }
    }

    pub fn select_scale(&self) -> f64 {
        match self {
            SpriteSpec::Static { select_scale, .. } | SpriteSpec::Directional { select_scale, .. } => {
                *select_scale
            }
        }
    }

    /// Unscaled on-screen size.
    pub fn base_size(&self) -> (f64, f64) {
        match self {
            SpriteSpec::Static { size, .. } => (size[0], size[1]),
            SpriteSpec::Directional { cell, .. } => (cell[0], cell[1]),
        }
    }

    /// Source rectangle for `key` at `tick`; `None` means "draw the whole image".
    pub fn source_rect(
        &self,
        key: &str,
        tick: Tick,
        ticks_per_frame: u64,
    ) -> Result<Option<SourceRect>, AtlasError> {
        let SpriteSpec::Directional { image, cell, frames, .. } = self else {
            return Ok(None);
        };
        let missing = || AtlasError::MissingFrames { sprite: image.clone(), key: key.to_string() };
        let FrameTable(cols, rows) = frames.get(key).ok_or_else(missing)?;
        if cols.is_empty() || rows.is_empty() {
            return Err(missing());
        }
        let col = cols[frame_index(tick, ticks_per_frame, cols.len())];
        let row = rows[frame_index(tick, ticks_per_frame, rows.len())];
        Ok(Some(SourceRect {
            x: col as f64 * cell[0],
            y: row as f64 * cell[1],
            w: cell[0],
            h: cell[1],
        }))
    }

    fn check_keys<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Result<(), AtlasError> {
        if let SpriteSpec::Directional { .. } = self {
            for key in keys {
                self.source_rect(key, 0, 1)?;
            }
        }
        Ok(())
    }
}

/// Every sprite the viewer can draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasBook {
    pub units: HashMap<String, SpriteSpec>,
    /// Indexed by terrain slot value.
    pub terrain: Vec<SpriteSpec>,
    pub fog: SpriteSpec,
    pub bullet: SpriteSpec,
}

impl AtlasBook {
    pub fn from_json(text: &str) -> Result<Self, AtlasError> {
        serde_json::from_str(text).map_err(|e| AtlasError::Manifest(e.to_string()))
    }

    /// Fails on the first unit name or terrain index without a usable sprite.
    pub fn validate(&self, unit_names: &[String], terrain_count: usize) -> Result<(), AtlasError> {
        for name in unit_names {
            let spec = self.unit_sprite(name)?;
            spec.check_keys(ORIENTATIONS.iter().map(|o| o.as_key()))?;
        }
        for idx in 0..terrain_count {
            self.terrain_sprite(idx)?;
        }
        self.bullet.check_keys(BULLET_STATES.iter().map(|s| s.as_key()))?;
        Ok(())
    }

    pub fn unit_sprite(&self, name: &str) -> Result<&SpriteSpec, AtlasError> {
        self.units.get(name).ok_or_else(|| AtlasError::MissingUnitSprite(name.to_string()))
    }

    pub fn unit_sprite_for(&self, cfg: &ViewerConfig, unit_type: usize) -> Result<&SpriteSpec, AtlasError> {
        let name = cfg.unit_name(unit_type).ok_or(AtlasError::UnknownUnitType(unit_type))?;
        self.unit_sprite(name)
    }

    pub fn terrain_sprite(&self, idx: usize) -> Result<&SpriteSpec, AtlasError> {
        self.terrain.get(idx).ok_or(AtlasError::MissingTerrainSprite(idx))
    }

    /// Distinct image paths, for preloading.
    pub fn images(&self) -> BTreeSet<&str> {
        self.units
            .values()
            .chain(self.terrain.iter())
            .chain([&self.fog, &self.bullet])
            .map(SpriteSpec::image)
            .collect()
    }

    /// Built-in MiniRTS tables.
    pub fn minirts() -> Self {
        const TILES: &str = "imgs/tiles.png";
        const PEOPLE: &str = "imgs/People4.png";

        let span = |a: u32, b: u32| (a..b).collect::<Vec<u32>>();
        let directional = |image: &str, frames: [(Orientation, FrameTable); 4]| SpriteSpec::Directional {
            image: image.to_string(),
            cell: [32.0, 32.0],
            frames: frames.into_iter().map(|(o, t)| (o.as_key().to_string(), t)).collect(),
            scale: 1.0,
            select_scale: 1.0,
        };
        let still = |image: &str, w: f64, h: f64| SpriteSpec::Static {
            image: image.to_string(),
            size: [w, h],
            scale: 1.0,
            select_scale: 1.0,
        };
        let walker = || {
            directional(
                PEOPLE,
                [
                    (Orientation::Up, FrameTable::new(span(9, 12), vec![7])),
                    (Orientation::Down, FrameTable::new(span(9, 12), vec![4])),
                    (Orientation::Left, FrameTable::new(span(9, 12), vec![5])),
                    (Orientation::Right, FrameTable::new(span(9, 12), vec![6])),
                ],
            )
        };

        let mut units = HashMap::new();
        units.insert(
            "RANGE_ATTACKER".to_string(),
            directional(
                TILES,
                [
                    (Orientation::Up, FrameTable::new(span(15, 22), vec![0])),
                    (Orientation::Down, FrameTable::new(span(15, 22), vec![1])),
                    (Orientation::Left, FrameTable::new(vec![16], span(2, 9))),
                    (Orientation::Right, FrameTable::new(vec![15], span(2, 9))),
                ],
            ),
        );
        units.insert(
            "MELEE_ATTACKER".to_string(),
            directional(
                TILES,
                [
                    (Orientation::Up, FrameTable::new(span(15, 22), vec![9])),
                    (Orientation::Down, FrameTable::new(span(15, 22), vec![10])),
                    (Orientation::Left, FrameTable::new(vec![20], span(2, 9))),
                    (Orientation::Right, FrameTable::new(vec![21], span(2, 9))),
                ],
            ),
        );
        units.insert("WORKER".to_string(), walker());
        units.insert("FLAG_ATHLETE".to_string(), walker());
        units.insert("RESOURCE".to_string(), still("imgs/mineral1.png", 32.0, 32.0));
        units.insert("FLAG".to_string(), still("imgs/mineral1.png", 32.0, 32.0));
        units.insert("BASE".to_string(), still("imgs/base.png", 64.0, 64.0));
        units.insert("FLAG_BASE".to_string(), still("imgs/base.png", 64.0, 64.0));
        units.insert("BARRACKS".to_string(), still("imgs/barracks.png", 64.0, 64.0));

        let bullet_frames = [
            (BulletState::BulletReady, 7),
            (BulletState::BulletExplode1, 0),
            (BulletState::BulletExplode2, 1),
            (BulletState::BulletExplode3, 2),
        ];
        let bullet = SpriteSpec::Directional {
            image: TILES.to_string(),
            cell: [32.0, 32.0],
            frames: bullet_frames
                .into_iter()
                .map(|(s, col)| (s.as_key().to_string(), FrameTable::new(vec![col], vec![0])))
                .collect(),
            scale: 1.0,
            select_scale: 1.0,
        };

        AtlasBook {
            units,
            terrain: vec![
                still("imgs/terrain_normal.png", 50.0, 50.0),
                still("imgs/terrain_impassable.png", 50.0, 50.0),
                still("imgs/fog.png", 50.0, 50.0),
            ],
            fog: still("imgs/fog.png", 50.0, 50.0),
            bullet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_orientation_horizontal_dominant() {
        assert_eq!(Orientation::infer(0.3, 0.1, None), Orientation::Right);
        assert_eq!(Orientation::infer(-0.3, 0.1, None), Orientation::Left);
    }

    #[test]
    fn test_orientation_vertical_on_tie() {
        assert_eq!(Orientation::infer(0.2, 0.2, None), Orientation::Down);
        assert_eq!(Orientation::infer(0.2, -0.2, None), Orientation::Up);
    }

    #[test]
    fn test_orientation_standing_still_keeps_last() {
        assert_eq!(Orientation::infer(0.0, 0.0, Some(Orientation::Left)), Orientation::Left);
        assert_eq!(Orientation::infer(0.0, 0.0, None), Orientation::Down);
    }

    #[test]
    fn test_frame_index_three_ticks_per_frame() {
        let frames: Vec<usize> = (0..10).map(|t| frame_index(t, 3, 3)).collect();
        assert_eq!(frames, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 0]);
    }

    #[test]
    fn test_source_rect_walks_columns() {
        let book = AtlasBook::minirts();
        let worker = book.unit_sprite("WORKER").unwrap();
        let r0 = worker.source_rect("down", 0, 3).unwrap().unwrap();
        assert!((r0.x - 9.0 * 32.0).abs() < 1e-9);
        assert!((r0.y - 4.0 * 32.0).abs() < 1e-9);
        let r1 = worker.source_rect("down", 3, 3).unwrap().unwrap();
        assert!((r1.x - 10.0 * 32.0).abs() < 1e-9);
        let wrap = worker.source_rect("down", 9, 3).unwrap().unwrap();
        assert!((wrap.x - r0.x).abs() < 1e-9);
    }

    #[test]
    fn test_source_rect_walks_rows_for_side_view() {
        let book = AtlasBook::minirts();
        let ranged = book.unit_sprite("RANGE_ATTACKER").unwrap();
        let r = ranged.source_rect("left", 6, 3).unwrap().unwrap();
        assert!((r.x - 16.0 * 32.0).abs() < 1e-9);
        assert!((r.y - 4.0 * 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_static_sprite_has_no_source_rect() {
        let book = AtlasBook::minirts();
        let base = book.unit_sprite("BASE").unwrap();
        assert_eq!(base.source_rect("down", 17, 3).unwrap(), None);
    }

    #[test]
    fn test_bullet_keyed_by_state() {
        let book = AtlasBook::minirts();
        let r = book
            .bullet
            .source_rect(BulletState::BulletExplode3.as_key(), 100, 3)
            .unwrap()
            .unwrap();
        assert!((r.x - 64.0).abs() < 1e-9);
        assert!((r.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_minirts_tables_cover_catalog() {
        let cfg = ViewerConfig::default();
        AtlasBook::minirts().validate(&cfg.unit_names, 3).unwrap();
    }

    #[test]
    fn test_validate_reports_missing_unit() {
        let mut book = AtlasBook::minirts();
        book.units.remove("BARRACKS");
        let cfg = ViewerConfig::default();
        assert_eq!(
            book.validate(&cfg.unit_names, 3),
            Err(AtlasError::MissingUnitSprite("BARRACKS".into()))
        );
    }

    #[test]
    fn test_validate_reports_missing_terrain() {
        let cfg = ViewerConfig::default();
        assert_eq!(
            AtlasBook::minirts().validate(&cfg.unit_names, 4),
            Err(AtlasError::MissingTerrainSprite(3))
        );
    }

    #[test]
    fn test_validate_reports_missing_orientation() {
        let mut book = AtlasBook::minirts();
        if let Some(SpriteSpec::Directional { frames, .. }) = book.units.get_mut("WORKER") {
            frames.remove("up");
        }
        let cfg = ViewerConfig::default();
        assert!(matches!(
            book.validate(&cfg.unit_names, 3),
            Err(AtlasError::MissingFrames { key, .. }) if key == "up"
        ));
    }

    #[test]
    fn test_unknown_unit_type_index() {
        let cfg = ViewerConfig::default();
        assert_eq!(
            AtlasBook::minirts().unit_sprite_for(&cfg, 17),
            Err(AtlasError::UnknownUnitType(17))
        );
    }

    #[test]
    fn test_manifest_round_trips_through_json() {
        let book = AtlasBook::minirts();
        let text = serde_json::to_string(&book).unwrap();
        assert_eq!(AtlasBook::from_json(&text).unwrap(), book);
    }

    #[test]
    fn test_manifest_scale_defaults_to_one() {
        let text = r#"{
            "units": { "BASE": { "kind": "static", "image": "b.png", "size": [64, 64] } },
            "terrain": [],
            "fog": { "kind": "static", "image": "f.png", "size": [50, 50] },
            "bullet": { "kind": "static", "image": "x.png", "size": [8, 8], "scale": 0.5 }
        }"#;
        let book = AtlasBook::from_json(text).unwrap();
        assert!((book.units["BASE"].scale() - 1.0).abs() < 1e-9);
        assert!((book.bullet.scale() - 0.5).abs() < 1e-9);
        assert_eq!(book.images().len(), 3);
    }

    proptest! {
        #[test]
        fn prop_frame_index_period(t in 0u64..100_000, n in 1usize..12) {
            let period = 3 * n as u64;
            prop_assert_eq!(frame_index(t, 3, n), frame_index(t + period, 3, n));
            prop_assert_eq!(frame_index(t, 3, n), ((t / 3) % n as u64) as usize);
            prop_assert_eq!(frame_index(period * (t % 7), 3, n), 0);
        }
    }
}
