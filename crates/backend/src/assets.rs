use std::path::{Path, PathBuf};

use minirts_shared::atlas::AtlasBook;
use minirts_shared::config::ViewerConfig;
use minirts_shared::error::{AtlasError, ConfigError};
use minirts_shared::models::{PlayerId, Snapshot, Tick, TERRAIN_KINDS};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}:{line}: bad snapshot: {source}")]
    Frame {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("{0} holds no frames")]
    EmptyReplay(PathBuf),
    #[error("viewer.json: {0}")]
    Config(#[from] ConfigError),
    #[error("atlas.json: {0}")]
    Atlas(#[from] AtlasError),
}

fn read(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Check the client's optional manifests before serving them, returning the
/// viewer config the clients will load.
///
/// Missing files are fine: the client falls back to its built-in tables.
pub fn check_manifests(assets_dir: &Path) -> Result<ViewerConfig, AssetError> {
    let config_path = assets_dir.join("viewer.json");
    let cfg = if config_path.exists() {
        ViewerConfig::from_json(&read(&config_path)?)?
    } else {
        tracing::info!(path = %config_path.display(), "no viewer config, clients use defaults");
        ViewerConfig::default()
    };

    let atlas_path = assets_dir.join("atlas.json");
    if atlas_path.exists() {
        let atlas = AtlasBook::from_json(&read(&atlas_path)?)?;
        atlas.validate(&cfg.unit_names, TERRAIN_KINDS)?;
        tracing::info!(images = atlas.images().len(), "sprite atlas ok");
    } else {
        tracing::info!(path = %atlas_path.display(), "no sprite atlas, clients use built-in tables");
    }
    Ok(cfg)
}

/// A recorded game, one snapshot per line.
#[derive(Debug, Clone)]
pub struct Replay {
    pub frames: Vec<Snapshot>,
}

impl Replay {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let replay = Self::parse(&read(path)?, path)?;
        tracing::info!(
            frames = replay.frames.len(),
            length = replay.length(),
            path = %path.display(),
            "Loaded replay"
        );
        Ok(replay)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, AssetError> {
        let mut frames = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let frame = Snapshot::from_json(line).map_err(|source| AssetError::Frame {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })?;
            frames.push(frame);
        }
        if frames.is_empty() {
            return Err(AssetError::EmptyReplay(path.to_path_buf()));
        }
        Ok(Replay { frames })
    }

    /// Tick of the last frame.
    pub fn length(&self) -> Tick {
        self.frames.last().map_or(0, |f| f.tick)
    }

    /// Player ids in order of first appearance.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids = Vec::new();
        for frame in &self.frames {
            for p in &frame.players {
                if !ids.contains(&p.player_id) {
                    ids.push(p.player_id);
                }
            }
        }
        ids
    }
}
