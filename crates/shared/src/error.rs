use thiserror::Error;

/// Sprite tables must cover every type the catalogs enumerate; anything else is fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AtlasError {
    #[error("no sprite for unit type {0:?}")]
    MissingUnitSprite(String),

    #[error("unit type index {0} has no name in the unit catalog")]
    UnknownUnitType(usize),

    #[error("no sprite for terrain index {0}")]
    MissingTerrainSprite(usize),

    #[error("sprite {sprite:?} has no frames for {key:?}")]
    MissingFrames { sprite: String, key: String },

    #[error("atlas manifest parse error: {0}")]
    Manifest(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("viewer config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid viewer config: {0}")]
    Invalid(String),
}

/// Malformed command line received from a client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("empty command line")]
    Empty,

    #[error("invalid tick {0:?}")]
    BadTick(String),

    #[error("unknown command code {0:?}")]
    UnknownCode(String),

    #[error("command {code} expects {expected} arguments, got {got}")]
    Arity { code: char, expected: usize, got: usize },

    #[error("invalid argument {0:?}")]
    BadArgument(String),
}
