//! Error types for the fallible edges of the game
//!
//! The simulation itself never fails; only configuration, the score
//! reporter, the local store and the render sink can.

/// Tuning could not be parsed or is out of range
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "tuning parse error: {e}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Score submission was rejected or could not be delivered
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    MissingIdentifier,
    Unavailable(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier => write!(f, "missing player identifier"),
            Self::Unavailable(e) => write!(f, "score service unavailable: {e}"),
        }
    }
}

impl std::error::Error for ReportError {}

/// Local key-value store failure
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Unavailable,
    Backend(String),
    Serialize(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Backend(e) => write!(f, "storage error: {e}"),
            Self::Serialize(e) => write!(f, "serialize error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Render sink failed to draw a frame
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    SurfaceLost,
    Draw(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SurfaceLost => write!(f, "render surface lost"),
            Self::Draw(e) => write!(f, "draw error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}
