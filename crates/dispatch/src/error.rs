use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid target descriptor: {0:?}")]
    InvalidTarget(String),

    #[error("failed to expand {path:?}: {source}")]
    Expand {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("target root {0:?} is not a directory")]
    TargetUnreachable(PathBuf),

    #[error("no CVE feed configured (set engine.cve_feed or pass --no-cve-scan)")]
    MissingCveFeed,

    #[error("no SCAP datastream found for the detected platform (set engine.datastream)")]
    MissingDatastream,

    #[error("failed to run scan engine {command}: {source}")]
    EngineSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("scan engine call exceeded the configured limit of {0:?}")]
    EngineTimeout(Duration),

    #[error("engine task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
