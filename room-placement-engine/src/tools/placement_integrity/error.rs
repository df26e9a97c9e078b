use thiserror::Error;

/// Failures surfaced to callers outside the subsystem. The integrity
/// mechanisms themselves never fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("unknown furniture instance: {0}")]
    UnknownInstance(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("integrity monitor is not running")]
    MonitorNotRunning,

    #[error("integrity monitor was restarted elsewhere; the held handle is stale")]
    StaleMonitorHandle,
}
