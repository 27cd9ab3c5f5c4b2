// Gestion des erreurs personnalisées

use std::fmt;
use std::error::Error as StdError;

#[derive(Debug)]
pub enum MospfError {
    /// Packet failed version, checksum, or area validation (kind a).
    Validation(String),
    /// Packet type not recognised (kind b).
    UnknownPacketType(u8),
    /// SPF/RT builder could not resolve an egress interface for a gateway (kind c).
    ForwardingMiss(String),
    NetworkError(String),
    ConfigError(String),
    IoError(std::io::Error),
    RouteError(String),
}

impl fmt::Display for MospfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MospfError::Validation(msg) => write!(f, "packet validation failed: {}", msg),
            MospfError::UnknownPacketType(t) => write!(f, "unknown mOSPF packet type: {}", t),
            MospfError::ForwardingMiss(msg) => write!(f, "forwarding resolution miss: {}", msg),
            MospfError::NetworkError(msg) => write!(f, "network error: {}", msg),
            MospfError::ConfigError(msg) => write!(f, "configuration error: {}", msg),
            MospfError::IoError(err) => write!(f, "IO error: {}", err),
            MospfError::RouteError(msg) => write!(f, "route error: {}", msg),
        }
    }
}

impl StdError for MospfError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MospfError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MospfError {
    fn from(err: std::io::Error) -> Self {
        MospfError::IoError(err)
    }
}

pub type Result<T> = std::result::Result<T, MospfError>;
