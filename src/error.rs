use std::{error::Error, fmt::Display};

/// Failure to build a [`SpacetimeConfig`](crate::config::SpacetimeConfig).
///
/// The running simulation never produces errors; invalid commands are simply
/// rejected. Configuration is the one place where bad input is reported.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidParameter { name: &'static str, value: f64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(inner) => write!(f, "failed to parse config: {}", inner),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid value for `{}`: {}", name, value)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(inner) => Some(inner),
            Self::InvalidParameter { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
