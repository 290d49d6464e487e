use cua_orchestrator::OrchestratorError;

#[derive(Debug)]
pub enum Error {
    Discovery(String),
    InvalidTargetVersion(String),
    LoadingConfiguration(config::ConfigError),
    Orchestrating(OrchestratorError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery(message) => write!(f, "{message}"),
            Self::InvalidTargetVersion(raw) => write!(f, "'{raw}' is not a valid version"),
            Self::LoadingConfiguration(error) => write!(f, "{error}"),
            Self::Orchestrating(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(_) | Self::InvalidTargetVersion(_) => None,
            Self::LoadingConfiguration(error) => Some(error),
            Self::Orchestrating(error) => Some(error),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::LoadingConfiguration(error)
    }
}

impl From<OrchestratorError> for Error {
    fn from(error: OrchestratorError) -> Self {
        Self::Orchestrating(error)
    }
}
