use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickwatch_core::ValidationError),

    #[error(transparent)]
    Config(#[from] tickwatch_core::ConfigError),

    #[error(transparent)]
    Source(#[from] tickwatch_core::SourceError),

    #[error("monitor task failed: {0}")]
    Monitor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Source(_) => 3,
            Self::Monitor(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
