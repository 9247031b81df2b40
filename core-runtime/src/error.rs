use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid audio setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

impl Error {
    /// Returns `true` if the error names a bridge the host forgot to inject.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, Error::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
