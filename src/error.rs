use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid vehicle year range: {min}..={max}")]
    InvalidYearRange { min: u16, max: u16 },

    #[error("road-type token list is empty")]
    NoRoadTokens,
}
