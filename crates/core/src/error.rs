use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found! Set it in the environment or the .env file.")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
