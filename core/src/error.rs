use thiserror::Error;

#[derive(Error, Debug)]
pub enum GapError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Non-finite {field} for store '{store}'")]
    NonFiniteGap { store: String, field: &'static str },

    #[error("Non-finite {field} in daily row for store '{store}'")]
    NonFiniteDaily { store: String, field: &'static str },

    #[error("Invalid sale date '{value}'")]
    InvalidDate { value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GapResult<T> = Result<T, GapError>;
