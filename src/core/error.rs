use thiserror::Error;

#[derive(Error, Debug)]
pub enum LichError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient gold: need {needed}, have {available}")]
    InsufficientGold { needed: String, available: String },

    #[error("Insufficient echoes: need {needed}, have {available}")]
    InsufficientEchoes { needed: String, available: String },

    #[error("Prestige requirements not met: {years} years played, {gold} gold")]
    PrestigeRequirementsUnmet { years: u64, gold: String },

    #[error("A choice event is pending: {0}")]
    PendingChoice(String),

    #[error("Invalid save slot: {0}")]
    InvalidSlot(u8),

    #[error("Save failed: {0}")]
    Save(String),

    #[error("Load failed: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LichError>;
