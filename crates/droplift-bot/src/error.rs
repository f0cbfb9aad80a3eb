//! Bot error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Telegram rejected the bot token: {0}")]
    Unauthorized(String),

    #[error("Telegram API error ({code}): {description}")]
    Api { code: i64, description: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
