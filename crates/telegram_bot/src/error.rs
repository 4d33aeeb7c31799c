use std::time::Duration;

use teloxide::{DownloadError, RequestError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("the telegram token is missing")]
    MissingToken,
    #[error("telegram request failed: {0}")]
    Request(#[from] RequestError),
    #[error("file download failed: {0}")]
    Download(#[from] DownloadError),
    #[error("the file is too large ({size} bytes, at most {limit})")]
    TooLarge { size: u64, limit: u32 },
    #[error("the file download timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl BotError {
    /// Text shown in the chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::TooLarge { limit, .. } => {
                format!("❌ The file is too large (at most {} MB).", limit / (1024 * 1024))
            }
            Self::Timeout(_) => "❌ The file download timed out. Please try again.".to_string(),
            _ => "❌ Could not receive the file. Please try again.".to_string(),
        }
    }
}
