//! Telegram bot.
//!
//! The bot is a thin transport: it turns updates into [`workflow::Event`]s,
//! hands them to the shared [`Conversation`] and draws the replies. It never
//! touches the ledger itself.

use std::time::Duration;

use teloxide::prelude::*;
use workflow::Conversation;

pub use error::BotError;

mod commands;
mod error;
mod handlers;
mod ui;

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest backup file accepted for a restore.
pub const MAX_DOWNLOAD_BYTES: u32 = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    conversation: Conversation,
    download_timeout: Duration,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    download_timeout: Duration,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self, conversation: Conversation) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = commands::register_menu(&bot).await {
            tracing::warn!("failed to register the command menu: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            conversation,
            download_timeout: self.download_timeout,
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Debug)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    download_timeout: Duration,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_users: None,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Only these users are answered. An empty list allows everyone.
    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> BotBuilder {
        self.download_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BotError::MissingToken);
        }
        Ok(Bot {
            token: self.token,
            allowed_users: self.allowed_users,
            download_timeout: self.download_timeout,
        })
    }
}
