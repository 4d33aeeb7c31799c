use std::{net::SocketAddr, sync::Arc, time::Duration};

use engine::{JsonFileStorage, LedgerStore};
use teloxide::types::UserId;
use workflow::Conversation;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger_bot={level},telegram_bot={level},server={level},workflow={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone = settings.timezone()?;
    let roster = settings.roster()?;

    let store = LedgerStore::builder()
        .storage(JsonFileStorage::new(&settings.storage.path))
        .io_timeout(settings.io_timeout())
        .build()
        .await;

    let mut conversation = Conversation::builder(store.clone())
        .roster(roster.clone())
        .timezone(timezone);
    if let Some(label) = settings.app.currency_label.as_deref() {
        conversation = conversation.currency_label(label);
    }
    let conversation = conversation.build();

    if let Some(server) = settings.server {
        let addr: SocketAddr = format!("{}:{}", server.bind, server.port).parse()?;
        let state = server::ServerState {
            store: store.clone(),
            roster: Arc::new(roster),
        };
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            server::run(state, addr).await;
        });
    }

    if let Some(telegram) = settings.telegram {
        let mut builder = telegram_bot::Bot::builder()
            .token(&telegram.token)
            .allowed_users(telegram.allowed_users.into_iter().map(UserId).collect());
        if let Some(secs) = telegram.download_timeout_secs {
            builder = builder.download_timeout(Duration::from_secs(secs));
        }
        tasks.spawn(async move {
            tracing::info!("Found telegram settings...");
            match builder.build() {
                Ok(bot) => bot.run(conversation).await,
                Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
            }
        });
    }

    if tasks.is_empty() {
        tracing::warn!("neither [server] nor [telegram] is configured, nothing to run");
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}
