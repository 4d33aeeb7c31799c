use teloxide::{
    net::Download,
    prelude::*,
    types::{ChatId, Document, InputFile, User},
};
use workflow::{Event, RenderableReply, SessionId};

use crate::{BotError, ConfigParameters, MAX_DOWNLOAD_BYTES, ui};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let chat_id = msg.chat.id;
    let session = SessionId(chat_id.0);

    let event = if let Some(document) = msg.document() {
        match download_document(&bot, &cfg, document).await {
            Ok(bytes) => Event::file(session, bytes),
            Err(err) => {
                tracing::warn!("document from chat {chat_id} rejected: {err}");
                bot.send_message(chat_id, err.user_message()).await?;
                return Ok(());
            }
        }
    } else if let Some(text) = msg.text() {
        match ui::slash_command(text) {
            Some(command) => Event::command(session, command),
            None => Event::text(session, text),
        }
    } else {
        tracing::debug!("ignoring a message without text or document");
        return Ok(());
    };

    let reply = cfg.conversation.handle(event).await;
    send_reply(&bot, chat_id, reply).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let reply = cfg
        .conversation
        .handle(Event::command(SessionId(chat_id.0), data))
        .await;
    send_reply(&bot, chat_id, reply).await
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: RenderableReply) -> ResponseResult<()> {
    let keyboard = ui::keyboard(&reply);
    let RenderableReply {
        text, attachment, ..
    } = reply;

    if let Some(attachment) = attachment {
        bot.send_document(
            chat_id,
            InputFile::memory(attachment.bytes).file_name(attachment.file_name),
        )
        .await?;
    }

    let request = bot.send_message(chat_id, text);
    match keyboard {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}

/// Fetches an uploaded document, bounded by size and time.
async fn download_document(
    bot: &Bot,
    cfg: &ConfigParameters,
    document: &Document,
) -> Result<Vec<u8>, BotError> {
    let declared = document.file.size;
    if declared > MAX_DOWNLOAD_BYTES {
        return Err(BotError::TooLarge {
            size: u64::from(declared),
            limit: MAX_DOWNLOAD_BYTES,
        });
    }

    let download = async {
        let file = bot.get_file(document.file.id.clone()).await?;
        let mut bytes = Vec::with_capacity(declared as usize);
        bot.download_file(&file.path, &mut bytes).await?;
        Ok::<_, BotError>(bytes)
    };
    let bytes = tokio::time::timeout(cfg.download_timeout, download)
        .await
        .map_err(|_| BotError::Timeout(cfg.download_timeout))??;

    if bytes.len() as u64 > u64::from(MAX_DOWNLOAD_BYTES) {
        return Err(BotError::TooLarge {
            size: bytes.len() as u64,
            limit: MAX_DOWNLOAD_BYTES,
        });
    }
    Ok(bytes)
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}
