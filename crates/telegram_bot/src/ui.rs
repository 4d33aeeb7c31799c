use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use workflow::RenderableReply;

/// Action rows as an inline keyboard; `None` when the reply has no actions.
pub(crate) fn keyboard(reply: &RenderableReply) -> Option<InlineKeyboardMarkup> {
    if reply.actions.is_empty() {
        return None;
    }
    let rows = reply.actions.iter().map(|row| {
        row.iter()
            .map(|action| InlineKeyboardButton::callback(action.label.clone(), action.command.clone()))
            .collect::<Vec<_>>()
    });
    Some(InlineKeyboardMarkup::new(rows))
}

/// Turns `/sell@ledger_bot 12` into `sell:12`. `None` for plain text.
pub(crate) fn slash_command(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some(std::iter::once(name).chain(parts).collect::<Vec<_>>().join(":"))
}
