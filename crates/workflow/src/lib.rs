//! The conversation core of the ledger bot.
//!
//! Transports turn their updates into [`Event`]s and hand them to a
//! [`Conversation`], which answers with a [`RenderableReply`]. Multi-step
//! actions (buy, sell, pay a debt, ...) are static step lists interpreted per
//! session; their last step commits exactly one ledger operation through the
//! [`engine::LedgerStore`].

pub use command::Command;
pub use conversation::{Conversation, ConversationBuilder, DEFAULT_CURRENCY_LABEL};
pub use event::{Event, EventKind, SessionId};
pub use parsing::{CANCEL_TOKEN, SKIP_TOKEN, normalize_digits, parse_amount};
pub use reply::{Attachment, RenderableReply, ReplyAction};
pub use step::{ActionKind, Skip};

mod command;
mod conversation;
mod event;
mod flows;
mod parsing;
mod render;
mod reply;
mod session;
mod step;
