/// One conversation. Transports map their chat id onto it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Free text typed by the operator.
    Text(String),
    /// An uploaded file's content.
    File(Vec<u8>),
    /// A command name such as `sell:12`, from a button or a slash command.
    Command(String),
}

/// Inbound event from a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub session: SessionId,
    pub kind: EventKind,
}

impl Event {
    pub fn text(session: SessionId, text: impl Into<String>) -> Self {
        Self {
            session,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn file(session: SessionId, bytes: Vec<u8>) -> Self {
        Self {
            session,
            kind: EventKind::File(bytes),
        }
    }

    pub fn command(session: SessionId, name: impl Into<String>) -> Self {
        Self {
            session,
            kind: EventKind::Command(name.into()),
        }
    }
}
