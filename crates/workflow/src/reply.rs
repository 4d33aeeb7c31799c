use crate::Command;

/// A button: what the operator sees and the command it sends back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyAction {
    pub label: String,
    pub command: String,
}

impl ReplyAction {
    pub fn new(label: impl Into<String>, command: &Command) -> Self {
        Self {
            label: label.into(),
            command: command.to_string(),
        }
    }
}

/// A file to hand to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Transport-neutral reply: text, rows of actions and an optional file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderableReply {
    pub text: String,
    pub actions: Vec<Vec<ReplyAction>>,
    pub attachment: Option<Attachment>,
}

impl RenderableReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn row(mut self, row: Vec<ReplyAction>) -> Self {
        if !row.is_empty() {
            self.actions.push(row);
        }
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: impl IntoIterator<Item = Vec<ReplyAction>>) -> Self {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    /// Adds a single-action row.
    #[must_use]
    pub fn action(self, label: impl Into<String>, command: &Command) -> Self {
        self.row(vec![ReplyAction::new(label, command)])
    }

    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Every command reachable from this reply, row by row.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .flatten()
            .map(|action| action.command.as_str())
    }

    pub fn has_command(&self, command: &Command) -> bool {
        let wanted = command.to_string();
        self.commands().any(|c| c == wanted)
    }
}
