use crate::constants::MAX_CURSOR_LEN;

const CURSOR_PREFIX: &str = "find";

/// A parsed request from a chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Find { name: String, offset: usize },
    List,
    Delete { id: String },
    Add { id: String },
}

/// Input errors, answered with usage guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    MissingName,
    MissingId,
    MissingCaption,
}

impl Command {
    ///
    /// Parse a text message like `/find Pikachu`.
    ///
    /// Returns `None` when the message is not one of our commands, so plain
    /// chat and other bots' commands pass through untouched.
    ///
    pub fn parse(prefix: &str, content: &str) -> Option<Result<Command, UsageError>> {
        let body = content.trim().strip_prefix(prefix)?;
        let (name, args) = match body.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (body, ""),
        };
        let command = match name {
            "start" => Ok(Command::Start),
            "find" => match args {
                "" => Err(UsageError::MissingName),
                name => Ok(Command::Find {
                    name: name.split_whitespace().collect::<Vec<_>>().join(" "),
                    offset: 0,
                }),
            },
            "list" | "show" => Ok(Command::List),
            "delete" => match args.split_whitespace().next() {
                Some(id) => Ok(Command::Delete { id: id.to_string() }),
                None => Err(UsageError::MissingId),
            },
            _ => return None,
        };
        Some(command)
    }

    /// An image sent with its card id as the caption.
    pub fn from_caption(caption: &str) -> Result<Command, UsageError> {
        match caption.split_whitespace().next() {
            Some(id) => Ok(Command::Add { id: id.to_string() }),
            None => Err(UsageError::MissingCaption),
        }
    }

    /// A "Next" button payload.
    pub fn from_cursor(payload: &str) -> Option<Command> {
        let cursor = Cursor::decode(payload)?;
        Some(Command::Find {
            name: cursor.name,
            offset: cursor.offset,
        })
    }
}

/// Resumable position in a search, round-tripped through the "Next" button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub name: String,
    pub offset: usize,
}

impl Cursor {
    pub fn new(name: &str, offset: usize) -> Cursor {
        Cursor {
            name: name.to_string(),
            offset,
        }
    }

    /// `None` if the payload would not fit in a button.
    pub fn encode(&self) -> Option<String> {
        let payload = format!("{}:{}:{}", CURSOR_PREFIX, self.offset, self.name);
        if payload.len() > MAX_CURSOR_LEN {
            return None;
        }
        Some(payload)
    }

    pub fn decode(payload: &str) -> Option<Cursor> {
        let mut parts = payload.splitn(3, ':');
        if parts.next()? != CURSOR_PREFIX {
            return None;
        }
        let offset = parts.next()?.parse::<usize>().ok()?;
        let name = parts.next()?;
        if name.trim().is_empty() {
            return None;
        }
        Some(Cursor::new(name, offset))
    }
}
