use std::path::PathBuf;

/// One emote occurrence inside a chat line.
///
/// `start` and `end` are inclusive character indices into [`ChatEvent::text`]
/// (before HTML escaping).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emote {
    pub id: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub path: PathBuf,
}

impl Emote {
    pub fn new(id: &str, start: usize, end: usize) -> Self {
        Self {
            id: id.to_string(),
            start,
            end,
            ..Default::default()
        }
    }

    /// Number of characters the occurrence covers.
    pub fn char_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Broadcaster/moderator bits taken from the sender's badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Privilege {
    pub broadcaster: bool,
    pub moderator: bool,
}

impl Privilege {
    pub fn is_privileged(&self) -> bool {
        self.broadcaster || self.moderator
    }
}

/// A fully parsed chat line, ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatEvent {
    pub sender: String,
    pub text: String,
    pub color: String,
    pub badges: Vec<PathBuf>,
    pub emotes: Vec<Emote>,
    pub action: bool,
    pub broadcaster: bool,
    pub moderator: bool,
}

impl ChatEvent {
    pub fn privilege(&self) -> Privilege {
        Privilege {
            broadcaster: self.broadcaster,
            moderator: self.moderator,
        }
    }
}

/// A `!name arguments` request found at the start of a chat line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub arguments: String,
    pub login: String,
    pub privilege: Privilege,
}
