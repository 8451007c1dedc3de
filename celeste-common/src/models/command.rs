use serde::{Deserialize, Serialize};

pub const COMMAND_TYPE_NATIVE: &str = "native";
pub const COMMAND_TYPE_AUDIO: &str = "announce";
pub const COMMAND_TYPE_VIDEO: &str = "video";
pub const COMMAND_TYPE_PULSAR: &str = "pulsar";

/// How a command is carried out once dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    Native,
    Audio,
    Video,
    Pulse,
}

impl CommandType {
    /// Maps the `type` tag of a persisted record. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            COMMAND_TYPE_NATIVE => Some(CommandType::Native),
            COMMAND_TYPE_AUDIO => Some(CommandType::Audio),
            COMMAND_TYPE_VIDEO => Some(CommandType::Video),
            COMMAND_TYPE_PULSAR => Some(CommandType::Pulse),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            CommandType::Native => COMMAND_TYPE_NATIVE,
            CommandType::Audio => COMMAND_TYPE_AUDIO,
            CommandType::Video => COMMAND_TYPE_VIDEO,
            CommandType::Pulse => COMMAND_TYPE_PULSAR,
        }
    }
}

/// The built-in routine behind a native command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeCommandFlag {
    Agenda,
    Category,
    Title,
    Commands,
    EmoteOnly,
    Followage,
    Html,
    Panic,
    Shoutout,
    Song,
    Timezone,
    TotalTime,
    Uptime,
    Vibe,
    Volume,
}

impl NativeCommandFlag {
    pub const ALL: [NativeCommandFlag; 15] = [
        NativeCommandFlag::Agenda,
        NativeCommandFlag::Category,
        NativeCommandFlag::Title,
        NativeCommandFlag::Commands,
        NativeCommandFlag::EmoteOnly,
        NativeCommandFlag::Followage,
        NativeCommandFlag::Html,
        NativeCommandFlag::Panic,
        NativeCommandFlag::Shoutout,
        NativeCommandFlag::Song,
        NativeCommandFlag::Timezone,
        NativeCommandFlag::TotalTime,
        NativeCommandFlag::Uptime,
        NativeCommandFlag::Vibe,
        NativeCommandFlag::Volume,
    ];

    /// Chat name used when the settings don't rename the command.
    pub fn default_name(&self) -> &'static str {
        match self {
            NativeCommandFlag::Agenda => "agenda",
            NativeCommandFlag::Category => "category",
            NativeCommandFlag::Title => "title",
            NativeCommandFlag::Commands => "commands",
            NativeCommandFlag::EmoteOnly => "emote",
            NativeCommandFlag::Followage => "followage",
            NativeCommandFlag::Html => "html",
            NativeCommandFlag::Panic => "panic",
            NativeCommandFlag::Shoutout => "so",
            NativeCommandFlag::Song => "song",
            NativeCommandFlag::Timezone => "timezone",
            NativeCommandFlag::TotalTime => "totaltime",
            NativeCommandFlag::Uptime => "uptime",
            NativeCommandFlag::Vibe => "vibe",
            NativeCommandFlag::Volume => "volume",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NativeCommandFlag::Agenda => "Set the agenda of the stream, displayed in the header of the chat window",
            NativeCommandFlag::Category => "Change the stream category",
            NativeCommandFlag::Title => "Change the stream title",
            NativeCommandFlag::Commands => "List all of the commands the bot recognizes",
            NativeCommandFlag::EmoteOnly => "Toggle emote only mode in chat",
            NativeCommandFlag::Followage => "Show how long a user has followed the broadcaster",
            NativeCommandFlag::Html => "Format the chat message as HTML",
            NativeCommandFlag::Panic => "Crash the bot",
            NativeCommandFlag::Shoutout => "Call attention to another streamer's channel",
            NativeCommandFlag::Song => "Show the title, album, and artist of the song that is currently playing",
            NativeCommandFlag::Timezone => "Display the timezone of the system the bot is running on",
            NativeCommandFlag::TotalTime => "Show how many total hours stream has ever been live",
            NativeCommandFlag::Uptime => "Show how long the stream has been live",
            NativeCommandFlag::Vibe => "Start the playlist of music for the stream",
            NativeCommandFlag::Volume => "Adjust the volume of the vibe keeper",
        }
    }

    pub fn protected_by_default(&self) -> bool {
        matches!(
            self,
            NativeCommandFlag::Agenda
                | NativeCommandFlag::Category
                | NativeCommandFlag::Title
                | NativeCommandFlag::EmoteOnly
                | NativeCommandFlag::Panic
                | NativeCommandFlag::Vibe
                | NativeCommandFlag::Volume
        )
    }
}

/// A named chat command (e.g. `!intro`) known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub command_type: CommandType,
    pub protected: bool,
    pub random: bool,
    pub path: String,
    pub message: String,
    /// Registry key of the command this one aliases.
    pub parent: Option<String>,
}

impl Command {
    pub fn new(name: &str, description: &str, command_type: CommandType) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            command_type,
            protected: false,
            random: false,
            path: String::new(),
            message: String::new(),
            parent: None,
        }
    }

    pub fn native(name: &str, description: &str, protected: bool) -> Self {
        Self {
            protected,
            ..Self::new(name, description, CommandType::Native)
        }
    }

    /// Builds an alias entry. The alias carries its parent's behavior and points
    /// at the root of the alias chain, never at another alias.
    pub fn alias_of(alias: &str, parent: &Command) -> Self {
        let root = parent.parent.clone().unwrap_or_else(|| parent.name.clone());
        Self {
            name: alias.to_string(),
            parent: Some(root),
            ..parent.clone()
        }
    }

    /// Copy of this command carrying the invocation's argument text as its message.
    pub fn with_message(&self, message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..self.clone()
        }
    }

    pub fn is_alias(&self) -> bool {
        self.parent.is_some()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One entry of the persisted command list document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub command_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub random: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub protected: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl CommandRecord {
    /// A record that only attaches aliases to a command that isn't persisted itself.
    pub fn alias_only(parent: &str, aliases: Vec<String>) -> Self {
        Self {
            command: parent.to_string(),
            aliases,
            ..Default::default()
        }
    }
}

/// Entry of the public command list shown to chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandListing {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
}
