// File: celeste-core/src/services/chat/parser.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use celeste_common::models::{ChatEvent, CommandInvocation, Emote, Privilege};
use celeste_common::traits::IconResolver;

use crate::Error;
use crate::platforms::twitch_irc::IrcLine;
use crate::utils::text::{char_range, escape_html, unescape_tag_value};

pub const TWITCH_SYSTEM_ACCOUNT: &str = "jtv";
pub const HOST_NOTIFICATION_PHRASE: &str = " is now hosting you.";
pub const COMMAND_MARKER: char = '!';
const ACTION_MARKER: &str = "\u{1}ACTION";
const ACTION_END: char = '\u{1}';

const TAG_DISPLAY_NAME: &str = "display-name";
const TAG_COLOR: &str = "color";
const TAG_BADGES: &str = "badges";
const TAG_EMOTES: &str = "emotes";
const BADGE_BROADCASTER: &str = "broadcaster";
const BADGE_MODERATOR: &str = "moderator";

/// Platform notices that arrive as chat lines from the system account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Host { host: String },
}

/// A chat line after tags, hostmask and command detection.
///
/// `event.text` is still the raw message text; [`ChatLineParser::finalize`]
/// turns it into display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    pub event: ChatEvent,
    pub login: String,
    pub invocation: Option<CommandInvocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Notification(Notification),
    Chat(PendingChat),
}

/// A chat line ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedChat {
    pub event: ChatEvent,
    /// Message text as it arrived, before action stripping and escaping.
    pub raw_text: String,
    pub wall_of_text: bool,
}

/// Turns raw tagged protocol lines into chat events.
pub struct ChatLineParser {
    icons: Arc<dyn IconResolver>,
    system_account: String,
    text_wall_threshold: usize,
}

impl ChatLineParser {
    pub fn new(icons: Arc<dyn IconResolver>, text_wall_threshold: usize) -> Self {
        Self {
            icons,
            system_account: TWITCH_SYSTEM_ACCOUNT.to_string(),
            text_wall_threshold,
        }
    }

    pub fn text_wall_threshold(&self) -> usize {
        self.text_wall_threshold
    }

    /// Reads tags, sender and any leading `!command` from `raw`.
    ///
    /// Malformed tag, badge and emote entries are skipped. The only failure is
    /// a line whose source prefix carries no `nick!` part.
    pub fn parse(&self, raw: &str) -> Result<ParsedLine, Error> {
        let line = IrcLine::parse(raw);
        let tags = parse_tags(line.tags.unwrap_or_default());

        let mut event = ChatEvent::default();
        if let Some(name) = tags.get(TAG_DISPLAY_NAME) {
            event.sender = name.clone();
        }
        if let Some(color) = tags.get(TAG_COLOR) {
            event.color = color.clone();
        }
        if let Some(badges) = tags.get(TAG_BADGES) {
            self.apply_badges(badges, &mut event);
        }
        if let Some(emotes) = tags.get(TAG_EMOTES) {
            event.emotes = parse_emotes(emotes);
        }

        let login = line
            .prefix
            .and_then(|prefix| prefix.split_once('!'))
            .map(|(nick, _)| nick)
            .filter(|nick| !nick.is_empty())
            .ok_or_else(|| Error::MissingHostmask(raw.trim_end().to_string()))?
            .to_string();

        let text = line.trailing.unwrap_or_default();
        if login == self.system_account {
            if let Some(notification) = detect_notification(text) {
                return Ok(ParsedLine::Notification(notification));
            }
        }

        let invocation = detect_command(text, &login, event.privilege());
        event.text = text.to_string();
        Ok(ParsedLine::Chat(PendingChat { event, login, invocation }))
    }

    /// Strips the action wrapper, names and caches the emotes, measures the
    /// line against the wall-of-text threshold and escapes the text.
    pub fn finalize(&self, pending: PendingChat) -> FinalizedChat {
        let mut event = pending.event;
        let raw_text = std::mem::take(&mut event.text);

        let mut text = raw_text.trim();
        if let Some(inner) = text.strip_prefix(ACTION_MARKER) {
            let inner = match inner.rfind(ACTION_END) {
                Some(end) => &inner[..end],
                None => inner,
            };
            text = inner.trim();
            event.action = true;
        }

        let mut emote_chars = 0;
        for emote in &mut event.emotes {
            emote.name = char_range(text, emote.start, emote.end).to_string();
            emote_chars += emote.name.chars().count();
            emote.path = self.icons.emote_icon(&emote.id);
        }
        let wall_of_text = text.chars().count().saturating_sub(emote_chars) > self.text_wall_threshold;

        event.text = escape_html(text);
        FinalizedChat {
            event,
            raw_text,
            wall_of_text,
        }
    }

    fn apply_badges(&self, badges: &str, event: &mut ChatEvent) {
        for entry in badges.split(',').filter(|entry| !entry.is_empty()) {
            let Some((name, version)) = entry.split_once('/').filter(|(_, v)| !v.is_empty()) else {
                debug!("Skipping badge without a version: '{}'", entry);
                continue;
            };
            match name {
                BADGE_BROADCASTER if version == "1" => event.broadcaster = true,
                BADGE_MODERATOR if version == "1" => event.moderator = true,
                _ => {}
            }
            if let Some(path) = self.icons.badge_icon(name, version) {
                if !event.badges.contains(&path) {
                    event.badges.push(path);
                }
            }
        }
    }
}

/// Splits a tag block into unescaped key/value pairs.
pub fn parse_tags(block: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for entry in block.split(';').filter(|entry| !entry.is_empty()) {
        match entry.split_once('=') {
            Some((key, value)) => {
                tags.insert(key.to_string(), unescape_tag_value(value));
            }
            None => debug!("Skipping tag without a value: '{}'", entry),
        }
    }
    tags
}

/// Parses `id:start-end,start-end/id2:start-end`, sorted by start.
pub fn parse_emotes(value: &str) -> Vec<Emote> {
    let mut emotes = Vec::new();
    for group in value.split('/').filter(|group| !group.is_empty()) {
        let Some((id, occurrences)) = group.split_once(':') else {
            debug!("Skipping emote group without occurrences: '{}'", group);
            continue;
        };
        for occurrence in occurrences.split(',') {
            match parse_occurrence(occurrence) {
                Some((start, end)) => emotes.push(Emote::new(id, start, end)),
                None => debug!("Skipping malformed emote occurrence '{}' of {}", occurrence, id),
            }
        }
    }
    emotes.sort_by_key(|emote| emote.start);
    emotes
}

fn parse_occurrence(occurrence: &str) -> Option<(usize, usize)> {
    let (start, _) = occurrence.split_once('-')?;
    let (_, end) = occurrence.rsplit_once('-')?;
    let start = start.trim().parse::<usize>().ok()?;
    let end = end.trim().parse::<usize>().ok()?;
    (start <= end).then_some((start, end))
}

fn detect_notification(text: &str) -> Option<Notification> {
    if !text.contains(HOST_NOTIFICATION_PHRASE) {
        return None;
    }
    let host = text.split_whitespace().next()?;
    Some(Notification::Host { host: host.to_string() })
}

fn detect_command(text: &str, login: &str, privilege: Privilege) -> Option<CommandInvocation> {
    let (first, rest) = text.split_once(' ').unwrap_or((text, ""));
    let name = first.strip_prefix(COMMAND_MARKER)?;
    if name.is_empty() {
        return None;
    }
    Some(CommandInvocation {
        name: name.to_string(),
        arguments: rest.trim().to_string(),
        login: login.to_string(),
        privilege,
    })
}
