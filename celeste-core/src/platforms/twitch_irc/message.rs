//! src/platforms/twitch_irc/message.rs

/// One protocol line split into its IRC parts, borrowing from the raw text.
///
/// `@tags :prefix COMMAND param param :trailing`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrcLine<'a> {
    /// Tag block without the leading `@`.
    pub tags: Option<&'a str>,
    /// Source without the leading `:`, e.g. `nick!user@host`.
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: &'a str,
    pub trailing: Option<&'a str>,
}

impl<'a> IrcLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        let mut parsed = IrcLine::default();

        // 1) tags
        if let Some(tagged) = rest.strip_prefix('@') {
            match tagged.split_once(' ') {
                Some((tags, remainder)) => {
                    parsed.tags = Some(tags);
                    rest = remainder.trim_start();
                }
                None => {
                    parsed.tags = Some(tagged);
                    return parsed;
                }
            }
        }

        // 2) prefix
        if let Some(sourced) = rest.strip_prefix(':') {
            match sourced.split_once(' ') {
                Some((prefix, remainder)) => {
                    parsed.prefix = Some(prefix);
                    rest = remainder.trim_start();
                }
                None => {
                    parsed.prefix = Some(sourced);
                    return parsed;
                }
            }
        }

        // 3) command
        let (command, remainder) = rest.split_once(' ').unwrap_or((rest, ""));
        parsed.command = command;

        // 4) params and trailing
        if let Some(text) = remainder.strip_prefix(':') {
            parsed.trailing = Some(text);
        } else if let Some((params, text)) = remainder.split_once(" :") {
            parsed.params = params.trim();
            parsed.trailing = Some(text);
        } else {
            parsed.params = remainder.trim();
        }

        parsed
    }

    /// First parameter, usually the `#channel`.
    pub fn channel(&self) -> Option<&'a str> {
        self.params.split_whitespace().next()
    }

    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }
}
