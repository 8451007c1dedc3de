// File: celeste-core/src/services/commands/registry.rs

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rand::seq::IteratorRandom;
use tracing::{debug, info, warn};

use celeste_common::models::{Command, CommandListing, CommandRecord, CommandType, NativeCommandFlag};
use crate::Error;

/// Every command the bot answers to, keyed by name.
///
/// Aliases are stored under their own name as copies of their parent, with
/// `parent` naming the root command. Native commands are declared once at
/// startup and are never written back to the command list document.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Command>,
    native_flags: HashMap<String, NativeCommandFlag>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_native(
        &mut self,
        name: &str,
        description: &str,
        flag: NativeCommandFlag,
        protected: bool,
    ) -> Result<(), Error> {
        if self.commands.contains_key(name) {
            return Err(Error::DuplicateCommand(name.to_string()));
        }
        self.commands.insert(name.to_string(), Command::native(name, description, protected));
        self.native_flags.insert(name.to_string(), flag);
        debug!("declared native command '!{}' ({:?})", name, flag);
        Ok(())
    }

    /// Registers the commands and aliases of a command list document.
    ///
    /// Records with an unknown `type` are dropped. A record whose name is
    /// already registered keeps the existing command but still contributes
    /// its aliases, which is how aliases are attached to native commands.
    pub fn load_dynamic(&mut self, records: Vec<CommandRecord>) -> &Self {
        for record in records {
            let name = record.command.trim().to_string();
            if name.is_empty() {
                warn!("Skipping a command record without a name");
                continue;
            }

            if !self.commands.contains_key(&name) {
                let Some(tag) = record.command_type.as_deref() else {
                    warn!("Command '{}' has no type and no existing command to attach aliases to", name);
                    continue;
                };
                let Some(command_type) = CommandType::from_tag(tag) else {
                    warn!("Command type '{}' doesn't exist for command '{}'", tag, name);
                    continue;
                };
                if command_type == CommandType::Native {
                    warn!("Native command '{}' is not built into this bot", name);
                    continue;
                }
                let command = Command {
                    protected: record.protected,
                    random: record.random,
                    path: record.path.clone().unwrap_or_default(),
                    message: record.message.clone().unwrap_or_default(),
                    ..Command::new(&name, record.description.as_deref().unwrap_or_default(), command_type)
                };
                self.commands.insert(name.clone(), command);
            }

            for alias in &record.aliases {
                if let Err(e) = self.add_alias(alias, &name) {
                    warn!("Alias '{}' of '{}' was not registered: {}", alias, name, e);
                }
            }
        }
        info!("Command registry holds {} commands", self.commands.len());
        self
    }

    /// Produces the command list document for this registry.
    pub fn serialize(&self) -> Vec<CommandRecord> {
        let mut aliases: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for command in self.commands.values() {
            if let Some(parent) = &command.parent {
                aliases.entry(parent.as_str()).or_default().push(command.name.clone());
            }
        }

        let mut records = Vec::new();
        for command in self.commands.values().filter(|c| !c.is_alias()) {
            let children = aliases.remove(command.name.as_str()).unwrap_or_default();
            if command.command_type == CommandType::Native {
                if !children.is_empty() {
                    records.push(CommandRecord::alias_only(&command.name, children));
                }
                continue;
            }
            records.push(CommandRecord {
                command: command.name.clone(),
                command_type: Some(command.command_type.as_tag().to_string()),
                description: non_empty(&command.description),
                random: command.random,
                path: non_empty(&command.path),
                message: non_empty(&command.message),
                protected: command.protected,
                aliases: children,
            });
        }
        records
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn native_flag(&self, name: &str) -> Option<NativeCommandFlag> {
        self.native_flags.get(name).copied()
    }

    /// Adds a new non-native command.
    pub fn insert(&mut self, command: Command) -> Result<(), Error> {
        if self.commands.contains_key(&command.name) {
            return Err(Error::DuplicateCommand(command.name));
        }
        if command.command_type == CommandType::Native {
            return Err(Error::Parse(format!("native command '{}' must be declared", command.name)));
        }
        if let Some(parent) = &command.parent {
            let parent = parent.clone();
            return self.add_alias(&command.name, &parent);
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    /// Removes a non-native command together with its aliases, or a single alias.
    pub fn remove(&mut self, name: &str) -> Option<Command> {
        let command = self.commands.get(name)?;
        if command.command_type == CommandType::Native && !command.is_alias() {
            warn!("Native command '{}' cannot be removed", name);
            return None;
        }

        let removed = self.commands.remove(name)?;
        self.native_flags.remove(name);
        if !removed.is_alias() {
            let children: Vec<String> = self
                .commands
                .values()
                .filter(|c| c.parent.as_deref() == Some(name))
                .map(|c| c.name.clone())
                .collect();
            for child in children {
                self.commands.remove(&child);
                self.native_flags.remove(&child);
            }
        }
        Some(removed)
    }

    /// Binds `alias` to `parent`. The alias shares the parent's behavior and,
    /// for natives, its flag.
    pub fn add_alias(&mut self, alias: &str, parent: &str) -> Result<(), Error> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(Error::Parse("empty alias".into()));
        }
        if self.commands.contains_key(alias) {
            return Err(Error::DuplicateCommand(alias.to_string()));
        }
        let parent_command = self
            .commands
            .get(parent)
            .ok_or_else(|| Error::NotFound(format!("command '{parent}'")))?;

        let entry = Command::alias_of(alias, parent_command);
        if let Some(flag) = self.native_flag(parent) {
            self.native_flags.insert(alias.to_string(), flag);
        }
        self.commands.insert(alias.to_string(), entry);
        Ok(())
    }

    /// The command list shown to chat. Protected commands and their aliases stay hidden.
    pub fn listing(&self) -> Vec<CommandListing> {
        self.commands
            .values()
            .filter(|c| !c.is_alias() && !c.protected)
            .map(|c| CommandListing {
                name: c.name.clone(),
                aliases: self
                    .commands
                    .values()
                    .filter(|child| child.parent.as_deref() == Some(c.name.as_str()))
                    .map(|child| child.name.clone())
                    .collect(),
                description: c.description.clone(),
            })
            .collect()
    }

    /// Any registered name, aliases and protected commands included, for the help rotation.
    pub fn random_command(&self) -> Option<&Command> {
        self.commands.values().choose(&mut rand::rng())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads a command list document.
///
/// A missing file is created empty. An unreadable document is an error; an
/// individual malformed record is skipped.
pub fn load_document(path: &Path) -> Result<Vec<CommandRecord>, Error> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, "")?;
        info!("Created empty command list at {}", path.display());
        return Ok(Vec::new());
    }

    let data = std::fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values: Vec<serde_json::Value> = serde_json::from_str(&data)
        .map_err(|e| Error::CommandDocument(format!("{}: {}", path.display(), e)))?;

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<CommandRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed command record in {}: {}", path.display(), e),
        }
    }
    Ok(records)
}

pub fn save_document(path: &Path, records: &[CommandRecord]) -> Result<(), Error> {
    let data = serde_json::to_string_pretty(records)?;
    std::fs::write(path, data)?;
    debug!("Saved {} command records to {}", records.len(), path.display());
    Ok(())
}
