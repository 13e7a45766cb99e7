//! Which hotkeys the current selection may use.
use std::collections::HashSet;

use crate::models::{AllowedCommand, CommandId, GameDef, Unit};

/// Command classes the unit catalog names in `allowed_cmds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    Attack,
    Move,
    Gather,
    Build,
    Generic,
}

impl CommandClass {
    pub fn of(id: &CommandId) -> Self {
        match id.name() {
            Some("ATTACK") => CommandClass::Attack,
            Some("MOVE") => CommandClass::Move,
            Some("GATHER") => CommandClass::Gather,
            Some("BUILD") => CommandClass::Build,
            _ => CommandClass::Generic,
        }
    }

    /// Key bound to the class when the catalog gives none. Build keys come from build skills.
    pub fn default_hotkey(&self) -> Option<char> {
        match self {
            CommandClass::Attack => Some('a'),
            CommandClass::Move => Some('~'),
            CommandClass::Gather => Some('t'),
            CommandClass::Build | CommandClass::Generic => None,
        }
    }
}

pub fn command_hotkey(cmd: &AllowedCommand) -> Option<char> {
    cmd.hotkey.or_else(|| CommandClass::of(&cmd.id).default_hotkey())
}

#[derive(Debug, Clone, PartialEq)]
pub enum HotkeyAction {
    /// A command class every selected unit allows.
    Command(String),
    /// Build order for the single selected unit.
    Build { unit_type: usize, price: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub key: char,
    pub action: HotkeyAction,
}

/// What `key` would do for `selected`, or `None` when it is illegal.
pub fn resolve(key: char, selected: &[&Unit], gamedef: &GameDef) -> Option<HotkeyAction> {
    let (first, rest) = selected.split_first()?;

    let allowed_by = |unit: &Unit| -> Option<String> {
        gamedef
            .unit_def(unit.unit_type)?
            .allowed_cmds
            .iter()
            .find(|c| command_hotkey(c) == Some(key))
            .map(|c| c.id.to_string())
    };
    if let Some(id) = allowed_by(*first) {
        if rest.iter().all(|&u| allowed_by(u).is_some()) {
            return Some(HotkeyAction::Command(id));
        }
    }

    if !rest.is_empty() {
        return None;
    }
    gamedef
        .unit_def(first.unit_type)?
        .build_skills
        .iter()
        .find(|s| s.hotkey == key)
        .map(|s| HotkeyAction::Build { unit_type: s.unit_type, price: s.price })
}

/// Every legal binding for `selected`, command classes first, in catalog order.
pub fn legal_bindings(selected: &[&Unit], gamedef: &GameDef) -> Vec<Binding> {
    let Some(first) = selected.first() else {
        return Vec::new();
    };
    let Some(def) = gamedef.unit_def(first.unit_type) else {
        return Vec::new();
    };
    let mut keys: Vec<char> = def.allowed_cmds.iter().filter_map(command_hotkey).collect();
    if selected.len() == 1 {
        keys.extend(def.build_skills.iter().map(|s| s.hotkey));
    }
    let mut seen = HashSet::new();
    keys.retain(|k| seen.insert(*k));

    keys.into_iter()
        .filter_map(|key| resolve(key, selected, gamedef).map(|action| Binding { key, action }))
        .collect()
}
