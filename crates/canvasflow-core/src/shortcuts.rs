//! Keyboard shortcut chords and the registry that scopes them to active states.

use crate::error::{StateError, StateResult};
use crate::events::KeyEvent;
use crate::state::StateId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform used to resolve the `mod` modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// `mod` means Command (Meta).
    Mac,
    /// `mod` means Control.
    Other,
}

impl Platform {
    /// The platform this crate was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// One `+`-joined alternative of a chord, e.g. `mod+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    key: String,
    mod_key: bool,
    shift: bool,
    ctrl: bool,
    alt: bool,
    meta: bool,
}

impl KeyCombo {
    fn parse(chord: &str, alt: &str) -> StateResult<Self> {
        let malformed = |reason| StateError::MalformedChord {
            chord: chord.to_string(),
            reason,
        };

        let mut combo = KeyCombo {
            key: String::new(),
            mod_key: false,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        };
        let mut key: Option<&str> = None;

        for part in alt.split('+').map(str::trim) {
            if part.is_empty() {
                return Err(malformed("empty key part"));
            }
            match part.to_ascii_lowercase().as_str() {
                "mod" => combo.mod_key = true,
                "shift" => combo.shift = true,
                "ctrl" | "control" => combo.ctrl = true,
                "alt" | "option" => combo.alt = true,
                "meta" | "cmd" | "command" => combo.meta = true,
                _ => {
                    if key.is_some() {
                        return Err(malformed("more than one non-modifier key"));
                    }
                    key = Some(part);
                }
            }
        }

        combo.key = key.ok_or_else(|| malformed("no key"))?.to_string();
        Ok(combo)
    }

    /// Whether a key-down event triggers this combination.
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let (ctrl, meta) = match platform {
            Platform::Mac => (self.ctrl, self.meta || self.mod_key),
            Platform::Other => (self.ctrl || self.mod_key, self.meta),
        };
        let m = &event.modifiers;
        self.key.eq_ignore_ascii_case(&event.key)
            && m.shift == self.shift
            && m.ctrl == ctrl
            && m.alt == self.alt
            && m.meta == meta
    }
}

/// A parsed shortcut: one or more comma-separated key combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    source: String,
    combos: Vec<KeyCombo>,
}

impl Chord {
    pub fn parse(source: &str) -> StateResult<Self> {
        let combos = source
            .split(',')
            .map(|alt| KeyCombo::parse(source, alt))
            .collect::<StateResult<Vec<_>>>()?;
        Ok(Self {
            source: source.to_string(),
            combos,
        })
    }

    pub fn combos(&self) -> &[KeyCombo] {
        &self.combos
    }

    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        self.combos.iter().any(|c| c.matches(event, platform))
    }
}

impl FromStr for Chord {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Callback run when a shortcut fires. Receives the context and the owning state.
pub type ShortcutAction<C> = fn(&mut C, StateId) -> StateResult;

struct Binding<C> {
    owner: StateId,
    chord: Chord,
    action: ShortcutAction<C>,
}

/// All shortcuts registered by the states of one tree, in registration order.
pub struct ShortcutRegistry<C> {
    bindings: Vec<Binding<C>>,
}

impl<C> Default for ShortcutRegistry<C> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for ShortcutRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| (b.owner, b.chord.to_string())))
            .finish()
    }
}

impl<C> ShortcutRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a shortcut for `owner`.
    pub fn register(
        &mut self,
        owner: StateId,
        chord: &str,
        action: ShortcutAction<C>,
    ) -> StateResult {
        let chord = Chord::parse(chord)?;
        self.insert(owner, chord, action);
        Ok(())
    }

    /// Register an already parsed chord.
    pub fn insert(&mut self, owner: StateId, chord: Chord, action: ShortcutAction<C>) {
        log::trace!("Registering shortcut {} for {:?}", chord, owner);
        self.bindings.push(Binding {
            owner,
            chord,
            action,
        });
    }

    /// Drop every shortcut owned by `owner`.
    pub fn remove_owner(&mut self, owner: StateId) {
        self.bindings.retain(|b| b.owner != owner);
    }

    /// Shortcuts whose chord matches the event, in registration order.
    pub fn matching(&self, event: &KeyEvent, platform: Platform) -> Vec<(StateId, ShortcutAction<C>)> {
        self.bindings
            .iter()
            .filter(|b| b.chord.matches(event, platform))
            .map(|b| (b.owner, b.action))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifiers;

    fn key(key: &str, modifiers: Modifiers) -> KeyEvent {
        KeyEvent {
            key: key.to_string(),
            modifiers,
        }
    }

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Default::default()
        }
    }

    fn meta() -> Modifiers {
        Modifiers {
            meta: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_alternatives() {
        let chord = Chord::parse("Delete,Backspace").unwrap();
        assert_eq!(chord.combos().len(), 2);
        assert!(chord.matches(&key("Backspace", Modifiers::default()), Platform::Other));
        assert!(chord.matches(&key("delete", Modifiers::default()), Platform::Other));
        assert!(!chord.matches(&key("Enter", Modifiers::default()), Platform::Other));
    }

    #[test]
    fn test_mod_resolves_per_platform() {
        let chord: Chord = "mod+z".parse().unwrap();
        assert!(chord.matches(&key("z", ctrl()), Platform::Other));
        assert!(!chord.matches(&key("z", meta()), Platform::Other));
        assert!(chord.matches(&key("z", meta()), Platform::Mac));
        assert!(!chord.matches(&key("z", ctrl()), Platform::Mac));
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let undo = Chord::parse("mod+z").unwrap();
        let redo = Chord::parse("mod+shift+z").unwrap();
        let ctrl_shift = Modifiers {
            ctrl: true,
            shift: true,
            ..Default::default()
        };
        assert!(!undo.matches(&key("Z", ctrl_shift), Platform::Other));
        assert!(redo.matches(&key("Z", ctrl_shift), Platform::Other));
        assert!(!redo.matches(&key("z", ctrl()), Platform::Other));
    }

    #[test]
    fn test_malformed_chords() {
        for bad in ["", "mod+", "shift", "a+b", "mod++z", "a,,b"] {
            assert!(
                matches!(Chord::parse(bad), Err(StateError::MalformedChord { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(Chord::parse("mod+=").is_ok());
        assert!(Chord::parse("mod+-").is_ok());
        assert!(Chord::parse("shift+0").is_ok());
    }

    #[test]
    fn test_registry_order_and_removal() {
        fn noop(_: &mut (), _: StateId) -> StateResult {
            Ok(())
        }
        let mut registry: ShortcutRegistry<()> = ShortcutRegistry::new();
        registry.register(StateId(1), "escape", noop).unwrap();
        registry.register(StateId(2), "Escape", noop).unwrap();
        registry.register(StateId(3), "v", noop).unwrap();
        assert!(registry.register(StateId(3), "a+b", noop).is_err());
        assert_eq!(registry.len(), 3);

        let hits: Vec<_> = registry
            .matching(&key("Escape", Modifiers::default()), Platform::Other)
            .into_iter()
            .map(|(owner, _)| owner)
            .collect();
        assert_eq!(hits, vec![StateId(1), StateId(2)]);

        registry.remove_owner(StateId(1));
        assert_eq!(registry.len(), 2);
    }
}
