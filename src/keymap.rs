use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GalleryError, Result};

const BUILTIN_KEYS_TOML: &str = include_str!("default_keys.toml");

const NAMED_KEYS: &[&str] = &[
    "Left", "Right", "Up", "Down", "PageUp", "PageDown", "Home", "End", "Enter", "Escape",
    "Space", "Tab", "Backspace", "Delete", "Insert",
];

// ---------------------------------------------------------------------------
// Contexts (modes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Any,
    Viewer,
    ItemList,
    Help,
    Slideshow,
}

impl Context {
    pub const ALL: [Context; 5] = [
        Context::Any,
        Context::Viewer,
        Context::ItemList,
        Context::Help,
        Context::Slideshow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Context::Any => "Any",
            Context::Viewer => "Viewer",
            Context::ItemList => "Item List",
            Context::Help => "Help",
            Context::Slideshow => "Slideshow",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Key combinations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mods {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

/// A key label plus modifiers. Labels are case-sensitive: `j` and `J`
/// are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub mods: Mods,
    pub key: String,
}

impl KeyCombo {
    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_mods(Mods::default(), key)
    }

    /// Shift is dropped for single printable characters; the character
    /// itself already says whether shift was held.
    pub fn with_mods(mut mods: Mods, key: impl Into<String>) -> Self {
        let key = key.into();
        if key.chars().count() == 1 {
            mods.shift = false;
        }
        Self { mods, key }
    }

    /// Parse a label such as `j`, `PageUp`, `KP5`, `Minus` or `A-S-Left`.
    pub fn parse(label: &str) -> Option<Self> {
        let mut mods = Mods::default();
        let mut rest = label;
        while let Some((head, tail)) = rest.split_once('-') {
            if tail.is_empty() {
                break;
            }
            match head {
                "A" | "Alt" => mods.alt = true,
                "C" | "Ctrl" | "Control" => mods.ctrl = true,
                "M" | "Meta" => mods.meta = true,
                "S" | "Shift" => mods.shift = true,
                _ => break,
            }
            rest = tail;
        }

        let key = match rest {
            "Minus" => "-",
            other => other,
        };
        if !is_valid_key(key) {
            return None;
        }
        Some(Self::with_mods(mods, key))
    }
}

fn is_valid_key(key: &str) -> bool {
    if NAMED_KEYS.contains(&key) {
        return true;
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !c.is_whitespace() && !c.is_control(),
        _ => {
            let numbered = |prefix: &str, range: std::ops::RangeInclusive<u32>| {
                key.strip_prefix(prefix)
                    .and_then(|n| n.parse::<u32>().ok())
                    .is_some_and(|n| range.contains(&n))
            };
            numbered("KP", 0..=9) || numbered("F", 1..=12)
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.alt {
            write!(f, "A-")?;
        }
        if self.mods.ctrl {
            write!(f, "C-")?;
        }
        if self.mods.meta {
            write!(f, "M-")?;
        }
        if self.mods.shift {
            write!(f, "S-")?;
        }
        write!(f, "{}", self.key)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// 1-based item number.
    Absolute(i64),
    Last,
    /// Offset from the current item.
    Relative(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomCmd {
    In,
    Out,
    Exact(f64),
    Fit,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrightnessCmd {
    Up,
    Down,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Next,
    Prev,
    Go(Target),
    Zoom(ZoomCmd),
    Brightness(BrightnessCmd),
    /// Scroll left, or previous item when the canvas fits horizontally.
    Left,
    /// Scroll right, or next item when the canvas fits horizontally.
    Right,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
    ShiftSpace,
    ToggleList,
    ToggleHelp,
    ModeDrop,
    Info,
    Back,
    Forward,
    Slideshow,
    ListLeft,
    ListRight,
    ListHome,
    ListEnd,
    ListSubmit,
    Quit,
    /// Swallows the key without doing anything.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || UnknownAction(s.to_string());

        let (name, arg) = match s.split_once('(') {
            Some((name, rest)) => {
                let arg = rest.strip_suffix(')').ok_or_else(unknown)?;
                let arg: String = arg
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
                    .collect();
                (name.trim(), Some(arg))
            }
            None => (s, None),
        };

        let action = match (name, arg.as_deref()) {
            ("", None) => Action::Disabled,
            ("next", None) => Action::Next,
            ("prev", None) => Action::Prev,
            ("go", Some(arg)) => Action::Go(parse_target(arg).ok_or_else(unknown)?),
            ("zoom", Some(arg)) => Action::Zoom(match arg {
                "+" => ZoomCmd::In,
                "-" => ZoomCmd::Out,
                "fit" => ZoomCmd::Fit,
                "fill" => ZoomCmd::Fill,
                other => match other.parse::<f64>() {
                    Ok(z) if z.is_finite() && z > 0.0 => ZoomCmd::Exact(z),
                    _ => return Err(unknown()),
                },
            }),
            ("brightness", Some(arg)) => Action::Brightness(match arg {
                "+" => BrightnessCmd::Up,
                "-" => BrightnessCmd::Down,
                "0" => BrightnessCmd::Reset,
                _ => return Err(unknown()),
            }),
            ("left", None) => Action::Left,
            ("right", None) => Action::Right,
            ("scroll_up", None) => Action::ScrollUp,
            ("scroll_down", None) => Action::ScrollDown,
            ("scroll_left", None) => Action::ScrollLeft,
            ("scroll_right", None) => Action::ScrollRight,
            ("page_up", None) => Action::PageUp,
            ("page_down", None) => Action::PageDown,
            ("home", None) => Action::Home,
            ("end", None) => Action::End,
            ("space", None) => Action::Space,
            ("shift_space", None) => Action::ShiftSpace,
            ("toggle_list", None) => Action::ToggleList,
            ("toggle_help", None) => Action::ToggleHelp,
            ("mode_drop", None) => Action::ModeDrop,
            ("info", None) => Action::Info,
            ("back", None) => Action::Back,
            ("forward", None) => Action::Forward,
            ("slideshow", None) => Action::Slideshow,
            ("list_left", None) => Action::ListLeft,
            ("list_right", None) => Action::ListRight,
            ("list_home", None) => Action::ListHome,
            ("list_end", None) => Action::ListEnd,
            ("list_submit", None) => Action::ListSubmit,
            ("quit", None) => Action::Quit,
            _ => return Err(unknown()),
        };
        Ok(action)
    }
}

fn parse_target(arg: &str) -> Option<Target> {
    if arg == "len" {
        return Some(Target::Last);
    }
    if arg == "n" {
        return Some(Target::Relative(0));
    }
    if let Some(offset) = arg.strip_prefix("n+") {
        return offset.parse().ok().map(Target::Relative);
    }
    if let Some(offset) = arg.strip_prefix("n-") {
        return offset.parse::<i64>().ok().map(|o| Target::Relative(-o));
    }
    arg.parse().ok().map(Target::Absolute)
}

// ---------------------------------------------------------------------------
// Binding table
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBinding {
    keys: KeyList,
    action: String,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub keys: Vec<KeyCombo>,
    pub action: Action,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: BTreeMap<Context, Vec<Binding>>,
    index: HashMap<Context, HashMap<KeyCombo, Action>>,
}

impl Keymap {
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_KEYS_TOML)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| GalleryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let keymap = Self::from_toml(&text)?;
        log::info!("Loaded key bindings from {}", path.display());
        Ok(keymap)
    }

    /// Parse a table and validate every context, key label and action.
    /// Any unknown name rejects the whole table.
    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawBinding>> = toml::from_str(text)?;
        let mut keymap = Keymap::default();

        for (context_name, entries) in raw {
            let context = Context::from_name(&context_name)
                .ok_or_else(|| GalleryError::UnknownContext(context_name.clone()))?;

            let mut bindings = Vec::with_capacity(entries.len());
            for entry in entries {
                let action: Action =
                    entry
                        .action
                        .parse()
                        .map_err(|UnknownAction(action)| GalleryError::UnknownAction {
                            context: context_name.clone(),
                            action,
                        })?;
                let labels = match entry.keys {
                    KeyList::One(k) => vec![k],
                    KeyList::Many(ks) => ks,
                };
                let mut keys: Vec<KeyCombo> = Vec::with_capacity(labels.len());
                for label in labels {
                    let combo = KeyCombo::parse(&label).ok_or_else(|| GalleryError::InvalidKey {
                        context: context_name.clone(),
                        key: label.clone(),
                    })?;
                    if !keys.contains(&combo) {
                        keys.push(combo);
                    }
                }
                bindings.push(Binding {
                    keys,
                    action,
                    description: entry.description.filter(|d| !d.is_empty()),
                });
            }
            keymap.insert(context, bindings);
        }
        Ok(keymap)
    }

    /// First binding for a key wins; later ones are reported and ignored.
    fn insert(&mut self, context: Context, bindings: Vec<Binding>) {
        let index = self.index.entry(context).or_default();
        for binding in &bindings {
            for key in &binding.keys {
                if let Some(existing) = index.get(key) {
                    log::warn!(
                        "Key {} in context {:?} is already bound to {:?}; ignoring {:?}",
                        key,
                        context.name(),
                        existing,
                        binding.action
                    );
                    continue;
                }
                index.insert(key.clone(), binding.action);
            }
        }
        self.bindings.insert(context, bindings);
    }

    /// Look the key up in the active context, then in `Any`.
    pub fn lookup(&self, active: Context, key: &KeyCombo) -> Option<Action> {
        [active, Context::Any]
            .into_iter()
            .find_map(|ctx| self.index.get(&ctx).and_then(|keys| keys.get(key)).copied())
    }

    /// Described bindings per context, for the help overlay and `--help`.
    pub fn help_lines(&self) -> Vec<(Context, String, String)> {
        let mut lines = Vec::new();
        for (context, bindings) in &self.bindings {
            for b in bindings {
                if let Some(desc) = &b.description {
                    let keys: Vec<String> = b.keys.iter().map(|k| k.to_string()).collect();
                    lines.push((*context, keys.join(", "), desc.clone()));
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(label: &str) -> KeyCombo {
        KeyCombo::parse(label).unwrap()
    }

    #[test]
    fn parses_labels() {
        assert_eq!(key("j"), KeyCombo::new("j"));
        assert_ne!(key("j"), key("J"));
        assert_eq!(key("Minus"), KeyCombo::new("-"));
        assert_eq!(key("-"), KeyCombo::new("-"));
        assert_eq!(key("S-?"), KeyCombo::new("?"));
        let alt_left = key("Alt-Left");
        assert!(alt_left.mods.alt && !alt_left.mods.shift);
        assert_eq!(alt_left, key("A-Left"));
        assert_eq!(key("A--").key, "-");
        assert!(key("S-Space").mods.shift);
        assert_eq!(key("S-Space").to_string(), "S-Space");
        assert_eq!(key("KP5").key, "KP5");
        assert!(KeyCombo::parse("KP10").is_none());
        assert!(KeyCombo::parse("Hyper-x").is_none());
        assert!(KeyCombo::parse("Banana").is_none());
        assert!(KeyCombo::parse("").is_none());
    }

    #[test]
    fn parses_actions() {
        assert_eq!("go(len)".parse::<Action>(), Ok(Action::Go(Target::Last)));
        assert_eq!("go(n+5)".parse::<Action>(), Ok(Action::Go(Target::Relative(5))));
        assert_eq!("go(n-5)".parse::<Action>(), Ok(Action::Go(Target::Relative(-5))));
        assert_eq!("go(1)".parse::<Action>(), Ok(Action::Go(Target::Absolute(1))));
        assert_eq!("zoom('fit')".parse::<Action>(), Ok(Action::Zoom(ZoomCmd::Fit)));
        assert_eq!("zoom(\"+\")".parse::<Action>(), Ok(Action::Zoom(ZoomCmd::In)));
        assert_eq!("zoom(1)".parse::<Action>(), Ok(Action::Zoom(ZoomCmd::Exact(1.0))));
        assert_eq!("brightness(-)".parse::<Action>(), Ok(Action::Brightness(BrightnessCmd::Down)));
        assert_eq!("".parse::<Action>(), Ok(Action::Disabled));
        assert!("videoSeek(5)".parse::<Action>().is_err());
        assert!("zoom(0)".parse::<Action>().is_err());
        assert!("next(".parse::<Action>().is_err());
    }

    #[test]
    fn builtin_table_loads() {
        let km = Keymap::builtin().unwrap();
        assert_eq!(
            km.lookup(Context::Viewer, &key("3")),
            Some(Action::Go(Target::Relative(5)))
        );
        assert_eq!(km.lookup(Context::Viewer, &key("J")), Some(Action::Next));
        assert_eq!(km.lookup(Context::Viewer, &key("K")), Some(Action::Prev));
        // global fallback
        assert_eq!(km.lookup(Context::Viewer, &key("o")), Some(Action::Info));
        // context-specific binding shadows the global one
        assert_eq!(km.lookup(Context::Help, &key("5")), Some(Action::Disabled));
        assert_eq!(km.lookup(Context::ItemList, &key("5")), Some(Action::ModeDrop));
        assert_eq!(km.lookup(Context::Viewer, &key("5")), Some(Action::ToggleList));
        // unbound
        assert_eq!(km.lookup(Context::Viewer, &key("z")), None);
        assert!(!km.help_lines().is_empty());
    }

    #[test]
    fn first_binding_wins_on_conflict() {
        let km = Keymap::from_toml(
            r#"
            [[Viewer]]
            keys = ["x", "y"]
            action = "next"

            [[Viewer]]
            keys = "x"
            action = "prev"
            "#,
        )
        .unwrap();
        assert_eq!(km.lookup(Context::Viewer, &key("x")), Some(Action::Next));
        assert_eq!(km.lookup(Context::Viewer, &key("y")), Some(Action::Next));
    }

    #[test]
    fn rejects_unknown_names_at_load_time() {
        let bad_action = "[[Viewer]]\nkeys = [\"x\"]\naction = \"launchMissiles()\"\n";
        assert!(matches!(
            Keymap::from_toml(bad_action),
            Err(GalleryError::UnknownAction { .. })
        ));

        let bad_context = "[[Nowhere]]\nkeys = [\"x\"]\naction = \"next\"\n";
        assert!(matches!(
            Keymap::from_toml(bad_context),
            Err(GalleryError::UnknownContext(_))
        ));

        let bad_key = "[[Viewer]]\nkeys = [\"Super-Duper\"]\naction = \"next\"\n";
        assert!(matches!(
            Keymap::from_toml(bad_key),
            Err(GalleryError::InvalidKey { .. })
        ));
    }
}
