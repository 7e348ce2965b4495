//! Keystrokes as seen by the capture buffer.

use std::fmt;

/// Modifier keys. Scanners emulating a keyboard emit Shift around
/// uppercase characters; none of these ever enter a captured sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

/// Non-character keys the station reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedKey {
    Enter,
    Escape,
    Tab,
    Backspace,
    CtrlC,
    Other(String),
}

/// A single keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Modifier(Modifier),
    Named(NamedKey),
}

impl Key {
    /// Parse a DOM-style key name (`"("`, `"A"`, `"Shift"`, `"Enter"`).
    pub fn parse(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c);
        }
        match name {
            "Shift" => Key::Modifier(Modifier::Shift),
            "Control" => Key::Modifier(Modifier::Control),
            "Alt" | "AltGraph" => Key::Modifier(Modifier::Alt),
            "Meta" | "OS" => Key::Modifier(Modifier::Meta),
            "Enter" => Key::Named(NamedKey::Enter),
            "Escape" | "Esc" => Key::Named(NamedKey::Escape),
            "Tab" => Key::Named(NamedKey::Tab),
            "Backspace" => Key::Named(NamedKey::Backspace),
            other => Key::Named(NamedKey::Other(other.to_string())),
        }
    }

    /// Parse every character of `text` as a separate keystroke.
    pub fn sequence(text: &str) -> Vec<Key> {
        text.chars().map(Key::Char).collect()
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Key::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Modifier(m) => write!(f, "{:?}", m),
            Key::Named(NamedKey::Other(name)) => write!(f, "{}", name),
            Key::Named(named) => write!(f, "{:?}", named),
        }
    }
}

impl From<console::Key> for Key {
    fn from(key: console::Key) -> Self {
        match key {
            console::Key::Char(c) => Key::Char(c),
            console::Key::Enter => Key::Named(NamedKey::Enter),
            console::Key::Escape => Key::Named(NamedKey::Escape),
            console::Key::Tab => Key::Named(NamedKey::Tab),
            console::Key::Backspace => Key::Named(NamedKey::Backspace),
            console::Key::CtrlC => Key::Named(NamedKey::CtrlC),
            console::Key::Shift => Key::Modifier(Modifier::Shift),
            console::Key::Alt => Key::Modifier(Modifier::Alt),
            other => Key::Named(NamedKey::Other(format!("{:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_characters() {
        assert_eq!(Key::parse("("), Key::Char('('));
        assert_eq!(Key::parse("A"), Key::Char('A'));
        assert_eq!(Key::parse("ж"), Key::Char('ж'));
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(Key::parse("Shift"), Key::Modifier(Modifier::Shift));
        assert_eq!(Key::parse("Control"), Key::Modifier(Modifier::Control));
        assert_eq!(Key::parse("Alt"), Key::Modifier(Modifier::Alt));
        assert_eq!(Key::parse("Meta"), Key::Modifier(Modifier::Meta));
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(Key::parse("Enter"), Key::Named(NamedKey::Enter));
        assert_eq!(Key::parse("Esc"), Key::Named(NamedKey::Escape));
        assert_eq!(
            Key::parse("F5"),
            Key::Named(NamedKey::Other("F5".to_string()))
        );
    }

    #[test]
    fn test_sequence_splits_characters() {
        assert_eq!(
            Key::sequence("(1)"),
            vec![Key::Char('('), Key::Char('1'), Key::Char(')')]
        );
    }

    #[test]
    fn test_from_console_key() {
        assert_eq!(Key::from(console::Key::Char('7')), Key::Char('7'));
        assert_eq!(
            Key::from(console::Key::Enter),
            Key::Named(NamedKey::Enter)
        );
        assert_eq!(Key::from(console::Key::CtrlC), Key::Named(NamedKey::CtrlC));
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::Char('x').to_string(), "x");
        assert_eq!(Key::Modifier(Modifier::Shift).to_string(), "Shift");
        assert_eq!(Key::Named(NamedKey::Enter).to_string(), "Enter");
    }
}
