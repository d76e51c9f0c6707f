//! Symbol line classification
//!
//! Maps one raw listing line to a tagged [`Classification`]. The grammar is:
//!
//! ```text
//! line       := indent namespace "::" ident terminator rest
//! indent     := one or more ' '
//! ident      := [A-Za-z_][A-Za-z0-9_]*
//! terminator := ':' | ';' | '*'
//! ```
//!
//! The identifier is then tagged by its casing, first match wins:
//!
//! 1. short all-caps (`PAH`, `RNG`)  → global singleton
//! 2. `C` prefix (`CLockable`)       → class
//! 3. `T` prefix (`TSet`)            → class template
//! 4. lowercase first (`are_locked`) → free function
//!
//! A `*` terminator is only accepted for free functions. Lines that do not
//! fit the grammar are [`Classification::Unrecognized`]; the caller decides
//! what to do with them.

use serde::Serialize;

/// Default library namespace of the listed symbols
pub const DEFAULT_NAMESPACE: &str = "pwx";

/// Default longest name still treated as a global singleton
pub const DEFAULT_MAX_SINGLETON_LEN: usize = 3;

/// The kind of symbol a line names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    ClassTemplate,
    FreeFunction,
    GlobalSingleton,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::ClassTemplate => "class template",
            SymbolKind::FreeFunction => "free function",
            SymbolKind::GlobalSingleton => "global singleton",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one line, carrying the unqualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Class(String),
    ClassTemplate(String),
    FreeFunction(String),
    GlobalSingleton(String),
    Unrecognized,
}

impl Classification {
    pub fn kind(&self) -> Option<SymbolKind> {
        match self {
            Classification::Class(_) => Some(SymbolKind::Class),
            Classification::ClassTemplate(_) => Some(SymbolKind::ClassTemplate),
            Classification::FreeFunction(_) => Some(SymbolKind::FreeFunction),
            Classification::GlobalSingleton(_) => Some(SymbolKind::GlobalSingleton),
            Classification::Unrecognized => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Classification::Class(n)
            | Classification::ClassTemplate(n)
            | Classification::FreeFunction(n)
            | Classification::GlobalSingleton(n) => Some(n),
            Classification::Unrecognized => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Classification::Unrecognized)
    }
}

/// Punctuation directly after the identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Scope,
    Statement,
    Pointer,
}

impl Terminator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            ':' => Some(Terminator::Scope),
            ';' => Some(Terminator::Statement),
            '*' => Some(Terminator::Pointer),
            _ => None,
        }
    }
}

/// Line classifier for one library namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    namespace: String,
    max_singleton_len: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Classifier {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            max_singleton_len: DEFAULT_MAX_SINGLETON_LEN,
        }
    }

    pub fn with_max_singleton_len(mut self, len: usize) -> Self {
        self.max_singleton_len = len;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Classify one listing line
    pub fn classify(&self, line: &str) -> Classification {
        let Some((ident, terminator)) = self.split_line(line) else {
            return Classification::Unrecognized;
        };

        let pointer = terminator == Terminator::Pointer;
        let mut chars = ident.chars();
        let first = chars.next().unwrap_or('_');
        let has_more = ident.len() >= 2;

        if !pointer && self.is_singleton_name(ident) {
            Classification::GlobalSingleton(ident.to_string())
        } else if !pointer && first == 'C' && has_more {
            Classification::Class(ident.to_string())
        } else if !pointer && first == 'T' && has_more {
            Classification::ClassTemplate(ident.to_string())
        } else if first.is_ascii_lowercase() && has_more {
            Classification::FreeFunction(ident.to_string())
        } else {
            Classification::Unrecognized
        }
    }

    /// Split `  ns::ident<term>...` into identifier and terminator
    fn split_line<'a>(&self, line: &'a str) -> Option<(&'a str, Terminator)> {
        let body = line.trim_start_matches(' ');
        if body.len() == line.len() {
            return None;
        }

        let rest = body.strip_prefix(self.namespace.as_str())?.strip_prefix("::")?;

        let ident_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if ident_len == 0 {
            return None;
        }

        let (ident, tail) = rest.split_at(ident_len);
        if ident.as_bytes()[0].is_ascii_digit() {
            return None;
        }

        let terminator = Terminator::from_char(tail.chars().next()?)?;
        Some((ident, terminator))
    }

    fn is_singleton_name(&self, ident: &str) -> bool {
        (2..=self.max_singleton_len).contains(&ident.len())
            && ident.as_bytes()[0].is_ascii_uppercase()
            && ident
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }
}
