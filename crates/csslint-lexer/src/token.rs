use std::fmt;
use std::str::FromStr;

use crate::{DialectError, StyleError};

/// Lexical category assigned to a token before any grammar is applied.
///
/// The discriminants are the integer style codes editors hand over when they
/// feed their own highlighter output into the linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Style {
    // Layout
    Default = 0,
    Comment = 1,

    // Literals
    Number = 2,
    String = 3,
    StringEol = 4,

    // Property names (CSS1, CSS2, CSS3, unknown)
    Identifier = 5,
    Identifier2 = 6,
    Identifier3 = 7,
    UnknownIdentifier = 8,

    Value = 9,
    Operator = 10,

    // Selector parts
    Id = 11,
    Class = 12,
    PseudoClass = 13,
    PseudoElement = 14,
    UnknownPseudoClass = 15,
    Tag = 16,
    Attribute = 17,

    Directive = 18,
    Important = 19,
    Variable = 20,

    // End of input
    Eof = 21,
}

impl Style {
    const ALL: [Style; 22] = [
        Style::Default,
        Style::Comment,
        Style::Number,
        Style::String,
        Style::StringEol,
        Style::Identifier,
        Style::Identifier2,
        Style::Identifier3,
        Style::UnknownIdentifier,
        Style::Value,
        Style::Operator,
        Style::Id,
        Style::Class,
        Style::PseudoClass,
        Style::PseudoElement,
        Style::UnknownPseudoClass,
        Style::Tag,
        Style::Attribute,
        Style::Directive,
        Style::Important,
        Style::Variable,
        Style::Eof,
    ];

    /// Integer code of this style.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whitespace and comments carry no grammar.
    pub fn is_trivia(self) -> bool {
        matches!(self, Style::Default | Style::Comment)
    }
}

impl TryFrom<u8> for Style {
    type Error = StyleError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Style::ALL
            .get(code as usize)
            .copied()
            .ok_or(StyleError::UnknownStyle(code))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Stylesheet language being checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    #[default]
    Css,
    Less,
    Scss,
}

impl Dialect {
    /// Less and SCSS allow rulesets inside declaration blocks.
    pub fn allows_nesting(self) -> bool {
        matches!(self, Dialect::Less | Dialect::Scss)
    }

    /// Guess the dialect from a file extension (`"less"`, `"scss"`, ...).
    pub fn from_extension(extension: &str) -> Option<Self> {
        extension.parse().ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Css => "css",
            Dialect::Less => "less",
            Dialect::Scss => "scss",
        }
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Dialect::Css),
            "less" => Ok(Dialect::Less),
            "scss" => Ok(Dialect::Scss),
            _ => Err(DialectError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A style-tagged lexeme as delivered by a highlighter.
///
/// Only the start position is reliable; consumers derive the end from `text`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawToken {
    pub style: Style,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl RawToken {
    pub fn new(style: Style, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            style,
            text: text.into(),
            line,
            column,
        }
    }

    /// Build a token from an integer style code.
    pub fn from_code(
        code: u8,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Result<Self, StyleError> {
        Ok(Self::new(Style::try_from(code)?, text, line, column))
    }
}

impl serde::Serialize for Style {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Style {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Style::try_from(code).map_err(serde::de::Error::custom)
    }
}
