//! Token classification.
//!
//! The same style tag means different things in a selector, a property and a
//! value, so the grammar asks these questions instead of matching on styles.

use std::sync::LazyLock;

use csslint_lexer::Style;
use regex::Regex;

use crate::tokenizer::Token;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)").expect("number pattern is valid"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^url\(.*\)$").expect("url pattern is valid"));

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color pattern is valid")
});

/// Stateless predicates over a token's style and text.
///
/// Zero-sized and `Copy`: build one and hand it to every component that
/// needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    pub fn is_attribute(&self, token: &Token) -> bool {
        token.style == Style::Attribute
    }

    pub fn is_directive(&self, token: &Token) -> bool {
        token.style == Style::Directive
    }

    /// Property-name styles, known or not.
    pub fn is_identifier(&self, token: &Token) -> bool {
        matches!(
            token.style,
            Style::Identifier
                | Style::Identifier2
                | Style::Identifier3
                | Style::UnknownIdentifier
        )
    }

    /// Id, class, pseudo-class and pseudo-element selector names.
    pub fn is_special_identifier(&self, token: &Token) -> bool {
        matches!(
            token.style,
            Style::Id
                | Style::Class
                | Style::PseudoClass
                | Style::PseudoElement
                | Style::UnknownPseudoClass
        )
    }

    /// An element name, or the universal selector `*`.
    pub fn is_tag(&self, token: &Token) -> bool {
        token.style == Style::Tag || self.is_operator(token, Some("*"))
    }

    pub fn is_operator(&self, token: &Token, text: Option<&str>) -> bool {
        token.style == Style::Operator && text.is_none_or(|t| token.text == t)
    }

    pub fn is_operator_choose(&self, token: &Token, texts: &[&str]) -> bool {
        token.style == Style::Operator && texts.contains(&token.text.as_str())
    }

    /// A number token, or a value token that begins like a number (`12px`).
    pub fn is_number(&self, token: &Token) -> bool {
        match token.style {
            Style::Number => true,
            Style::Value => NUMBER.is_match(&token.text),
            _ => false,
        }
    }

    pub fn is_string(&self, token: &Token) -> bool {
        token.style == Style::String
    }

    /// A string whose closing quote is missing.
    pub fn is_stringeol(&self, token: &Token) -> bool {
        token.style == Style::StringEol
    }

    pub fn is_value(&self, token: &Token, text: Option<&str>) -> bool {
        token.style == Style::Value && text.is_none_or(|t| token.text == t)
    }

    /// `important` keywords compare case-insensitively, like all CSS keywords.
    pub fn is_important(&self, token: &Token, text: &str) -> bool {
        token.style == Style::Important && token.text.eq_ignore_ascii_case(text)
    }

    pub fn is_variable(&self, token: &Token) -> bool {
        token.style == Style::Variable
    }

    /// A complete `url(...)` value.
    pub fn is_url(&self, token: &Token) -> bool {
        self.is_value(token, None) && URL.is_match(&token.text)
    }

    /// `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn is_hex_color(&self, token: &Token) -> bool {
        self.is_value(token, None) && HEX_COLOR.is_match(&token.text)
    }
}
