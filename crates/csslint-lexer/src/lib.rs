//! csslint lexer
//!
//! Style-tags CSS, Less and SCSS source the way an editor highlighter does:
//! every lexeme becomes a [`RawToken`] carrying a [`Style`] and its 0-based
//! start position. The grammar checker in `csslint-parser` consumes these
//! tokens and never looks at characters itself.
//!
//! # Example
//!
//! ```
//! use csslint_lexer::{Dialect, Scanner, Style};
//!
//! let tokens = Scanner::tokenize("p{}", Dialect::Css);
//! assert_eq!(tokens[0].style, Style::Tag);
//! assert_eq!(tokens.last().unwrap().style, Style::Eof);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Dialect, RawToken, Style};

/// An integer style code outside the known [`Style`] range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("unknown style code {0}")]
    UnknownStyle(u8),
}

/// A dialect name that is not `css`, `less` or `scss`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialectError {
    #[error("unknown dialect '{0}' (expected css, less or scss)")]
    Unknown(String),
}
