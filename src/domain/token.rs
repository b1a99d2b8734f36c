//! Token stream produced by the external tokenizer.
//!
//! This is the only input contract of the [`TreeBuilder`](super::TreeBuilder).
//! Tokens arrive as JSON, tagged by `kind`:
//!
//! ```text
//! [
//!   {"kind": "macro", "name": "section",
//!    "args": [{"kind": "group", "delimiter": "brace", "body": [{"kind": "chars", "text": "Intro"}]}]},
//!   {"kind": "chars", "text": "\nSome text.\n"},
//!   {"kind": "environment", "name": "figure", "args": [], "body": [...]},
//!   {"kind": "comment", "text": " a remark"}
//! ]
//! ```
//!
//! A comment's text stops at the end of the line; the newline itself is
//! delivered as the following `chars` token.

use serde::{Deserialize, Serialize};

use crate::domain::arena::Delimiter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Macro {
        name: String,
        #[serde(default)]
        args: Vec<RawArgument>,
        #[serde(default)]
        post_space: String,
    },
    Environment {
        name: String,
        #[serde(default)]
        args: Vec<RawArgument>,
        #[serde(default)]
        body: Vec<Token>,
    },
    Chars {
        text: String,
    },
    /// Brace group in the running text, not consumed as an argument
    Group {
        #[serde(default)]
        body: Vec<Token>,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupDelimiter {
    Brace,
    Bracket,
}

impl From<GroupDelimiter> for Delimiter {
    fn from(value: GroupDelimiter) -> Self {
        match value {
            GroupDelimiter::Brace => Delimiter::Brace,
            GroupDelimiter::Bracket => Delimiter::Bracket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawArgument {
    Group {
        delimiter: GroupDelimiter,
        #[serde(default)]
        body: Vec<Token>,
    },
    /// Bare macro reference, e.g. `\foo` in `\newcommand\foo{...}`
    Macro { spelling: String },
}

impl Token {
    pub fn chars(text: impl Into<String>) -> Self {
        Token::Chars { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Token::Comment { text: text.into() }
    }

    pub fn group(body: Vec<Token>) -> Self {
        Token::Group { body }
    }

    pub fn macro_call(name: impl Into<String>, args: Vec<RawArgument>) -> Self {
        Token::Macro {
            name: name.into(),
            args,
            post_space: String::new(),
        }
    }

    /// Argument-less macro followed by `post_space`, e.g. `\item `.
    pub fn bare_macro(name: impl Into<String>, post_space: impl Into<String>) -> Self {
        Token::Macro {
            name: name.into(),
            args: Vec::new(),
            post_space: post_space.into(),
        }
    }

    pub fn environment(name: impl Into<String>, args: Vec<RawArgument>, body: Vec<Token>) -> Self {
        Token::Environment {
            name: name.into(),
            args,
            body,
        }
    }

    /// Source spelling of the token.
    ///
    /// Whitespace after a control word is kept only when no argument follows,
    /// so `\textbf {x}` reads back as `\textbf{x}`.
    pub fn verbatim(&self) -> String {
        match self {
            Token::Macro {
                name,
                args,
                post_space,
            } if args.is_empty() => format!("\\{name}{post_space}"),
            Token::Macro { name, args, .. } => {
                let args: String = args.iter().map(RawArgument::verbatim).collect();
                format!("\\{name}{args}")
            }
            Token::Environment { name, args, body } => {
                let args: String = args.iter().map(RawArgument::verbatim).collect();
                let body: String = body.iter().map(Token::verbatim).collect();
                format!("\\begin{{{name}}}{args}{body}\\end{{{name}}}")
            }
            Token::Chars { text } => text.clone(),
            Token::Group { body } => {
                let body: String = body.iter().map(Token::verbatim).collect();
                format!("{{{body}}}")
            }
            Token::Comment { text } => format!("%{text}"),
        }
    }
}

impl RawArgument {
    pub fn brace(text: impl Into<String>) -> Self {
        RawArgument::Group {
            delimiter: GroupDelimiter::Brace,
            body: vec![Token::chars(text)],
        }
    }

    pub fn bracket(text: impl Into<String>) -> Self {
        RawArgument::Group {
            delimiter: GroupDelimiter::Bracket,
            body: vec![Token::chars(text)],
        }
    }

    pub fn macro_ref(spelling: impl Into<String>) -> Self {
        RawArgument::Macro {
            spelling: spelling.into(),
        }
    }

    pub fn verbatim(&self) -> String {
        match self {
            RawArgument::Group { delimiter, body } => {
                let body: String = body.iter().map(Token::verbatim).collect();
                match delimiter {
                    GroupDelimiter::Brace => format!("{{{body}}}"),
                    GroupDelimiter::Bracket => format!("[{body}]"),
                }
            }
            RawArgument::Macro { spelling } => spelling.clone(),
        }
    }
}
