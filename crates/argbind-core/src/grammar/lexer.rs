//! Usage template tokenizer.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::GrammarSyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Open(char),
    Close(char),
    Pipe,
    Ellipsis,
    /// `<name>`
    Positional(String),
    /// `--name` or `--name=<value>`
    Option { name: String, takes_value: bool },
    /// Bare word, only valid as part of the leading command path.
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset into the usage text.
    pub position: usize,
}

struct Patterns {
    split: Regex,
    positional: Regex,
    option: Regex,
    word: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, String> {
        let build = |pattern: &str| Regex::new(pattern).map_err(|e| e.to_string());
        Ok(Self {
            split: build(r"[\[\]()|]|[^\s\[\]()|]+")?,
            positional: build(r"^<([A-Za-z_][A-Za-z0-9_]*)>$")?,
            option: build(r"^--([A-Za-z_][A-Za-z0-9_]*)(=<[A-Za-z_][A-Za-z0-9_]*>)?$")?,
            word: build(r"^[a-z][a-z0-9_]*$")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, GrammarSyntaxError> {
    static PATTERNS: OnceLock<Result<Patterns, String>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| GrammarSyntaxError::Pattern(e.clone()))
}

/// Split `text` into tokens. `...` glued to an argument becomes its own token.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, GrammarSyntaxError> {
    let patterns = patterns()?;
    let mut tokens = Vec::new();

    for found in patterns.split.find_iter(text) {
        let raw = found.as_str();
        let position = found.start();

        let (body, repeat) = match raw.strip_suffix("...") {
            Some(body) => (body, true),
            None => (raw, false),
        };

        if !body.is_empty() {
            tokens.push(Token {
                kind: classify(patterns, body, position)?,
                position,
            });
        }
        if repeat {
            tokens.push(Token {
                kind: TokenKind::Ellipsis,
                position: position + body.len(),
            });
        }
    }
    Ok(tokens)
}

fn classify(patterns: &Patterns, raw: &str, position: usize) -> Result<TokenKind, GrammarSyntaxError> {
    let kind = match raw {
        "[" | "(" => raw.chars().next().map(TokenKind::Open),
        "]" | ")" => raw.chars().next().map(TokenKind::Close),
        "|" => Some(TokenKind::Pipe),
        _ => patterns
            .positional
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|name| TokenKind::Positional(name.as_str().to_string()))
            .or_else(|| {
                patterns.option.captures(raw).and_then(|caps| {
                    caps.get(1).map(|name| TokenKind::Option {
                        name: name.as_str().to_string(),
                        takes_value: caps.get(2).is_some(),
                    })
                })
            })
            .or_else(|| {
                patterns
                    .word
                    .is_match(raw)
                    .then(|| TokenKind::Word(raw.to_string()))
            }),
    };

    kind.ok_or_else(|| GrammarSyntaxError::MalformedToken {
        token: raw.to_string(),
        position,
    })
}
