//! Recursive-descent parser from tokens to a usage AST.

use super::lexer::{Token, TokenKind};
use crate::error::GrammarSyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Positional {
        name: String,
    },
    Option {
        name: String,
        takes_value: bool,
    },
    Repeat(Box<Node>),
    Group {
        required: bool,
        alternatives: Vec<Vec<Node>>,
    },
}

impl Node {
    /// Argument names referenced anywhere below this node, first occurrence first.
    pub(crate) fn names(&self, out: &mut Vec<String>) {
        match self {
            Self::Positional { name, .. } | Self::Option { name, .. } => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Self::Repeat(inner) => inner.names(out),
            Self::Group { alternatives, .. } => alternatives
                .iter()
                .flatten()
                .for_each(|node| node.names(out)),
        }
    }
}

const fn closing_for(open: char) -> char {
    if open == '(' {
        ')'
    } else {
        ']'
    }
}

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
}

impl<'a> Parser<'a> {
    pub(crate) const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Parse the whole token stream as one top-level sequence.
    pub(crate) fn parse(mut self) -> Result<Vec<Node>, GrammarSyntaxError> {
        let mut alternatives = self.alternatives(None)?;
        Ok(alternatives.pop().unwrap_or_default())
    }

    fn alternatives(
        &mut self,
        open: Option<(char, usize)>,
    ) -> Result<Vec<Vec<Node>>, GrammarSyntaxError> {
        let mut done: Vec<Vec<Node>> = Vec::new();
        let mut current: Vec<Node> = Vec::new();

        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            match &token.kind {
                TokenKind::Open(c) => {
                    let alternatives = self.alternatives(Some((*c, token.position)))?;
                    if alternatives.iter().all(Vec::is_empty) {
                        return Err(GrammarSyntaxError::EmptyGroup {
                            position: token.position,
                        });
                    }
                    current.push(Node::Group {
                        required: *c == '(',
                        alternatives,
                    });
                }
                TokenKind::Close(c) => {
                    return match open {
                        Some((o, _)) if closing_for(o) == *c => {
                            done.push(current);
                            Ok(done)
                        }
                        _ => Err(GrammarSyntaxError::UnexpectedClose {
                            close: *c,
                            position: token.position,
                        }),
                    };
                }
                TokenKind::Pipe => {
                    if open.is_none() {
                        return Err(GrammarSyntaxError::AlternationOutsideGroup {
                            position: token.position,
                        });
                    }
                    done.push(std::mem::take(&mut current));
                }
                TokenKind::Ellipsis => match current.pop() {
                    Some(node @ (Node::Positional { .. } | Node::Option { .. })) => {
                        current.push(Node::Repeat(Box::new(node)));
                    }
                    _ => {
                        return Err(GrammarSyntaxError::MisplacedRepeat {
                            position: token.position,
                        })
                    }
                },
                TokenKind::Positional(name) => {
                    current.push(Node::Positional { name: name.clone() });
                }
                TokenKind::Option { name, takes_value } => current.push(Node::Option {
                    name: name.clone(),
                    takes_value: *takes_value,
                }),
                TokenKind::Word(word) => {
                    return Err(GrammarSyntaxError::MalformedToken {
                        token: word.clone(),
                        position: token.position,
                    })
                }
            }
        }

        match open {
            Some((open, position)) => Err(GrammarSyntaxError::UnclosedGroup { open, position }),
            None => {
                done.push(current);
                Ok(done)
            }
        }
    }
}
