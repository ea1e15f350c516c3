//! Selector Matching
//!
//! The `querySelector` subset Focal needs: type, `*`, `#id`, `.class`,
//! `[attr]`, `[attr=value]`, `:not(compound)`, descendant combinators and
//! comma-separated lists.

use std::str::FromStr;

use crate::{DomTree, NodeId};
use crate::node::ElementData;

/// Selector parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character '{ch}' at offset {pos}")]
    Unexpected { ch: char, pos: usize },

    #[error("expected identifier at offset {0}")]
    ExpectedIdent(usize),

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unsupported pseudo-class :{0}")]
    UnsupportedPseudo(String),

    #[error("unexpected end of selector")]
    UnexpectedEnd,
}

/// Simple selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
    Not(Box<Compound>),
}

impl SimpleSelector {
    fn matches(&self, el: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => el.tag == *tag,
            Self::Id(id) => el.id.as_deref() == Some(id.as_str()),
            Self::Class(class) => el.classes.iter().any(|c| c == class),
            Self::Attr { name, value: None } => el.has_attr(name),
            Self::Attr { name, value: Some(v) } => el.get_attr(name) == Some(v.as_str()),
            Self::Not(inner) => !inner.matches(el),
        }
    }
}

/// Sequence of simple selectors that all apply to one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

impl Compound {
    pub fn matches(&self, el: &ElementData) -> bool {
        self.parts.iter().all(|p| p.matches(el))
    }
}

/// Compounds joined by descendant combinators, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub compounds: Vec<Compound>,
}

impl Selector {
    /// Check if an element node matches
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(tree, id, n - 1),
        }
    }

    fn matches_at(&self, tree: &DomTree, id: NodeId, idx: usize) -> bool {
        let Some(el) = tree.element(id) else {
            return false;
        };
        if !self.compounds[idx].matches(el) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        let mut ancestor = tree.parent(id);
        while let Some(a) = ancestor {
            if self.matches_at(tree, a, idx - 1) {
                return true;
            }
            ancestor = tree.parent(a);
        }
        false
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser { input, pos: 0 }.parse_list()
    }

    /// Check if any selector in the list matches
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, id))
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        let pos = self.pos;
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(ch) => Err(SelectorError::Unexpected { ch, pos }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        if self.pos == start {
            return Err(SelectorError::ExpectedIdent(start));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut selectors = Vec::new();
        loop {
            self.skip_ws();
            selectors.push(self.parse_selector()?);
            self.skip_ws();
            let pos = self.pos;
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(ch) => return Err(SelectorError::Unexpected { ch, pos }),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_selector(&mut self) -> Result<Selector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') | Some(')') => break,
                Some(_) if had_ws => compounds.push(self.parse_compound()?),
                Some(ch) => return Err(SelectorError::Unexpected { ch, pos: self.pos }),
            }
        }
        Ok(Selector { compounds })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                parts.push(SimpleSelector::Universal);
            }
            Some(c) if c.is_alphabetic() => {
                parts.push(SimpleSelector::Tag(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    parts.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    parts.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => parts.push(self.parse_attr()?),
                Some(':') => parts.push(self.parse_pseudo()?),
                _ => break,
            }
        }

        if parts.is_empty() {
            return match self.peek() {
                Some(ch) => Err(SelectorError::Unexpected { ch, pos: self.pos }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(Compound { parts })
    }

    fn parse_attr(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let value = match self.peek() {
            Some('=') => {
                self.bump();
                self.skip_ws();
                let value = match self.peek() {
                    Some(q @ ('"' | '\'')) => self.quoted(q)?,
                    _ => self.ident()?,
                };
                self.skip_ws();
                Some(value)
            }
            _ => None,
        };
        self.expect(']')?;
        Ok(SimpleSelector::Attr { name, value })
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let start = self.pos;
        self.bump();
        let body_start = self.pos;
        loop {
            match self.bump() {
                Some(c) if c == quote => {
                    return Ok(self.input[body_start..self.pos - c.len_utf8()].to_string());
                }
                Some(_) => {}
                None => return Err(SelectorError::UnterminatedString(start)),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.expect(':')?;
        let name = self.ident()?;
        if !name.eq_ignore_ascii_case("not") {
            return Err(SelectorError::UnsupportedPseudo(name));
        }
        self.expect('(')?;
        self.skip_ws();
        let inner = self.parse_compound()?;
        self.skip_ws();
        self.expect(')')?;
        Ok(SimpleSelector::Not(Box::new(inner)))
    }
}
