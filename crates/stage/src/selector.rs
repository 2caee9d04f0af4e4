use std::fmt;

use crate::{ElementId, Stage};

/// Raised when a selector string cannot be parsed. Callers that mirror the
/// querySelectorAll contract treat this as "matched nothing".
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorError {
    message: String,
}

impl SelectorError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector: {}", self.message)
    }
}

impl std::error::Error for SelectorError {}

#[derive(Clone, Debug, PartialEq)]
enum SimplePart {
    Tag(String),
    Universal,
    Id(String),
    Class(String),
    AttrPresent(String),
    AttrEq(String, String),
    NthOfType(usize),
}

#[derive(Clone, Debug, PartialEq)]
struct Compound {
    parts: Vec<SimplePart>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] sits between compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

/// A parsed structural query: comma-separated complex selectors built from
/// tag / `*` / `#id` / `.class` / `[attr]` / `[attr="value"]` /
/// `:nth-of-type(n)` parts joined by descendant and `>` combinators.
///
/// This is the subset the slide templates and the cue studio's
/// pick-an-element output actually use.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    list: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector, SelectorError> {
        let mut parser = Parser::new(input);
        let mut list = Vec::new();

        loop {
            list.push(parser.parse_complex()?);
            parser.skip_whitespace();
            if parser.eat(',') {
                continue;
            }
            if parser.at_end() {
                break;
            }
            return Err(SelectorError::new(format!(
                "unexpected character at position {}",
                parser.pos
            )));
        }

        Ok(Selector { list })
    }

    pub(crate) fn matches(&self, stage: &Stage, id: ElementId) -> bool {
        self.list
            .iter()
            .any(|complex| matches_complex(stage, id, complex))
    }
}

fn matches_complex(stage: &Stage, id: ElementId, complex: &Complex) -> bool {
    match_from(stage, id, complex, complex.compounds.len() - 1)
}

fn match_from(stage: &Stage, id: ElementId, complex: &Complex, idx: usize) -> bool {
    if !compound_matches(stage, id, &complex.compounds[idx]) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    match complex.combinators[idx - 1] {
        Combinator::Child => match stage.parent(id) {
            Some(parent) => match_from(stage, parent, complex, idx - 1),
            None => false,
        },
        Combinator::Descendant => {
            let mut cursor = stage.parent(id);
            while let Some(ancestor) = cursor {
                if match_from(stage, ancestor, complex, idx - 1) {
                    return true;
                }
                cursor = stage.parent(ancestor);
            }
            false
        }
    }
}

fn compound_matches(stage: &Stage, id: ElementId, compound: &Compound) -> bool {
    let element = stage.element(id);
    compound.parts.iter().all(|part| match part {
        SimplePart::Universal => true,
        SimplePart::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
        SimplePart::Id(wanted) => element.id.as_deref() == Some(wanted.as_str()),
        SimplePart::Class(class) => element.has_class(class),
        SimplePart::AttrPresent(name) => element.attr(name).is_some(),
        SimplePart::AttrEq(name, value) => element.attr(name).as_deref() == Some(value.as_str()),
        SimplePart::NthOfType(n) => stage.nth_of_type(id) == *n,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, wanted: char) -> bool {
        if self.peek() == Some(wanted) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace() > 0;
            if self.eat('>') {
                self.skip_whitespace();
                compounds.push(self.parse_compound()?);
                combinators.push(Combinator::Child);
            } else if had_whitespace && self.starts_compound() {
                compounds.push(self.parse_compound()?);
                combinators.push(Combinator::Descendant);
            } else {
                break;
            }
        }

        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn starts_compound(&self) -> bool {
        matches!(
            self.peek(),
            Some('*') | Some('#') | Some('.') | Some('[') | Some(':') | Some('\\')
        ) || matches!(self.peek(), Some(c) if is_ident_char(c))
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();

        if self.eat('*') {
            parts.push(SimplePart::Universal);
        } else if matches!(self.peek(), Some(c) if is_ident_char(c) || c == '\\') {
            parts.push(SimplePart::Tag(self.parse_ident()?.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    parts.push(SimplePart::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    parts.push(SimplePart::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    parts.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    parts.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err(SelectorError::new(format!(
                "expected a selector at position {}",
                self.pos
            )));
        }

        Ok(Compound { parts })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped) => {
                            out.push(escaped);
                            self.pos += 1;
                        }
                        None => return Err(SelectorError::new("dangling escape")),
                    }
                }
                Some(c) if is_ident_char(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if out.is_empty() {
            return Err(SelectorError::new(format!(
                "expected an identifier at position {}",
                self.pos
            )));
        }
        Ok(out)
    }

    fn parse_attr(&mut self) -> Result<SimplePart, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(SimplePart::AttrPresent(name));
        }
        if !self.eat('=') {
            return Err(SelectorError::new("expected '=' or ']' in attribute"));
        }
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote) if quote == '"' || quote == '\'' => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };

        self.skip_whitespace();
        if !self.eat(']') {
            return Err(SelectorError::new("unterminated attribute selector"));
        }
        Ok(SimplePart::AttrEq(name, value))
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped) => {
                            out.push(escaped);
                            self.pos += 1;
                        }
                        None => return Err(SelectorError::new("dangling escape in string")),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
                None => return Err(SelectorError::new("unterminated string")),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<SimplePart, SelectorError> {
        let name = self.parse_ident()?;
        if name != "nth-of-type" {
            return Err(SelectorError::new(format!(
                "unsupported pseudo-class ':{}'",
                name
            )));
        }
        if !self.eat('(') {
            return Err(SelectorError::new("expected '(' after :nth-of-type"));
        }
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.pos += 1;
        }
        if !self.eat(')') || digits.is_empty() {
            return Err(SelectorError::new("malformed :nth-of-type argument"));
        }
        let n: usize = digits
            .parse()
            .map_err(|_| SelectorError::new("malformed :nth-of-type argument"))?;
        Ok(SimplePart::NthOfType(n))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
