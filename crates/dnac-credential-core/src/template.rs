//! Injector template parsing
//!
//! Injector values are Jinja-style strings. Only the substitution subset is
//! supported: literal text and `{{ field_id }}` references. Filters,
//! expressions, statements (`{% %}`) and comments (`{# #}`) are rejected so
//! that a template can never silently evaluate to something other than the
//! field it names.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Template parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{{` without a closing `}}`
    #[error("unterminated expression starting at byte {0}")]
    Unterminated(usize),

    /// Anything other than a bare field reference inside the delimiters
    #[error("unsupported template expression '{0}'")]
    Unsupported(String),
}

/// Piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Reference(String),
}

/// A parsed injector template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

fn identifier() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

fn delimiter() -> &'static Regex {
    static DELIM: OnceLock<Regex> = OnceLock::new();
    DELIM.get_or_init(|| Regex::new(r"\{[{%#]").expect("valid delimiter regex"))
}

/// Whether `name` is a valid field id / template identifier
pub fn is_identifier(name: &str) -> bool {
    identifier().is_match(name)
}

impl Template {
    /// Parse a template string
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        while let Some(found) = delimiter().find_at(source, cursor) {
            if found.start() > cursor {
                segments.push(Segment::Literal(source[cursor..found.start()].to_string()));
            }

            let open = found.as_str();
            if open != "{{" {
                let tail = &source[found.start()..];
                let end = tail.find(&['}', '\n'][..]).map(|i| i + 1).unwrap_or(tail.len());
                return Err(TemplateError::Unsupported(tail[..end].to_string()));
            }

            let body_start = found.end();
            let close = source[body_start..]
                .find("}}")
                .ok_or(TemplateError::Unterminated(found.start()))?;
            let body = source[body_start..body_start + close].trim();

            if !is_identifier(body) {
                return Err(TemplateError::Unsupported(body.to_string()));
            }
            segments.push(Segment::Reference(body.to_string()));
            cursor = body_start + close + 2;
        }

        if cursor < source.len() {
            segments.push(Segment::Literal(source[cursor..].to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Field ids referenced, in order of appearance
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Reference(id) => Some(id.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The field id if the template is exactly one reference (surrounding
    /// whitespace allowed)
    pub fn single_reference(&self) -> Option<&str> {
        let mut reference = None;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) if text.trim().is_empty() => {}
                Segment::Literal(_) => return None,
                Segment::Reference(id) if reference.is_none() => reference = Some(id.as_str()),
                Segment::Reference(_) => return None,
            }
        }
        reference
    }

    /// Substitute references using `resolve`
    pub fn render<E, F>(&self, mut resolve: F) -> Result<String, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Reference(id) => out.push_str(&resolve(id)?),
            }
        }
        Ok(out)
    }
}
