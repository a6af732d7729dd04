//! Prompt template parsing and rendering.
//!
//! Placeholders are `{ident}` where `ident` is ASCII alphanumerics and `_`.
//! `{{` and `}}` render as literal braces. Templates are parsed once into
//! segments so rendering is a straight concatenation.

use std::collections::BTreeSet;

use dobi_types::error::PromptError;
use dobi_types::prompt::ContextBag;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed, immutable prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    output_key: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse raw template text.
    pub fn parse(
        name: impl Into<String>,
        output_key: impl Into<String>,
        text: &str,
    ) -> Result<Self, PromptError> {
        let name = name.into();
        let malformed = |reason: String| PromptError::MalformedTemplate {
            template: name.clone(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut ident = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        ident.push(c);
                    }
                    if !closed {
                        return Err(malformed(format!("unterminated '{{' at byte {pos}")));
                    }
                    if ident.is_empty()
                        || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    {
                        return Err(malformed(format!("invalid placeholder '{{{ident}}}'")));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(ident));
                }
                '}' => {
                    return Err(malformed(format!("unmatched '}}' at byte {pos}")));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            name,
            output_key: output_key.into(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Distinct placeholder names, sorted.
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(p) => Some(p.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute every placeholder from `bag`.
    ///
    /// Fails on the first placeholder (in template order) the bag lacks.
    pub fn render(&self, bag: &ContextBag) -> Result<String, PromptError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(key) => {
                    let value = bag.get(key).ok_or_else(|| PromptError::MissingPlaceholder {
                        template: self.name.clone(),
                        placeholder: key.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}
