//! URI templates such as `/users/{userId}/orders/{orderId}`.
//!
//! A template compiles to an ordered list of [`Segment`]s: literal text that must appear in
//! the path verbatim, and named parameters that capture whatever lies between two literals.
//! Compilation happens once, when an action is registered, so malformed templates fail at
//! startup instead of at request time.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Parameter(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unbalanced brace at byte {position} of template {template:?}")]
    UnbalancedBrace { template: String, position: usize },

    #[error("empty parameter name at byte {position} of template {template:?}")]
    EmptyParameter { template: String, position: usize },

    #[error("parameter {second:?} directly follows {first:?} in template {template:?}")]
    AdjacentParameters { template: String, first: String, second: String },
}

/// A compiled URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Scans `template` left to right, splitting it into literals and `{name}` parameters.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::UnbalancedBrace`] for a `{` without `}`, a stray `}` or a nested `{`
    /// - [`TemplateError::EmptyParameter`] for `{}`
    /// - [`TemplateError::AdjacentParameters`] for `{a}{b}`, whose first parameter would have no end
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let unbalanced = |position| TemplateError::UnbalancedBrace { template: template.to_owned(), position };

        let mut segments = Vec::new();
        let mut rest = template;
        let mut offset = 0;

        while !rest.is_empty() {
            let Some(open) = rest.find(['{', '}']) else {
                segments.push(Segment::Literal(rest.to_owned()));
                break;
            };
            if rest.as_bytes()[open] == b'}' {
                return Err(unbalanced(offset + open));
            }
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_owned()));
            }

            let after_open = &rest[open + 1..];
            let close = after_open.find(['{', '}']).ok_or_else(|| unbalanced(offset + open))?;
            if after_open.as_bytes()[close] == b'{' {
                return Err(unbalanced(offset + open + 1 + close));
            }

            let name = &after_open[..close];
            if name.is_empty() {
                return Err(TemplateError::EmptyParameter { template: template.to_owned(), position: offset + open });
            }
            if let Some(Segment::Parameter(first)) = segments.last() {
                return Err(TemplateError::AdjacentParameters {
                    template: template.to_owned(),
                    first: first.clone(),
                    second: name.to_owned(),
                });
            }
            segments.push(Segment::Parameter(name.to_owned()));

            let consumed = open + 1 + close + 1;
            rest = &rest[consumed..];
            offset += consumed;
        }

        Ok(Self { source: template.to_owned(), segments })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in template order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Parameter(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_names().count()
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
