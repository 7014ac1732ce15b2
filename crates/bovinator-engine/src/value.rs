//! Semantic values: what grammar actions build and the engine hands back.
//!
//! The engine itself only ever looks at a [`SemanticToken`]'s span. The
//! payload is whatever the grammar's actions decided to build, from plain
//! collected text up to a fully described [`Tag`].

use std::collections::BTreeMap;
use std::fmt;

use bovinator_syntax::Span;

/// The kind of construct a [`Tag`] describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagClass {
    Variable,
    Function,
    Type,
    Include,
    Package,
    Custom(String),
}

impl TagClass {
    pub fn name(&self) -> &str {
        match self {
            TagClass::Variable => "variable",
            TagClass::Function => "function",
            TagClass::Type => "type",
            TagClass::Include => "include",
            TagClass::Package => "package",
            TagClass::Custom(name) => name,
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named language construct with a class and free-form attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub class: TagClass,
    pub attributes: BTreeMap<String, Value>,
}

impl Tag {
    pub fn new(name: impl Into<String>, class: TagClass) -> Self {
        Self {
            name: name.into(),
            class,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A value collected by the matcher or built by an action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Nothing; what an epsilon rule collects.
    #[default]
    Nil,
    /// Source text of a matched terminal.
    Text(String),
    /// Span of a matched list span or comment.
    Span(Span),
    /// Several values, e.g. everything a rule without an action collected.
    List(Vec<Value>),
    Tag(Box<Tag>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_span(&self) -> Option<Span> {
        match self {
            Value::Span(span) => Some(*span),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Value::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Span> for Value {
    fn from(span: Span) -> Self {
        Value::Span(span)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl From<Tag> for Value {
    fn from(tag: Tag) -> Self {
        Value::Tag(Box::new(tag))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Text(text) => write!(f, "{text:?}"),
            Value::Span(span) => write!(f, "#<{span}>"),
            Value::List(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
            Value::Tag(tag) => {
                write!(f, "{} {:?}", tag.class, tag.name)?;
                for (key, value) in &tag.attributes {
                    write!(f, " :{key} {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// The output unit of a parse: a payload and the span it was matched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    pub payload: Value,
    pub span: Span,
}

impl SemanticToken {
    pub fn new(payload: impl Into<Value>, span: Span) -> Self {
        Self {
            payload: payload.into(),
            span,
        }
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        self.payload.as_tag()
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

impl fmt::Display for SemanticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.payload, self.span)
    }
}
