//! Union tagging: how the active variant of a union is marked on the wire.
//!
//! Same model as serde's enum representations:
//!
//! | kind | encoded |
//! |---|---|
//! | external | `{"Variant": value}` |
//! | internal | `{tag: "Variant", ...fields}` (record variants only) |
//! | adjacent | `{tag: "Variant", content: value}` |
//! | untagged | `value` |

use crate::{Result, SerdeErrorKind, value::Value};

/// Tagging representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaggingKind {
    #[allow(missing_docs)]
    #[default]
    External,
    #[allow(missing_docs)]
    Internal,
    #[allow(missing_docs)]
    Adjacent,
    #[allow(missing_docs)]
    Untagged,
}

/// Controls how a union is (de)serialized.
///
/// The fields are public, so an invalid combination can be built by hand;
/// [`Tagging::check`] rejects it and registration always calls it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tagging {
    /// Key holding the variant name (internal, adjacent).
    pub tag: Option<String>,
    /// Key holding the variant value (adjacent).
    pub content: Option<String>,
    /// Representation.
    pub kind: TaggingKind,
}

/// A tagged payload split into variant name and content.
#[derive(Debug, Clone, PartialEq)]
pub enum Tagged<'a> {
    /// The payload names its variant.
    Variant {
        /// Variant name as written on the wire.
        name: &'a str,
        /// The variant's value with the tagging removed.
        content: Value,
    },
    /// Untagged payload; the caller has to find the variant structurally.
    Untagged(&'a Value),
}

impl Tagging {
    /// Builds and validates a tagging.
    pub fn new(kind: TaggingKind, tag: Option<&str>, content: Option<&str>) -> Result<Self> {
        let tagging = Self {
            tag: tag.map(str::to_string),
            content: content.map(str::to_string),
            kind,
        };
        tagging.check()?;
        Ok(tagging)
    }

    /// `{"Variant": value}`. The default.
    pub const fn external() -> Self {
        Self {
            tag: None,
            content: None,
            kind: TaggingKind::External,
        }
    }

    /// `{tag: "Variant", ...fields}`.
    pub fn internal(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            content: None,
            kind: TaggingKind::Internal,
        }
    }

    /// `{tag: "Variant", content: value}`.
    pub fn adjacent(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            content: Some(content.into()),
            kind: TaggingKind::Adjacent,
        }
    }

    /// The bare value.
    pub const fn untagged() -> Self {
        Self {
            tag: None,
            content: None,
            kind: TaggingKind::Untagged,
        }
    }

    #[allow(missing_docs)]
    pub fn is_external(&self) -> bool {
        self.kind == TaggingKind::External
    }

    #[allow(missing_docs)]
    pub fn is_internal(&self) -> bool {
        self.kind == TaggingKind::Internal
    }

    #[allow(missing_docs)]
    pub fn is_adjacent(&self) -> bool {
        self.kind == TaggingKind::Adjacent
    }

    #[allow(missing_docs)]
    pub fn is_untagged(&self) -> bool {
        self.kind == TaggingKind::Untagged
    }

    /// Rejects internal tagging without `tag` and adjacent tagging without
    /// `tag` or `content`.
    pub fn check(&self) -> Result<()> {
        if self.is_internal() && self.tag.is_none() {
            return Err(SerdeErrorKind::MissingTag.into());
        }
        if self.is_adjacent() && (self.tag.is_none() || self.content.is_none()) {
            return Err(SerdeErrorKind::MissingTagOrContent.into());
        }
        Ok(())
    }

    /// Wraps an already serialized variant value.
    ///
    /// For internal tagging `value` must be a field map (a record's
    /// serialized form); the tag is inserted as its first entry.
    pub fn encode(&self, variant: &str, value: Value) -> Result<Value> {
        let name = Value::Str(variant.to_string());
        match self.kind {
            TaggingKind::External => Ok(Value::Dict(vec![(name, value)])),
            TaggingKind::Internal => {
                let tag = self.tag.as_deref().ok_or(SerdeErrorKind::MissingTag)?;
                let Value::Dict(entries) = value else {
                    return Err(SerdeErrorKind::UnsupportedType(format!(
                        "internal tagging needs a record variant, got {variant}"
                    ))
                    .into());
                };
                let mut tagged = Vec::with_capacity(entries.len() + 1);
                tagged.push((Value::Str(tag.to_string()), name));
                tagged.extend(entries);
                Ok(Value::Dict(tagged))
            }
            TaggingKind::Adjacent => {
                let (tag, content) = self.adjacent_keys()?;
                Ok(Value::Dict(vec![
                    (Value::Str(tag.to_string()), name),
                    (Value::Str(content.to_string()), value),
                ]))
            }
            TaggingKind::Untagged => Ok(value),
        }
    }

    /// Splits a tagged payload into variant name and content.
    pub fn decode<'a>(&self, data: &'a Value) -> Result<Tagged<'a>> {
        match self.kind {
            TaggingKind::External => {
                let Value::Dict(entries) = data else {
                    return Err(malformed(format!("expected a single-key mapping, got {data}")));
                };
                match entries.as_slice() {
                    [(Value::Str(name), content)] => Ok(Tagged::Variant {
                        name,
                        content: content.clone(),
                    }),
                    _ => Err(malformed(format!("expected a single-key mapping, got {data}"))),
                }
            }
            TaggingKind::Internal => {
                let tag = self.tag.as_deref().ok_or(SerdeErrorKind::MissingTag)?;
                let Value::Dict(entries) = data else {
                    return Err(malformed(format!("expected a mapping with key '{tag}', got {data}")));
                };
                let name = string_entry(entries, tag)
                    .ok_or_else(|| malformed(format!("missing tag '{tag}' in {data}")))?;
                let content = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != Some(tag))
                    .cloned()
                    .collect();
                Ok(Tagged::Variant {
                    name,
                    content: Value::Dict(content),
                })
            }
            TaggingKind::Adjacent => {
                let (tag, content_key) = self.adjacent_keys()?;
                let Value::Dict(entries) = data else {
                    return Err(malformed(format!(
                        "expected a mapping with keys '{tag}' and '{content_key}', got {data}"
                    )));
                };
                let name = string_entry(entries, tag)
                    .ok_or_else(|| malformed(format!("missing tag '{tag}' in {data}")))?;
                let content = data
                    .get(content_key)
                    .ok_or_else(|| malformed(format!("missing content '{content_key}' in {data}")))?;
                Ok(Tagged::Variant {
                    name,
                    content: content.clone(),
                })
            }
            TaggingKind::Untagged => Ok(Tagged::Untagged(data)),
        }
    }

    fn adjacent_keys(&self) -> Result<(&str, &str)> {
        match (self.tag.as_deref(), self.content.as_deref()) {
            (Some(tag), Some(content)) => Ok((tag, content)),
            _ => Err(SerdeErrorKind::MissingTagOrContent.into()),
        }
    }
}

fn string_entry<'a>(entries: &'a [(Value, Value)], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .and_then(|(_, v)| v.as_str())
}

fn malformed(msg: String) -> crate::SerdeError {
    SerdeErrorKind::MalformedTaggedValue(msg).into()
}
