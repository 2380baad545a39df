use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of the implicit bucket holding text that precedes the first heading.
pub const INTRODUCTION: &str = "Introduction";

/// Structured text extracted from one article fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub body_text: String,
    pub sections: Vec<String>,
    pub section_text: SectionTexts,
}

impl SourceDocument {
    pub fn has_body(&self) -> bool {
        !self.body_text.is_empty()
    }
}

/// A source document together with the cleaned markup it was read from.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub document: SourceDocument,
    pub raw_html: String,
}

/// Ordered, read-only `section -> text` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTexts {
    entries: Vec<(String, String)>,
}

impl SectionTexts {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, text)| text.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SectionTexts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, text) in &self.entries {
            map.serialize_entry(key, text)?;
        }
        map.end()
    }
}

struct SectionTextsVisitor;

impl<'de> Visitor<'de> for SectionTextsVisitor {
    type Value = SectionTexts;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of section names to text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut builder = SectionTextBuilder::empty();
        while let Some((key, text)) = access.next_entry::<String, String>()? {
            builder.open(&key);
            builder.append(&key, &text);
        }
        Ok(builder.finish())
    }
}

impl<'de> Deserialize<'de> for SectionTexts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionTextsVisitor)
    }
}

/// Accumulates section text while walking markup, then freezes into `SectionTexts`.
#[derive(Debug, Default)]
pub struct SectionTextBuilder {
    entries: Vec<(String, String)>,
}

impl SectionTextBuilder {
    /// Starts with an empty "Introduction" buffer.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.open(INTRODUCTION);
        builder
    }

    fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Opens an empty buffer for `name`. Reopening an existing name clears its
    /// buffer but keeps its original position.
    pub fn open(&mut self, name: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, text)) => text.clear(),
            None => self.entries.push((name.to_string(), String::new())),
        }
    }

    /// Appends to the buffer for `name`, opening it first if needed.
    pub fn append(&mut self, name: &str, text: &str) {
        if let Some((_, buffer)) = self.entries.iter_mut().find(|(key, _)| key == name) {
            buffer.push_str(text);
        } else {
            self.entries.push((name.to_string(), text.to_string()));
        }
    }

    pub fn finish(self) -> SectionTexts {
        SectionTexts {
            entries: self.entries,
        }
    }
}
