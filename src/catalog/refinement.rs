//! Equality refinements for structured video queries

use serde_json::{Map, Value};
use std::fmt;

use crate::error::SearchError;
use crate::model::{FieldValue, Video};

/// A field a refinement can test
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterField {
    ObjectId,
    Title,
    ChannelId,
    ChannelTitle,
    /// `speaker.twitter`
    SpeakerHandle,
    /// `speaker.name`
    SpeakerName,
    /// `tags`; matches when the video carries the tag
    Tag,
    /// Any other scalar attribute of the source document
    Attribute(String),
}

impl FilterField {
    /// Map a document field name to a filter field
    pub fn parse(name: &str) -> Self {
        match name {
            "objectID" => Self::ObjectId,
            "title" => Self::Title,
            "channelId" => Self::ChannelId,
            "channelTitle" => Self::ChannelTitle,
            "speaker.twitter" => Self::SpeakerHandle,
            "speaker.name" => Self::SpeakerName,
            "tags" => Self::Tag,
            other => Self::Attribute(other.to_string()),
        }
    }

    /// The document field name
    pub fn name(&self) -> &str {
        match self {
            Self::ObjectId => "objectID",
            Self::Title => "title",
            Self::ChannelId => "channelId",
            Self::ChannelTitle => "channelTitle",
            Self::SpeakerHandle => "speaker.twitter",
            Self::SpeakerName => "speaker.name",
            Self::Tag => "tags",
            Self::Attribute(name) => name,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality conditions, all of which must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refinement {
    conditions: Vec<(FilterField, FieldValue)>,
}

impl Refinement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on a field given by its document name
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((FilterField::parse(field), value.into()));
        self
    }

    /// Build from a JSON object such as `{"channelId": "c1"}`
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, SearchError> {
        let mut refinement = Self::new();
        for (name, value) in object {
            let value = FieldValue::from_json(value)
                .ok_or_else(|| SearchError::NonScalarValue(name.clone()))?;
            refinement.conditions.push((FilterField::parse(name), value));
        }
        Ok(refinement)
    }

    pub fn conditions(&self) -> &[(FilterField, FieldValue)] {
        &self.conditions
    }

    /// True when the video satisfies every condition
    pub fn matches(&self, video: &Video) -> bool {
        self.conditions.iter().all(|(field, expected)| match field {
            FilterField::Tag => match expected {
                FieldValue::String(tag) => video.has_tag(tag),
                _ => false,
            },
            _ => video.field(field.name()).as_ref() == Some(expected),
        })
    }
}
