//! Record types for the video catalog
//!
//! Source documents carry a handful of well-known fields plus arbitrary
//! extras. The well-known ones get typed slots with explicit presence
//! (`Option`) for `speaker` and `tags`; everything else is kept verbatim
//! in `attributes` so it can still be sorted and filtered on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// A video document as found in the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Speaker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(rename = "channelTitle", default)]
    pub channel_title: String,
    /// Every other field of the source document (e.g. `satisfaction`)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A speaker, embedded in videos and registered once per handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    #[serde(default)]
    pub name: String,
    /// Unique handle; empty when the source document has none
    #[serde(default)]
    pub twitter: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A channel derived from the `channelId`/`channelTitle` pair of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
}

impl Video {
    /// Look up a scalar field by its document name
    ///
    /// Speaker fields are reachable as `speaker.name` and `speaker.twitter`.
    /// `tags` is not scalar and always reads as `None` here.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "objectID" => Some(FieldValue::from(self.object_id.as_str())),
            "title" => Some(FieldValue::from(self.title.as_str())),
            "channelId" => Some(FieldValue::from(self.channel_id.as_str())),
            "channelTitle" => Some(FieldValue::from(self.channel_title.as_str())),
            "speaker.name" => self.speaker.as_ref().map(|s| FieldValue::from(s.name.as_str())),
            "speaker.twitter" => self
                .speaker
                .as_ref()
                .map(|s| FieldValue::from(s.twitter.as_str())),
            _ => self.attributes.get(name).and_then(FieldValue::from_json),
        }
    }

    /// Names of the extra attributes holding scalar values
    pub fn scalar_attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, v)| FieldValue::from_json(v).is_some())
            .map(|(k, _)| k.as_str())
    }

    /// True when the video carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

impl Speaker {
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(FieldValue::from(self.name.as_str())),
            "twitter" => Some(FieldValue::from(self.twitter.as_str())),
            _ => self.extra.get(name).and_then(FieldValue::from_json),
        }
    }
}

impl Channel {
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(self.id.as_str())),
            "title" => Some(FieldValue::from(self.title.as_str())),
            _ => None,
        }
    }
}

/// A scalar value usable as a sort or equality key
///
/// Values of different kinds order as `Null < Bool < Number < String`.
/// Numbers use `f64::total_cmp`, strings compare byte-wise.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl FieldValue {
    /// Convert a JSON value; arrays and objects are not scalar
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::String(_) => 3,
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_deserializes_optional_fields() {
        let video: Video = serde_json::from_value(json!({
            "objectID": "v1",
            "title": "Intro to Rust",
            "channelId": "c1",
            "channelTitle": "Chan",
            "satisfaction": 87
        }))
        .unwrap();

        assert_eq!(video.object_id, "v1");
        assert!(video.speaker.is_none());
        assert!(video.tags.is_none());
        assert_eq!(video.field("satisfaction"), Some(FieldValue::from(87i64)));
        assert_eq!(video.scalar_attribute_names().collect::<Vec<_>>(), vec!["satisfaction"]);
    }

    #[test]
    fn test_speaker_extra_metadata_is_kept() {
        let video: Video = serde_json::from_value(json!({
            "objectID": "v1",
            "title": "Talk",
            "channelId": "c1",
            "channelTitle": "Chan",
            "speaker": { "name": "Ada", "twitter": "@ada", "bio": "compilers" },
            "tags": ["rust", "compilers"]
        }))
        .unwrap();

        let speaker = video.speaker.as_ref().unwrap();
        assert_eq!(speaker.field("bio"), Some(FieldValue::from("compilers")));
        assert_eq!(video.field("speaker.twitter"), Some(FieldValue::from("@ada")));
        assert!(video.has_tag("rust"));
        assert!(!video.has_tag("go"));
        assert_eq!(video.field("tags"), None);

        let back = serde_json::to_value(&video).unwrap();
        assert_eq!(back["speaker"]["bio"], "compilers");
        assert_eq!(back["objectID"], "v1");
    }

    #[test]
    fn test_field_value_ordering() {
        let mut values = vec![
            FieldValue::from("b"),
            FieldValue::from(3.5),
            FieldValue::Null,
            FieldValue::from("B"),
            FieldValue::from(true),
            FieldValue::from(-1i64),
        ];
        values.sort();

        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::from(true),
                FieldValue::from(-1i64),
                FieldValue::from(3.5),
                FieldValue::from("B"),
                FieldValue::from("b"),
            ]
        );
        assert_eq!(FieldValue::from(1i64), FieldValue::from(1.0));
    }
}
