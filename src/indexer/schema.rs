//! Tantivy schema definition for the video text index
//!
//! Fields:
//! - objectID: Raw string, stored (maps hits back to the store)
//! - title, speaker, tags, channelTitle: Tokenized, searchable by name

use tantivy::schema::*;

const FIELD_OBJECT_ID: &str = "objectID";
const FIELD_TITLE: &str = "title";
const FIELD_SPEAKER: &str = "speaker";
const FIELD_TAGS: &str = "tags";
const FIELD_CHANNEL_TITLE: &str = "channelTitle";

/// Handles to every field of the schema
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub object_id: Field,
    pub title: Field,
    pub speaker: Field,
    pub tags: Field,
    pub channel_title: Field,
}

impl Fields {
    /// Fields searched when a query term has no `field:` prefix
    pub fn searchable(&self) -> Vec<Field> {
        vec![self.title, self.speaker, self.tags, self.channel_title]
    }

    /// A searchable field by its query name (`title:`, `tags:`, ...)
    pub fn searchable_by_name(&self, name: &str) -> Option<Field> {
        match name {
            FIELD_TITLE => Some(self.title),
            FIELD_SPEAKER => Some(self.speaker),
            FIELD_TAGS => Some(self.tags),
            FIELD_CHANNEL_TITLE => Some(self.channel_title),
            _ => None,
        }
    }
}

/// Build the Tantivy schema for video indexing
pub fn build_schema() -> (Schema, Fields) {
    let mut schema_builder = Schema::builder();

    // Exact id, never tokenized
    let object_id = schema_builder.add_text_field(FIELD_OBJECT_ID, STRING | STORED);

    // Searchable text fields; content lives in the store, so nothing else is stored
    let text_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer("default")
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let title = schema_builder.add_text_field(FIELD_TITLE, text_options.clone());
    let speaker = schema_builder.add_text_field(FIELD_SPEAKER, text_options.clone());
    let tags = schema_builder.add_text_field(FIELD_TAGS, text_options.clone());
    let channel_title = schema_builder.add_text_field(FIELD_CHANNEL_TITLE, text_options);

    let fields = Fields {
        object_id,
        title,
        speaker,
        tags,
        channel_title,
    };

    (schema_builder.build(), fields)
}
