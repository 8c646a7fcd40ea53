//! Tantivy-based full-text index over videos
//!
//! The index lives in RAM and is written exactly once: a `TextIndexBuilder`
//! takes every video, then `finish` commits and hands back a read-only
//! `TextIndex`. Only `objectID` is stored; hits are resolved against the
//! structured store by the caller.

mod query;
mod schema;

use tantivy::collector::TopDocs;
use tantivy::query::{
    BooleanQuery, BoostQuery, Occur, Query, QueryParser, QueryParserError, RegexQuery,
};
use tantivy::schema::{Field, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use crate::config::FieldBoosts;
use crate::error::SearchError;
use crate::model::Video;

use query::{Clause, ClauseKind};
use schema::Fields;

/// Writer heap for the one-shot build (single thread)
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// A ranked match from the text index
#[derive(Debug, Clone, PartialEq)]
pub struct TextHit {
    pub object_id: String,
    pub score: f32,
}

/// Collects videos into a fresh in-memory index
pub struct TextIndexBuilder {
    index: Index,
    writer: IndexWriter,
    fields: Fields,
    boosts: FieldBoosts,
    docs_added: u64,
}

impl TextIndexBuilder {
    /// Index one video under title, speaker name, tags and channel title
    pub fn add(&mut self, video: &Video) -> tantivy::Result<()> {
        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.object_id, &video.object_id);
        doc.add_text(self.fields.title, &video.title);
        if let Some(speaker) = &video.speaker {
            doc.add_text(self.fields.speaker, &speaker.name);
        }
        for tag in video.tags.iter().flatten() {
            doc.add_text(self.fields.tags, tag);
        }
        doc.add_text(self.fields.channel_title, &video.channel_title);

        self.writer.add_document(doc)?;
        self.docs_added += 1;
        Ok(())
    }

    /// Commit everything added so far and open the index for reading
    pub fn finish(mut self) -> tantivy::Result<TextIndex> {
        self.writer.commit()?;
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::debug!("Text index committed with {} documents", self.docs_added);

        Ok(TextIndex {
            index: self.index,
            reader,
            fields: self.fields,
            boosts: self.boosts,
        })
    }
}

/// Read-only full-text index, safe to search from many threads
pub struct TextIndex {
    index: Index,
    reader: IndexReader,
    fields: Fields,
    boosts: FieldBoosts,
}

impl TextIndex {
    /// Start building a new in-memory index
    pub fn builder(boosts: FieldBoosts) -> tantivy::Result<TextIndexBuilder> {
        let (schema, fields) = schema::build_schema();
        let index = Index::create_in_ram(schema);
        let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;

        Ok(TextIndexBuilder {
            index,
            writer,
            fields,
            boosts,
            docs_added: 0,
        })
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Run a query and return every match, best first
    ///
    /// Unprefixed terms search all text fields and are OR-ed together;
    /// `title:rust`, `+must`, `-not` and `"phrase"` follow Tantivy's
    /// query grammar. A trailing `*` on a single term (`intro*`,
    /// `title:intro*`) matches every term starting with that prefix.
    pub fn search(&self, query_str: &str) -> Result<Vec<TextHit>, SearchError> {
        let searcher = self.reader.searcher();
        let query = self.build_query(query_str)?;

        // Collect the full match set; pagination happens after re-sorting
        let limit = (searcher.num_docs() as usize).max(1);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let retrieved_doc: TantivyDocument = searcher.doc(doc_address)?;
            if let Some(object_id) = retrieved_doc
                .get_first(self.fields.object_id)
                .and_then(|v| v.as_str())
            {
                hits.push(TextHit {
                    object_id: object_id.to_string(),
                    score,
                });
            }
        }

        Ok(hits)
    }

    fn query_parser(&self) -> QueryParser {
        let mut query_parser = QueryParser::for_index(&self.index, self.fields.searchable());
        for field in self.fields.searchable() {
            query_parser.set_field_boost(field, self.boost(field));
        }
        query_parser
    }

    fn boost(&self, field: Field) -> f32 {
        if field == self.fields.title {
            self.boosts.title
        } else if field == self.fields.speaker {
            self.boosts.speaker
        } else if field == self.fields.tags {
            self.boosts.tags
        } else {
            self.boosts.channel_title
        }
    }

    /// Parse the whole string, or clause by clause when it holds wildcards
    fn build_query(&self, query_str: &str) -> Result<Box<dyn Query>, SearchError> {
        let query_parser = self.query_parser();
        if !query::has_wildcard(query_str) {
            return Ok(query_parser.parse_query(query_str)?);
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for Clause { occur, kind } in query::split_clauses(query_str) {
            let clause = match kind {
                ClauseKind::Wildcard { field, prefix } => self.prefix_query(field, prefix)?,
                ClauseKind::Parsed(text) => query_parser.parse_query(text)?,
            };
            clauses.push((occur, clause));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// Terms starting with `prefix` in one named field, or in every text field
    fn prefix_query(
        &self,
        field: Option<&str>,
        prefix: &str,
    ) -> Result<Box<dyn Query>, SearchError> {
        let fields = match field {
            Some(name) => vec![self
                .fields
                .searchable_by_name(name)
                .ok_or_else(|| QueryParserError::FieldDoesNotExist(name.to_string()))?],
            None => self.fields.searchable(),
        };

        // The default tokenizer lowercases, and the prefix is alphanumeric only
        let pattern = format!("{}.*", prefix.to_lowercase());
        let mut per_field: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(fields.len());
        for field in fields {
            let regex = RegexQuery::from_pattern(&pattern, field)?;
            let boosted: Box<dyn Query> =
                Box::new(BoostQuery::new(Box::new(regex), self.boost(field)));
            per_field.push((Occur::Should, boosted));
        }
        Ok(Box::new(BooleanQuery::new(per_field)))
    }
}
