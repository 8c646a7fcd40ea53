//! In-memory record collections with a unique key
//!
//! A `Collection` keeps records in insertion order next to a key index.
//! Queries filter with a predicate, sort stably on a single field and
//! then cut an offset/limit window. Records are never removed, so the
//! insertion position doubles as the tie-break order.

use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{Channel, FieldValue, Speaker, Video};

/// A record that can live in a `Collection`
pub trait Record {
    /// The unique key of this record
    fn key(&self) -> &str;

    /// A scalar field by name, `None` when absent
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl Record for Video {
    fn key(&self) -> &str {
        &self.object_id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Video::field(self, name)
    }
}

impl Record for Speaker {
    fn key(&self) -> &str {
        &self.twitter
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Speaker::field(self, name)
    }
}

impl Record for Channel {
    fn key(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        Channel::field(self, name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate key {key:?} in collection {collection}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort on one field; records missing the field sort as the lowest value
#[derive(Debug, Clone, Copy)]
pub struct SortKey<'a> {
    pub field: &'a str,
    pub order: SortOrder,
}

impl<'a> SortKey<'a> {
    pub fn asc(field: &'a str) -> Self {
        Self {
            field,
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(field: &'a str) -> Self {
        Self {
            field,
            order: SortOrder::Descending,
        }
    }
}

/// Records in insertion order, indexed by their unique key
#[derive(Debug)]
pub struct Collection<T> {
    name: &'static str,
    records: Vec<T>,
    by_key: HashMap<String, usize>,
}

impl<T: Record> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            records: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Insert a record, rejecting a key that is already present
    pub fn insert(&mut self, record: T) -> Result<(), StoreError> {
        let key = record.key().to_string();
        if self.by_key.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                collection: self.name,
                key,
            });
        }
        self.by_key.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Insert unless the key is taken; the first record for a key wins
    pub fn insert_if_absent(&mut self, record: T) -> bool {
        if self.by_key.contains_key(record.key()) {
            return false;
        }
        self.insert(record).is_ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn by_key(&self, key: &str) -> Option<&T> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Filter, sort and paginate the whole collection
    pub fn query<F>(
        &self,
        predicate: F,
        sort: Option<SortKey<'_>>,
        offset: usize,
        limit: usize,
    ) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        let matched: Vec<&T> = self.records.iter().filter(|r| predicate(r)).collect();
        let sorted = match sort {
            Some(key) => sort_stable(matched, key),
            None => matched,
        };
        paginate(sorted, offset, limit)
    }
}

/// Stable sort of borrowed records on one field
///
/// Equal keys keep their incoming order in both directions, so callers
/// control the tie-break by the order they pass records in.
pub fn sort_stable<'r, T: Record>(records: Vec<&'r T>, key: SortKey<'_>) -> Vec<&'r T> {
    let mut keyed: Vec<(Option<FieldValue>, &T)> = records
        .into_iter()
        .map(|r| (r.field(key.field), r))
        .collect();

    // `None < Some(_)` puts records without the field at the low end
    keyed.sort_by(|(a, _), (b, _)| {
        let ord: Ordering = a.cmp(b);
        match key.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Skip `offset` records and keep at most `limit`
pub fn paginate<T>(records: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    records.into_iter().skip(offset).take(limit).collect()
}
