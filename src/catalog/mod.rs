//! The video catalog: one-shot ingestion plus the search facade
//!
//! `Catalog::build` consumes the corpus in a single pass and fills the
//! text index, the video store and the channel, speaker and tag side
//! indexes. The returned value is immutable and can be shared across
//! threads; there is no way to observe a half-built catalog.
//!
//! Searches route on the query string:
//! - no query: refine the video store directly
//! - query: rank with the text index and resolve ids in the store; the
//!   refinement is not applied to text results
//!
//! Both paths then sort by the requested property (descending, stable)
//! and cut the same page window.

mod refinement;

use std::collections::BTreeSet;

use crate::config::FieldBoosts;
use crate::error::{IngestError, SearchError};
use crate::indexer::TextIndex;
use crate::model::{Channel, Speaker, Video};
use crate::store::{paginate, sort_stable, Collection, SortKey, StoreError};

pub use refinement::{FilterField, Refinement};

/// Parameters of a video search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text query; `None` or blank selects the structured path
    pub query: Option<String>,
    pub refinement: Refinement,
    /// Results are sorted on this field, highest first
    pub sort_property: String,
    /// Zero-based page number
    pub page: usize,
    /// Page size used to compute the skip offset
    pub hits_per_page: usize,
    /// Hard cap on the number of results returned
    pub max_hits_per_query: usize,
}

impl SearchRequest {
    pub fn new(sort_property: impl Into<String>) -> Self {
        Self {
            query: None,
            refinement: Refinement::new(),
            sort_property: sort_property.into(),
            page: 0,
            hits_per_page: 20,
            max_hits_per_query: 20,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = refinement;
        self
    }

    pub fn with_page(
        mut self,
        page: usize,
        hits_per_page: usize,
        max_hits_per_query: usize,
    ) -> Self {
        self.page = page;
        self.hits_per_page = hits_per_page;
        self.max_hits_per_query = max_hits_per_query;
        self
    }

    /// The query string if it has any non-whitespace content
    fn text_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Records skipped before the page starts
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.hits_per_page)
    }

    /// Records returned at most; one page, never more than the query cap
    pub fn limit(&self) -> usize {
        self.hits_per_page.min(self.max_hits_per_query)
    }
}

/// Entity counts of a built catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub videos: usize,
    pub channels: usize,
    pub speakers: usize,
    pub tags: usize,
}

/// Immutable, fully indexed video corpus
pub struct Catalog {
    text_index: TextIndex,
    videos: Collection<Video>,
    speakers: Collection<Speaker>,
    channels: Collection<Channel>,
    tags: BTreeSet<String>,
    /// Scalar attribute names seen on any video; the filterable extras
    attributes: BTreeSet<String>,
}

impl Catalog {
    /// Ingest every video in order; a duplicate `objectID` aborts the build
    pub fn build<I>(videos: I, boosts: FieldBoosts) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = Video>,
    {
        let mut text_index = TextIndex::builder(boosts)?;
        let mut store = Collection::new("videos");
        let mut speakers = Collection::new("speakers");
        let mut channels = Collection::new("channels");
        let mut tags = BTreeSet::new();
        let mut attributes = BTreeSet::new();

        for video in videos {
            text_index.add(&video)?;

            if let Some(speaker) = &video.speaker {
                if speaker.twitter.is_empty() {
                    tracing::debug!(
                        "Speaker {:?} of {} has no handle",
                        speaker.name,
                        video.object_id
                    );
                } else if !speakers.contains_key(&speaker.twitter) {
                    speakers.insert_if_absent(speaker.clone());
                }
            }

            if !channels.contains_key(&video.channel_id) {
                channels.insert_if_absent(Channel {
                    id: video.channel_id.clone(),
                    title: video.channel_title.clone(),
                });
            }

            tags.extend(video.tags.iter().flatten().cloned());
            attributes.extend(video.scalar_attribute_names().map(str::to_string));

            store.insert(video).map_err(|err| match err {
                StoreError::DuplicateKey { key, .. } => IngestError::DuplicateObjectId(key),
            })?;
        }

        let catalog = Self {
            text_index: text_index.finish()?,
            videos: store,
            speakers,
            channels,
            tags,
            attributes,
        };

        let stats = catalog.stats();
        tracing::info!(
            "Catalog ready: {} videos, {} channels, {} speakers, {} tags",
            stats.videos,
            stats.channels,
            stats.speakers,
            stats.tags
        );

        Ok(catalog)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            videos: self.videos.len(),
            channels: self.channels.len(),
            speakers: self.speakers.len(),
            tags: self.tags.len(),
        }
    }

    /// Look up a single video by `objectID`
    pub fn video(&self, object_id: &str) -> Option<&Video> {
        self.videos.by_key(object_id)
    }

    /// All channels by title, ascending; ties keep first-seen order
    pub fn search_channels(&self) -> Vec<&Channel> {
        self.channels
            .query(|_| true, Some(SortKey::asc("title")), 0, usize::MAX)
    }

    /// All distinct tags, ascending
    pub fn search_tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }

    /// All speakers by display name, ascending; ties keep first-seen order
    pub fn search_speakers(&self) -> Vec<&Speaker> {
        self.speakers
            .query(|_| true, Some(SortKey::asc("name")), 0, usize::MAX)
    }

    /// Run a video search
    ///
    /// Records missing `sort_property` sort as the lowest value and land at
    /// the end. With a text query, relevance only picks the candidates and
    /// breaks ties, and the refinement is ignored.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<&Video>, SearchError> {
        if request.hits_per_page == 0 || request.max_hits_per_query == 0 {
            return Err(SearchError::InvalidPagination);
        }

        let sort = SortKey::desc(&request.sort_property);

        let Some(query) = request.text_query() else {
            let refinement = &request.refinement;
            self.check_refinement(refinement)?;
            tracing::debug!("Structured search sorted on {}", request.sort_property);
            return Ok(self.videos.query(
                |v| refinement.matches(v),
                Some(sort),
                request.offset(),
                request.limit(),
            ));
        };

        tracing::debug!("Text search for {:?} sorted on {}", query, request.sort_property);
        let hits = self.text_index.search(query)?;
        let candidates: Vec<&Video> = hits
            .iter()
            .filter_map(|hit| {
                let video = self.videos.by_key(&hit.object_id);
                if video.is_none() {
                    tracing::debug!("Dropping hit {} missing from the store", hit.object_id);
                }
                video
            })
            .collect();

        Ok(paginate(
            sort_stable(candidates, sort),
            request.offset(),
            request.limit(),
        ))
    }

    fn check_refinement(&self, refinement: &Refinement) -> Result<(), SearchError> {
        for (field, _) in refinement.conditions() {
            if let FilterField::Attribute(name) = field {
                if !self.attributes.contains(name) {
                    return Err(SearchError::UnknownField(name.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn video(id: &str, title: &str, channel: (&str, &str), satisfaction: Option<i64>) -> Video {
        let mut doc = json!({
            "objectID": id,
            "title": title,
            "channelId": channel.0,
            "channelTitle": channel.1,
        });
        if let Some(s) = satisfaction {
            doc["satisfaction"] = Value::from(s);
        }
        serde_json::from_value(doc).unwrap()
    }

    fn with_speaker(mut v: Video, name: &str, handle: &str) -> Video {
        v.speaker = Some(
            serde_json::from_value(json!({ "name": name, "twitter": handle })).unwrap(),
        );
        v
    }

    fn with_tags(mut v: Video, tags: &[&str]) -> Video {
        v.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        v
    }

    fn build(videos: Vec<Video>) -> Catalog {
        Catalog::build(videos, FieldBoosts::default()).unwrap()
    }

    fn satisfaction(videos: &[&Video]) -> Vec<i64> {
        videos
            .iter()
            .map(|v| v.attributes["satisfaction"].as_i64().unwrap())
            .collect()
    }

    fn ids<'a>(videos: &[&'a Video]) -> Vec<&'a str> {
        videos.iter().map(|v| v.object_id.as_str()).collect()
    }

    #[test]
    fn test_channels_deduplicated_and_sorted_by_title() {
        let catalog = build(vec![
            video("v1", "One", ("c1", "Chan"), None),
            video("v2", "Two", ("c2", "Alpha"), None),
            video("v3", "Three", ("c1", "Chan"), None),
        ]);

        let channels = catalog.search_channels();
        let titles: Vec<_> = channels.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Chan"]);
        assert_eq!(catalog.search_channels(), channels);
    }

    #[test]
    fn test_first_channel_and_speaker_win() {
        let catalog = build(vec![
            with_speaker(video("v1", "One", ("c1", "First"), None), "Ada", "@ada"),
            with_speaker(video("v2", "Two", ("c1", "Renamed"), None), "Ada L.", "@ada"),
            with_speaker(video("v3", "Three", ("c2", "Other"), None), "Bob", "@bob"),
            with_speaker(video("v4", "Four", ("c2", "Other"), None), "Nobody", ""),
        ]);

        let channels = catalog.search_channels();
        assert_eq!(channels[0].title, "First");
        assert_eq!(channels.len(), 2);

        let speakers: Vec<_> = catalog
            .search_speakers()
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(speakers, vec!["Ada", "Bob"]);
    }

    #[test]
    fn test_speakers_sorted_stably_by_name() {
        let catalog = build(vec![
            with_speaker(video("v1", "One", ("c1", "C"), None), "Zed", "@z"),
            with_speaker(video("v2", "Two", ("c1", "C"), None), "Amy", "@amy2"),
            with_speaker(video("v3", "Three", ("c1", "C"), None), "Amy", "@amy1"),
        ]);

        let handles: Vec<_> = catalog
            .search_speakers()
            .into_iter()
            .map(|s| s.twitter.as_str())
            .collect();
        assert_eq!(handles, vec!["@amy2", "@amy1", "@z"]);
    }

    #[test]
    fn test_tags_sorted_and_deduplicated() {
        let catalog = build(vec![
            with_tags(video("v1", "One", ("c1", "C"), None), &["rust", "async"]),
            video("v2", "Two", ("c1", "C"), None),
            with_tags(video("v3", "Three", ("c1", "C"), None), &["async", "Go", "c++"]),
        ]);

        assert_eq!(catalog.search_tags(), vec!["Go", "async", "c++", "rust"]);
    }

    #[test]
    fn test_tags_sort_by_utf8_bytes() {
        // U+FF21 is above the surrogate range in UTF-16 but below U+1F600 in UTF-8
        let catalog = build(vec![with_tags(
            video("v1", "One", ("c1", "C"), None),
            &["\u{1F600}", "\u{FF21}", "z"],
        )]);

        assert_eq!(catalog.search_tags(), vec!["z", "\u{FF21}", "\u{1F600}"]);
    }

    #[test]
    fn test_duplicate_object_id_aborts_build() {
        let result = Catalog::build(
            vec![
                video("v1", "One", ("c1", "C"), None),
                video("v1", "Again", ("c1", "C"), None),
            ],
            FieldBoosts::default(),
        );

        assert!(matches!(result, Err(IngestError::DuplicateObjectId(id)) if id == "v1"));
    }

    #[test]
    fn test_structured_search_filters_and_sorts_descending() {
        let catalog = build(vec![
            video("v1", "One", ("c1", "C"), Some(1)),
            video("v2", "Two", ("c2", "D"), Some(10)),
            video("v3", "Three", ("c1", "C"), Some(3)),
            video("v4", "Four", ("c2", "D"), Some(7)),
            video("v5", "Five", ("c1", "C"), Some(2)),
        ]);

        let request = SearchRequest::new("satisfaction")
            .with_refinement(Refinement::new().with("channelId", "c1"))
            .with_page(0, 10, 10);
        let results = catalog.search(&request).unwrap();

        assert_eq!(satisfaction(&results), vec![3, 2, 1]);
    }

    #[test]
    fn test_blank_query_uses_structured_path() {
        let catalog = build(vec![
            video("v1", "One", ("c1", "C"), Some(1)),
            video("v2", "Two", ("c1", "C"), Some(2)),
        ]);

        let request = SearchRequest::new("satisfaction").with_query("   ");
        assert_eq!(ids(&catalog.search(&request).unwrap()), vec!["v2", "v1"]);
    }

    #[test]
    fn test_text_search_resorts_by_property() {
        let mut videos: Vec<Video> = (0..8)
            .map(|i| video(&format!("o{}", i), &format!("Deep dive {}", i), ("c1", "C"), Some(i)))
            .collect();
        // "Intro" twice in the title should outrank a single mention
        videos.push(video("i1", "Intro to X intro", ("c1", "C"), Some(2)));
        videos.push(video("i2", "Intro to X", ("c2", "D"), Some(9)));
        let catalog = build(videos);

        let request = SearchRequest::new("satisfaction")
            .with_query("intro")
            .with_page(0, 5, 5);
        let results = catalog.search(&request).unwrap();

        assert_eq!(ids(&results), vec!["i2", "i1"]);
        assert_eq!(satisfaction(&results), vec![9, 2]);
    }

    #[test]
    fn test_text_search_ties_keep_relevance_order() {
        let catalog = build(vec![
            video("v1", "rust", ("c1", "C"), Some(5)),
            video("v2", "rust rust rust", ("c1", "C"), Some(5)),
        ]);

        let request = SearchRequest::new("satisfaction").with_query("rust");
        let results = catalog.search(&request).unwrap();

        assert_eq!(results.len(), 2);
        let hits = catalog.text_index.search("rust").unwrap();
        let relevance: Vec<_> = hits.iter().map(|h| h.object_id.as_str()).collect();
        assert_eq!(ids(&results), relevance);
    }

    #[test]
    fn test_text_search_ignores_refinement() {
        let catalog = build(vec![
            video("v1", "Intro to Rust", ("c1", "C"), Some(1)),
            video("v2", "Intro to Go", ("c2", "D"), Some(2)),
        ]);

        let request = SearchRequest::new("satisfaction")
            .with_query("go")
            .with_refinement(Refinement::new().with("channelId", "c1"));
        assert_eq!(ids(&catalog.search(&request).unwrap()), vec!["v2"]);

        // unknown attributes are only checked on the structured path
        let request = SearchRequest::new("satisfaction")
            .with_query("intro")
            .with_refinement(Refinement::new().with("colour", "red"));
        assert_eq!(ids(&catalog.search(&request).unwrap()), vec!["v2", "v1"]);
    }

    #[test]
    fn test_text_hit_missing_from_store_is_dropped() {
        let kept = video("v1", "Intro to Rust", ("c1", "C"), Some(1));
        let ghost = video("ghost", "Intro to Go", ("c1", "C"), Some(9));

        let mut builder = TextIndex::builder(FieldBoosts::default()).unwrap();
        builder.add(&kept).unwrap();
        builder.add(&ghost).unwrap();
        let mut videos = Collection::new("videos");
        videos.insert(kept).unwrap();

        let catalog = Catalog {
            text_index: builder.finish().unwrap(),
            videos,
            speakers: Collection::new("speakers"),
            channels: Collection::new("channels"),
            tags: BTreeSet::new(),
            attributes: BTreeSet::new(),
        };
        assert_eq!(catalog.text_index.num_docs(), 2);

        let request = SearchRequest::new("satisfaction").with_query("intro");
        assert_eq!(ids(&catalog.search(&request).unwrap()), vec!["v1"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let catalog = build(vec![video("v1", "Intro to Rust", ("c1", "C"), Some(1))]);

        let request = SearchRequest::new("satisfaction")
            .with_query("zzz_no_match")
            .with_page(0, 5, 5);
        assert!(catalog.search(&request).unwrap().is_empty());

        let request = SearchRequest::new("satisfaction")
            .with_refinement(Refinement::new().with("channelId", "nope"));
        assert!(catalog.search(&request).unwrap().is_empty());
    }

    #[test]
    fn test_missing_sort_property_sorts_last() {
        let catalog = build(vec![
            video("v1", "One", ("c1", "C"), None),
            video("v2", "Two", ("c1", "C"), Some(1)),
            video("v3", "Three", ("c1", "C"), None),
            video("v4", "Four", ("c1", "C"), Some(4)),
        ]);

        let results = catalog.search(&SearchRequest::new("satisfaction")).unwrap();
        assert_eq!(ids(&results), vec!["v4", "v2", "v1", "v3"]);

        let results = catalog.search(&SearchRequest::new("noSuchField")).unwrap();
        assert_eq!(ids(&results), vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn test_pagination_window() {
        let catalog = build(
            (0..25)
                .map(|i| video(&format!("v{}", i), "Talk", ("c1", "C"), Some(i)))
                .collect(),
        );

        let page = |page, per_page, max_hits| {
            let request = SearchRequest::new("satisfaction").with_page(page, per_page, max_hits);
            satisfaction(&catalog.search(&request).unwrap())
        };

        assert_eq!(page(0, 10, 10), (15..25).rev().collect::<Vec<_>>());
        assert_eq!(page(2, 10, 10), (0..5).rev().collect::<Vec<_>>());
        assert!(page(3, 10, 10).is_empty());
        // skip is driven by the page size, take is capped by both sizes
        assert_eq!(page(1, 10, 3), vec![14, 13, 12]);
        assert_eq!(page(1, 3, 10), vec![21, 20, 19]);

        let text = SearchRequest::new("satisfaction")
            .with_query("talk")
            .with_page(1, 10, 3);
        assert_eq!(satisfaction(&catalog.search(&text).unwrap()), vec![14, 13, 12]);
    }

    #[test]
    fn test_invalid_requests() {
        let catalog = build(vec![video("v1", "Intro", ("c1", "C"), Some(1))]);

        let zero = SearchRequest::new("satisfaction").with_page(0, 0, 10);
        assert!(matches!(catalog.search(&zero), Err(SearchError::InvalidPagination)));

        let unknown = SearchRequest::new("satisfaction")
            .with_refinement(Refinement::new().with("colour", "red"));
        assert!(matches!(
            catalog.search(&unknown),
            Err(SearchError::UnknownField(name)) if name == "colour"
        ));

        let bad_query = SearchRequest::new("satisfaction").with_query("nosuchfield:intro");
        assert!(matches!(catalog.search(&bad_query), Err(SearchError::QuerySyntax(_))));

        // a failed query leaves the catalog usable
        let ok = SearchRequest::new("satisfaction").with_query("intro");
        assert_eq!(catalog.search(&ok).unwrap().len(), 1);
    }

    #[test]
    fn test_rebuilding_same_corpus_is_identical() {
        let corpus = || {
            vec![
                with_tags(
                    with_speaker(video("v1", "One", ("c2", "B"), Some(1)), "Ada", "@ada"),
                    &["rust", "intro"],
                ),
                with_tags(video("v2", "Two", ("c1", "A"), Some(2)), &["go", "rust"]),
            ]
        };
        let a = build(corpus());
        let b = build(corpus());

        assert_eq!(a.search_tags(), b.search_tags());
        assert_eq!(a.search_channels(), b.search_channels());
        assert_eq!(a.search_speakers(), b.search_speakers());
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_concurrent_searches() {
        let catalog = build(
            (0..50)
                .map(|i| {
                    let title = format!("Talk {}", i % 5);
                    video(&format!("v{}", i), &title, ("c1", "C"), Some(i))
                })
                .collect(),
        );
        let request = SearchRequest::new("satisfaction").with_query("talk");
        let expected: Vec<String> = catalog
            .search(&request)
            .unwrap()
            .iter()
            .map(|v| v.object_id.clone())
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        catalog
                            .search(&request)
                            .unwrap()
                            .iter()
                            .map(|v| v.object_id.clone())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
