//! Reference data store: author abbreviations, canonical author records, and
//! per-author work tables, merged across the four corpus partitions.
//!
//! Built once before any resolution and never mutated afterwards. Work tables
//! are expanded at load time with every generated abbreviation of every
//! literal title; a literal title always keeps its own entry.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Deserialize;

use crate::abbrev;
use crate::error::Error;
use crate::types::{AuthorMapping, AuthorRecord, TitleOrigin, WorkEntry, WorkIdentifier};

/// One reference data partition per literary corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corpus {
    /// Greek authors (`greekLit`).
    Greek,
    /// Latin authors (`latinLit`), including the homonym markers.
    Latin,
    /// English and biblical authors.
    Other,
    /// Greek scholia.
    Scholia,
}

impl Corpus {
    /// Merge order. A later partition overrides an earlier one on key collision.
    pub const ALL: [Self; 4] = [Self::Greek, Self::Latin, Self::Scholia, Self::Other];

    /// Copy of the partition compiled into the binary.
    const fn bundled_json(self) -> &'static str {
        return match self {
            Self::Greek => include_str!("../data/greek_data.json"),
            Self::Latin => include_str!("../data/latin_data.json"),
            Self::Other => include_str!("../data/other_data.json"),
            Self::Scholia => include_str!("../data/schol_data.json"),
        };
    }

    /// File name of the partition inside a data directory.
    pub const fn file_name(self) -> &'static str {
        return match self {
            Self::Greek => "greek_data.json",
            Self::Latin => "latin_data.json",
            Self::Other => "other_data.json",
            Self::Scholia => "schol_data.json",
        };
    }
}

/// Raw JSON layout of one partition. Keys carry a corpus prefix in the data
/// files (`GREEK_AUTH_ABB`, `LATIN_AUTH_ABB`, ...); all prefixes are accepted.
#[derive(Deserialize)]
struct RawCorpus {
    /// Abbreviation → canonical key or disambiguation marker.
    #[serde(
        default,
        alias = "GREEK_AUTH_ABB",
        alias = "LATIN_AUTH_ABB",
        alias = "SCHOL_AUTH_ABB",
        alias = "OTHER_AUTH_ABB"
    )]
    auth_abb: IndexMap<String, AuthorMapping>,
    /// Canonical key → author URN stem.
    #[serde(
        default,
        alias = "GREEK_AUTH_URNS",
        alias = "LATIN_AUTH_URNS",
        alias = "SCHOL_AUTH_URNS",
        alias = "OTHER_AUTH_URNS"
    )]
    auth_urns: IndexMap<String, String>,
    /// Canonical keys of authors addressed as one default work.
    #[serde(
        default,
        alias = "GREEK_SINGLE_WORK_AUTHORS",
        alias = "LATIN_SINGLE_WORK_AUTHORS",
        alias = "SCHOL_SINGLE_WORK_AUTHORS",
        alias = "OTHER_SINGLE_WORK_AUTHORS"
    )]
    single_work_authors: Vec<String>,
    /// Canonical key → literal title → work identifier.
    #[serde(
        default,
        alias = "GREEK_WORK_URNS",
        alias = "LATIN_WORK_URNS",
        alias = "SCHOL_WORK_URNS",
        alias = "OTHER_WORK_URNS"
    )]
    work_urns: IndexMap<String, IndexMap<String, WorkIdentifier>>,
}

/// The merged, expanded, immutable reference tables.
#[derive(Debug, Default)]
pub struct ReferenceStore {
    /// Lowercase abbreviation → author mapping, across all partitions.
    abbreviations: HashMap<String, AuthorMapping>,
    /// Canonical author key → author record.
    authors: HashMap<String, AuthorRecord>,
    /// Canonical author key → expanded work table.
    works: HashMap<String, WorkTable>,
}

impl ReferenceStore {
    /// Look up an author abbreviation (already lowercase).
    pub fn abbreviation(&self, abbreviation: &str) -> Option<&AuthorMapping> {
        return self.abbreviations.get(abbreviation);
    }

    /// Look up a canonical author.
    pub fn author(&self, key: &str) -> Option<&AuthorRecord> {
        return self.authors.get(key);
    }

    /// Number of canonical authors with a URN stem.
    pub fn author_count(&self) -> usize {
        return self.authors.len();
    }

    /// Build the store from the partitions compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `Error::DataCorrupt` if a bundled partition fails to decode.
    pub fn bundled() -> Result<Self, Error> {
        let sources: Vec<(PathBuf, &str)> = Corpus::ALL
            .iter()
            .map(|corpus| return (Path::new("data").join(corpus.file_name()), corpus.bundled_json()))
            .collect();
        return Self::from_json(&sources);
    }

    /// Build the store from `(label, json)` partitions, merged in slice order.
    ///
    /// # Errors
    ///
    /// Returns `Error::DataCorrupt` naming the label of the first partition
    /// that fails to decode.
    pub fn from_json(sources: &[(PathBuf, &str)]) -> Result<Self, Error> {
        let mut raws = Vec::with_capacity(sources.len());
        for (label, json) in sources {
            let raw: RawCorpus = serde_json::from_str(json).map_err(|e| {
                return Error::DataCorrupt {
                    file: label.clone(),
                    reason: e.to_string(),
                };
            })?;
            raws.push(raw);
        }

        let single_work: HashSet<String> = raws
            .iter()
            .flat_map(|raw| return raw.single_work_authors.iter().cloned())
            .collect();

        let mut store = Self::default();
        for raw in raws {
            store.merge_partition(raw, &single_work);
        }

        for key in &single_work {
            if !store.authors.contains_key(key) {
                tracing::warn!(author = %key, "single-work author has no URN stem");
            }
        }

        tracing::debug!(
            abbreviations = store.abbreviations.len(),
            authors = store.author_count(),
            titles = store.works.values().map(WorkTable::len).sum::<usize>(),
            "reference data loaded"
        );
        return Ok(store);
    }

    /// Whether `key` is a canonical author name.
    pub fn is_author_name(&self, key: &str) -> bool {
        return self.authors.contains_key(key);
    }

    /// Whether `candidate` is an author abbreviation or a canonical author name.
    pub fn is_known_author(&self, candidate: &str) -> bool {
        return self.abbreviations.contains_key(candidate) || self.authors.contains_key(candidate);
    }

    /// Read the four partitions from `dir`, one JSON file each.
    ///
    /// # Errors
    ///
    /// Returns `Error::DataNotFound` if a partition file is missing,
    /// `Error::Io` for other read failures,
    /// or `Error::DataCorrupt` if a partition fails to decode.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let mut contents = Vec::with_capacity(Corpus::ALL.len());
        for corpus in Corpus::ALL {
            let path = dir.join(corpus.file_name());
            let json = match std::fs::read_to_string(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(Error::DataNotFound { path });
                },
                Err(e) => return Err(Error::Io(e)),
                Ok(json) => json,
            };
            contents.push((path, json));
        }

        let sources: Vec<(PathBuf, &str)> =
            contents.iter().map(|(path, json)| return (path.clone(), json.as_str())).collect();
        return Self::from_json(&sources);
    }

    /// Fold one partition into the merged tables. Work tables are expanded here.
    fn merge_partition(&mut self, raw: RawCorpus, single_work: &HashSet<String>) {
        for (abbreviation, mapping) in raw.auth_abb {
            self.abbreviations.insert(abbreviation.to_lowercase(), mapping);
        }

        for (key, stem) in raw.auth_urns {
            let record = AuthorRecord {
                single_work: single_work.contains(&key),
                stem,
            };
            self.authors.insert(key, record);
        }

        for (key, titles) in raw.work_urns {
            let table = WorkTable::expand(titles);
            if table.is_empty() {
                tracing::warn!(author = %key, "work table has no titles");
            }
            self.works.insert(key, table);
        }
    }

    /// Expanded work table for a canonical author.
    pub fn works(&self, key: &str) -> Option<&WorkTable> {
        return self.works.get(key);
    }
}

/// One author's lowercase title → work identifier table, in insertion order:
/// literal titles in source order, then generated abbreviations.
#[derive(Debug, Clone, Default)]
pub struct WorkTable {
    /// Title → entry. Insertion order is the tie-break for every scan.
    entries: IndexMap<String, WorkEntry>,
    /// Abbreviation of a title → positions in `entries` of every title that
    /// generates it, ascending.
    second_order: HashMap<String, Vec<usize>>,
}

impl WorkTable {
    /// Entries whose title generates `abbreviation`, in insertion order.
    pub fn abbreviated_as(&self, abbreviation: &str) -> impl Iterator<Item = &WorkEntry> {
        return self
            .second_order
            .get(abbreviation)
            .into_iter()
            .flatten()
            .filter_map(|&position| return self.entries.get_index(position))
            .map(|(_, entry)| return entry);
    }

    /// Build an expanded table from literal titles. Every literal is inserted
    /// first, so no generated abbreviation can displace one.
    pub fn expand(literals: IndexMap<String, WorkIdentifier>) -> Self {
        let mut entries: IndexMap<String, WorkEntry> = IndexMap::with_capacity(literals.len());

        for (title, identifier) in &literals {
            let entry = WorkEntry {
                identifier: identifier.clone(),
                origin: TitleOrigin::Literal,
            };
            entries.insert(title.to_lowercase(), entry);
        }

        for (title, identifier) in &literals {
            for abbreviation in abbrev::generate(title) {
                if let Entry::Vacant(slot) = entries.entry(abbreviation) {
                    slot.insert(WorkEntry {
                        identifier: identifier.clone(),
                        origin: TitleOrigin::Generated,
                    });
                }
            }
        }

        let mut second_order: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, title) in entries.keys().enumerate() {
            for abbreviation in abbrev::generate(title) {
                second_order.entry(abbreviation).or_default().push(position);
            }
        }

        return Self { entries, second_order };
    }

    /// Exact lookup of a lowercase title or abbreviation.
    pub fn get(&self, title: &str) -> Option<&WorkEntry> {
        return self.entries.get(title);
    }

    /// Whether the table has no titles at all.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of titles including generated abbreviations.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Whether `work` names an entry directly or through one of the generated
    /// abbreviations of an entry's title.
    pub fn recognizes(&self, work: &str) -> bool {
        return self.entries.contains_key(work) || self.second_order.contains_key(work);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::types::Disambiguation;

    fn synthetic(sources: &[&str]) -> ReferenceStore {
        let labelled: Vec<(PathBuf, &str)> =
            sources.iter().map(|json| return (PathBuf::from("test.json"), *json)).collect();
        return ReferenceStore::from_json(&labelled).unwrap();
    }

    #[test]
    fn bundled_data_loads() {
        let store = ReferenceStore::bundled().unwrap();
        assert!(store.author_count() > 20);
        assert_eq!(
            store.abbreviation("soph."),
            Some(&AuthorMapping::Direct("sophocles".to_string()))
        );
        assert_eq!(
            store.abbreviation("plin."),
            Some(&AuthorMapping::NeedsWorkContext(Disambiguation::Pliny))
        );
        assert!(store.author("thucydides").unwrap().single_work);
        assert!(!store.author("sophocles").unwrap().single_work);
    }

    #[test]
    fn expansion_adds_generated_abbreviations() {
        let store = ReferenceStore::bundled().unwrap();
        let sophocles = store.works("sophocles").unwrap();
        let ot = sophocles.get("ot").unwrap();
        assert_eq!(ot.identifier, WorkIdentifier::Simple("tlg004".to_string()));
        assert_eq!(ot.origin, TitleOrigin::Generated);
        assert_eq!(sophocles.get("electra").unwrap().origin, TitleOrigin::Literal);
    }

    #[test]
    fn literal_titles_beat_generated_abbreviations() {
        let store = synthetic(&[r#"{
            "GREEK_AUTH_URNS": {"x": "urn:cts:greekLit:tlg9999"},
            "GREEK_WORK_URNS": {"x": {"cato": "tlg001", "c.": "tlg002"}}
        }"#]);
        let table = store.works("x").unwrap();
        assert_eq!(table.get("c.").unwrap().identifier, WorkIdentifier::Simple("tlg002".to_string()));
        assert_eq!(table.get("ca.").unwrap().identifier, WorkIdentifier::Simple("tlg001".to_string()));
    }

    #[test]
    fn first_literal_claims_shared_abbreviations() {
        let store = ReferenceStore::bundled().unwrap();
        let sophocles = store.works("sophocles").unwrap();
        // Both Oedipus plays abbreviate to `oed.`; the first listed wins.
        assert_eq!(
            sophocles.get("oed.").unwrap().identifier,
            WorkIdentifier::Simple("tlg004".to_string())
        );
    }

    #[test]
    fn second_order_abbreviations_are_indexed() {
        let store = synthetic(&[r#"{
            "GREEK_AUTH_URNS": {"ar": "urn:cts:greekLit:tlg0019"},
            "GREEK_WORK_URNS": {"ar": {"Aves": "tlg006"}}
        }"#]);
        let table = store.works("ar").unwrap();
        // `aves` swaps to the key `avea`, which swaps on to `aveas`.
        assert!(table.get("aveas").is_none());
        assert!(table.recognizes("aveas"));
        let hits: Vec<_> = table.abbreviated_as("aveas").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].origin, TitleOrigin::Generated);
        assert!(!table.recognizes("birds"));
    }

    #[test]
    fn later_partition_overrides_earlier() {
        let store = synthetic(&[
            r#"{"GREEK_AUTH_ABB": {"ar.": "aristophanes"}}"#,
            r#"{"LATIN_AUTH_ABB": {"ar.": "arnobius"}}"#,
        ]);
        assert_eq!(store.abbreviation("ar."), Some(&AuthorMapping::Direct("arnobius".to_string())));
    }

    #[test]
    fn corrupt_partition_names_its_label() {
        let sources = [(PathBuf::from("data/greek_data.json"), r#"{"GREEK_WORK_URNS": {"x": {"t": ["tlg", 5, 1]}}}"#)];
        let err = ReferenceStore::from_json(&sources).unwrap_err();
        assert!(matches!(err, Error::DataCorrupt { ref file, .. } if file.ends_with("greek_data.json")));
    }

    #[test]
    fn missing_data_dir_reports_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReferenceStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::DataNotFound { ref path } if path.ends_with("greek_data.json")));
    }

    #[test]
    fn store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReferenceStore>();
    }
}
