//! Author disambiguation: abbreviation or name → canonical author key.

use crate::store::ReferenceStore;
use crate::types::{AuthorMapping, Disambiguation};

/// Resolve an author token to its canonical key, using `work` to choose
/// between homonymous authors. `None` means the author is not recognized.
pub fn resolve_author(store: &ReferenceStore, author: &str, work: &str) -> Option<String> {
    let author = author.to_lowercase();

    if store.is_author_name(&author) {
        return Some(author);
    }

    return match store.abbreviation(&author)? {
        AuthorMapping::Direct(key) => Some(key.clone()),
        AuthorMapping::NeedsWorkContext(marker) => Some(by_work(store, *marker, work).to_string()),
    };
}

/// First candidate whose work table recognizes `work`, else the marker's default.
fn by_work(store: &ReferenceStore, marker: Disambiguation, work: &str) -> &'static str {
    let work = work.to_lowercase();
    if work.is_empty() {
        return marker.default_identity();
    }

    let chosen = marker.candidates().iter().copied().find(|candidate| {
        return store.works(candidate).is_some_and(|table| return table.recognizes(&work));
    });

    if let Some(identity) = chosen {
        tracing::trace!(work = %work, identity, "homonym chosen by work");
        return identity;
    }
    return marker.default_identity();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn store() -> ReferenceStore {
        return ReferenceStore::bundled().unwrap();
    }

    #[test]
    fn canonical_name_short_circuits() {
        assert_eq!(resolve_author(&store(), "shakespeare", "").as_deref(), Some("shakespeare"));
    }

    #[test]
    fn direct_abbreviation() {
        assert_eq!(resolve_author(&store(), "Soph.", "ot").as_deref(), Some("sophocles"));
    }

    #[test]
    fn naturalist_pliny_by_work() {
        let store = store();
        assert_eq!(resolve_author(&store, "plin.", "nat. hist.").as_deref(), Some("pliny_senior"));
        assert_eq!(resolve_author(&store, "plin.", "nh").as_deref(), Some("pliny_senior"));
    }

    #[test]
    fn epistolary_pliny_by_work() {
        assert_eq!(resolve_author(&store(), "plin.", "ep.").as_deref(), Some("pliny_junior"));
    }

    #[test]
    fn unknown_work_falls_back_to_default() {
        let store = store();
        for _ in 0..3 {
            assert_eq!(resolve_author(&store, "plin.", "").as_deref(), Some("pliny_senior"));
            assert_eq!(resolve_author(&store, "plin.", "zzz").as_deref(), Some("pliny_senior"));
            assert_eq!(resolve_author(&store, "sen.", "zzz").as_deref(), Some("seneca_junior"));
        }
    }

    #[test]
    fn rhetorical_seneca_by_work() {
        assert_eq!(resolve_author(&store(), "sen.", "contr.").as_deref(), Some("seneca_senior"));
    }

    #[test]
    fn unknown_author() {
        assert_eq!(resolve_author(&store(), "xyz.", "ot"), None);
    }
}
