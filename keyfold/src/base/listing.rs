use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;

use crate::base::entry::Entry;
use crate::KeyfoldError;

/// Raw result of a single paginated listing call, surfaced by the
/// client untransformed.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
    pub is_truncated: bool,
}

/// One-call boundary to the storage backend. Implementations issue
/// exactly one network request per invocation: no retries, no
/// aggregation, no interpretation of keys.
#[async_trait]
pub trait ListingClient: Send + Sync {
    /// `continuation_token` is opaque and only valid if returned by a
    /// previous call for the same (bucket, prefix).
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, KeyfoldError>;
}

/// Reduces a bucket's flat key namespace into single-level folder
/// views, driving the client's pagination to exhaustion per call.
pub struct ListingEngine<C: ListingClient> {
    client: C,
}

impl<C: ListingClient> ListingEngine<C> {
    pub fn new(client: C) -> Self {
        ListingEngine { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the deduplicated, byte-order sorted set of immediate
    /// child entries under `prefix`. The result is a function of the
    /// complete key set only; it does not depend on how pagination
    /// split the underlying calls. Any page error aborts the whole
    /// operation, so a failed listing is never mistaken for a small
    /// folder.
    pub async fn list_children(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<Entry>, KeyfoldError> {
        if bucket.is_empty() {
            return Err(KeyfoldError::InvalidArgument(
                "bucket name must not be empty".to_string(),
            ));
        }

        let prefix = normalize_prefix(prefix);
        let mut keys: Vec<String> = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_page(bucket, &prefix, continuation_token.as_deref())
                .await?;
            keys.extend(page.keys);

            if !page.is_truncated {
                break;
            }
            match page.next_token {
                Some(token) => continuation_token = Some(token),
                // a truncated page must carry a token; stopping here
                // would silently return a partial folder
                None => {
                    return Err(KeyfoldError::Unavailable(
                        "listing truncated without a continuation \
                         token"
                            .to_string(),
                    ))
                }
            }
        }

        debug!(
            "collected {} keys under {}:{}",
            keys.len(),
            bucket,
            prefix
        );
        Ok(fold_keys(&prefix, &keys))
    }
}

/// Empty means root; anything else gets a trailing `/` so that only
/// genuine descendants match (a query prefix `foo` must not group
/// `foobar/x` under it).
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{}/", prefix)
    }
}

/// Folds flat keys into first-level entries. The BTreeMap gives keyed
/// deduplication and byte-wise ascending iteration in one step, so the
/// returned order is total and locale-independent.
fn fold_keys(prefix: &str, keys: &[String]) -> Vec<Entry> {
    let mut entries: BTreeMap<String, Entry> = BTreeMap::new();

    for key in keys {
        let remainder = match key.strip_prefix(prefix) {
            Some(remainder) => remainder,
            // the backend scopes results to the prefix already; a key
            // outside it carries no entry
            None => continue,
        };
        if remainder.is_empty() {
            // zero-byte marker object for the prefix itself
            continue;
        }

        match remainder.find('/') {
            Some(position) => {
                // note: a key like `a//b` yields the degenerate but
                // valid folder name "" at the `a/` level
                let segment = &remainder[..position];
                entries.insert(
                    segment.to_string(),
                    Entry::folder(
                        segment,
                        format!("{}{}/", prefix, segment),
                    ),
                );
            }
            None => {
                // an object never displaces a folder of the same name
                entries
                    .entry(remainder.to_string())
                    .or_insert_with(|| Entry::object(remainder));
            }
        }
    }

    entries.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::entry::EntryKind;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("docs"), "docs/");
        assert_eq!(normalize_prefix("docs/"), "docs/");
        assert_eq!(normalize_prefix("a/b"), "a/b/");
    }

    #[test]
    fn test_fold_groups_by_first_segment() {
        let folded = fold_keys(
            "",
            &keys(&["a/1", "a/2", "b/1", "readme.txt"]),
        );
        let names: Vec<&str> =
            folded.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b", "readme.txt"]);
        assert_eq!(folded[0].kind(), EntryKind::Folder);
        assert_eq!(folded[0].child_prefix(), Some("a/"));
        assert_eq!(folded[2].kind(), EntryKind::Object);
        assert_eq!(folded[2].child_prefix(), None);
    }

    #[test]
    fn test_fold_skips_marker_key() {
        let folded =
            fold_keys("docs/", &keys(&["docs/", "docs/readme.txt"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].name(), "readme.txt");
        assert_eq!(folded[0].kind(), EntryKind::Object);
    }

    #[test]
    fn test_fold_marker_key_at_root_is_a_folder() {
        let folded = fold_keys("", &keys(&["docs/", "docs/readme.txt"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].name(), "docs");
        assert_eq!(folded[0].kind(), EntryKind::Folder);
    }

    #[test]
    fn test_fold_folder_wins_name_collision() {
        // key "a" (object) and keys "a/..." (folder) share a name
        let folded = fold_keys("", &keys(&["a", "a/1"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].kind(), EntryKind::Folder);

        // same outcome regardless of arrival order
        let folded = fold_keys("", &keys(&["a/1", "a"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].kind(), EntryKind::Folder);
    }

    #[test]
    fn test_fold_consecutive_separators() {
        let folded = fold_keys("a/", &keys(&["a//b"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].name(), "");
        assert_eq!(folded[0].kind(), EntryKind::Folder);
        assert_eq!(folded[0].child_prefix(), Some("a//"));
    }

    #[test]
    fn test_fold_sorts_by_byte_order() {
        let folded = fold_keys(
            "",
            &keys(&["zz/1", "Zebra", "apple", "B/1", "a b"]),
        );
        let names: Vec<&str> =
            folded.iter().map(|e| e.name()).collect();
        // ascending byte order, not locale order
        assert_eq!(names, vec!["B", "Zebra", "a b", "apple", "zz"]);
    }

    #[test]
    fn test_fold_ignores_keys_outside_prefix() {
        let folded =
            fold_keys("foo/", &keys(&["foo/x", "foobar/x"]));
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].name(), "x");
    }
}
