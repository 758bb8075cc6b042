use toml::value::Table;

/// Decides whether a layer built earlier can be reused.
pub(crate) trait CacheMatcher {
    fn matches(&self, metadata: &Table, key: &str, sha: &str) -> bool;
}

/// Compares the checksum recorded in the layer metadata with the one of the resolved dependency.
pub(crate) struct CacheHandler;

impl CacheMatcher for CacheHandler {
    fn matches(&self, metadata: &Table, key: &str, sha: &str) -> bool {
        metadata
            .get(key)
            .and_then(toml::Value::as_str)
            .is_some_and(|cached_sha| cached_sha == sha)
    }
}
