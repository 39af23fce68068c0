use indexmap::IndexMap;

/// The (attraction, wait-status) pairs observed in one scrape.
///
/// Keys are attraction names in page order, each present at most once.
/// An empty value means the page showed no wait time (closed, no data).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttractionSnapshot {
    entries: IndexMap<String, String>,
}

impl AttractionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a wait status for `name`.
    ///
    /// Empty names are ignored. A repeated name keeps its first position and
    /// takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, wait: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.entries.insert(name, wait.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Attraction names in page order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttractionSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (name, wait) in iter {
            snapshot.insert(name, wait);
        }
        snapshot
    }
}
