use std::collections::BTreeMap;

/// Fixed mapping from logical dataset names to their upstream relative paths.
///
/// The registry is the source of truth for which datasets exist: the facade
/// rejects names that are not listed here, and the background refresh loop
/// enumerates it to keep every known dataset warm.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    datasets: BTreeMap<String, String>,
}

impl DatasetRegistry {
    /// Build a registry from `(name, relative path)` pairs.
    pub fn new<N, P, I>(entries: I) -> Self
    where
        N: Into<String>,
        P: Into<String>,
        I: IntoIterator<Item = (N, P)>,
    {
        Self {
            datasets: entries
                .into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
        }
    }

    /// The catalog served by the original deployment. `specifications` is an
    /// alias resolving to the same document as `models`.
    pub fn catalog() -> Self {
        Self::new([
            ("dataAgreements", "data/dataAgreements.json"),
            ("domains", "data/dataDomains.json"),
            ("models", "data/dataModels.json"),
            ("specifications", "data/dataModels.json"),
            ("theme", "data/theme.json"),
            ("menu", "data/menuItems.json"),
            ("applications", "data/applications.json"),
            ("lexicon", "data/lexicon.json"),
            ("reference", "data/reference.json"),
        ])
    }

    /// Upstream relative path for a dataset name, if registered.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.datasets.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// All registered dataset names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// All `(name, path)` pairs, for the refresh sweep.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.datasets
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_expected_datasets() {
        let registry = DatasetRegistry::catalog();

        assert_eq!(registry.len(), 9);
        assert!(registry.contains("domains"));
        assert!(registry.contains("theme"));
        assert_eq!(registry.get("menu"), Some("data/menuItems.json"));
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn specifications_alias_shares_models_path() {
        let registry = DatasetRegistry::catalog();

        assert_eq!(registry.get("specifications"), registry.get("models"));
    }

    #[test]
    fn names_and_entries_agree() {
        let registry = DatasetRegistry::new([("a", "data/a.json"), ("b", "data/b.json")]);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["a", "b"]);

        let entries: Vec<_> = registry.entries().collect();
        assert_eq!(entries, vec![("a", "data/a.json"), ("b", "data/b.json")]);
    }

    #[test]
    fn empty_registry() {
        let registry = DatasetRegistry::default();

        assert!(registry.is_empty());
        assert_eq!(registry.names().count(), 0);
    }
}
