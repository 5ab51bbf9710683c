//! Directory storage, indexing and lookup

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::config::DirectoryConfig;
use super::fuzzy::similarity;
use super::{DirectoryError, Keyed, LookupFlags, NAME_FIELD, ResultAdjuster, Scored};
use crate::types::NameKey;

/// One searchable string of one item
#[derive(Debug)]
struct SearchEntry {
    item: usize,
    weight: f64,
    text: NameKey,
}

/// Indexed collection of keyed items
#[derive(Debug)]
pub struct Directory<T> {
    config: DirectoryConfig,
    items: Vec<Rc<T>>,
    by_key: HashMap<NameKey, usize>,
    by_field: HashMap<&'static str, HashMap<NameKey, Vec<usize>>>,
    // Built on first search, dropped on every insert
    search_index: OnceCell<Vec<SearchEntry>>,
}

impl<T: Keyed> Directory<T> {
    pub fn new(config: DirectoryConfig) -> Self {
        let by_field = config
            .alternate_keys
            .iter()
            .map(|k| (k.field, HashMap::new()))
            .collect();
        Self {
            config,
            items: Vec::new(),
            by_key: HashMap::new(),
            by_field,
            search_index: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order
    pub fn all(&self) -> &[Rc<T>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> {
        self.items.iter()
    }

    /// Insert one item.
    ///
    /// Fails on a primary-key collision or on a collision in any alternate
    /// field configured as unique.
    pub fn add(&mut self, item: T) -> Result<Rc<T>, DirectoryError> {
        self.validate(std::iter::once(&item))?;
        Ok(self.insert(item))
    }

    /// Insert a batch of items, all or nothing.
    ///
    /// The batch is checked against itself and the current contents before
    /// anything is inserted.
    pub fn add_range(&mut self, items: Vec<T>) -> Result<Vec<Rc<T>>, DirectoryError> {
        self.validate(items.iter())?;
        Ok(items.into_iter().map(|item| self.insert(item)).collect())
    }

    fn validate<'a>(&self, items: impl Iterator<Item = &'a T>) -> Result<(), DirectoryError>
    where
        T: 'a,
    {
        let mut staged_keys: HashSet<&NameKey> = HashSet::new();
        let mut staged_fields: HashMap<&'static str, HashSet<&NameKey>> = HashMap::new();

        for item in items {
            let key = item.key();
            if self.by_key.contains_key(key) || !staged_keys.insert(key) {
                return Err(DirectoryError::DuplicateKey(key.clone()));
            }

            for alternate in self.config.alternate_keys.iter().filter(|k| k.unique) {
                let Some(index) = self.by_field.get(alternate.field) else {
                    continue;
                };
                let staged = staged_fields.entry(alternate.field).or_default();
                let values = item.field_keys(alternate.field);
                for (i, value) in values.iter().enumerate() {
                    // An item may repeat its own value
                    if values[..i].contains(value) {
                        continue;
                    }
                    if index.contains_key(value) || !staged.insert(value) {
                        return Err(DirectoryError::DuplicateAlternateKey {
                            field: alternate.field,
                            key: value.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, item: T) -> Rc<T> {
        let index = self.items.len();
        let item = Rc::new(item);

        self.by_key.insert(item.key().clone(), index);
        for alternate in &self.config.alternate_keys {
            let field_index = self.by_field.entry(alternate.field).or_default();
            for value in item.field_keys(alternate.field) {
                let slot = field_index.entry(value.clone()).or_default();
                if slot.last() != Some(&index) {
                    slot.push(index);
                }
            }
        }

        self.items.push(Rc::clone(&item));
        self.search_index.take();
        item
    }

    /// Exact primary-key lookup
    pub fn get(&self, name: &str) -> Result<Option<Rc<T>>, DirectoryError> {
        let key = NameKey::normalize(name)?;
        Ok(self.get_by_key(&key))
    }

    pub fn get_by_key(&self, key: &NameKey) -> Option<Rc<T>> {
        self.by_key.get(key).map(|&i| Rc::clone(&self.items[i]))
    }

    /// Exact lookup under one alternate field (or the primary name field)
    pub fn get_by_field_exact(
        &self,
        field: &str,
        name: &str,
    ) -> Result<Vec<Rc<T>>, DirectoryError> {
        let key = NameKey::normalize(name)?;
        if field == NAME_FIELD {
            return Ok(self.get_by_key(&key).into_iter().collect());
        }

        let index = self
            .by_field
            .get(field)
            .ok_or_else(|| DirectoryError::UnknownField(field.to_string()))?;
        Ok(index
            .get(&key)
            .map(|hits| hits.iter().map(|&i| Rc::clone(&self.items[i])).collect())
            .unwrap_or_default())
    }

    /// Exact lookup across the primary key and every alternate field
    pub fn get_by_any_field_exact(&self, name: &str) -> Result<Vec<Rc<T>>, DirectoryError> {
        let key = NameKey::normalize(name)?;
        Ok(self
            .exact_indices(&key)
            .into_iter()
            .map(|i| Rc::clone(&self.items[i]))
            .collect())
    }

    fn exact_indices(&self, key: &NameKey) -> Vec<usize> {
        let mut hits: Vec<usize> = self.by_key.get(key).copied().into_iter().collect();
        for alternate in &self.config.alternate_keys {
            let Some(found) = self
                .by_field
                .get(alternate.field)
                .and_then(|index| index.get(key))
            else {
                continue;
            };
            for &i in found {
                if !hits.contains(&i) {
                    hits.push(i);
                }
            }
        }
        hits
    }

    /// Fuzzy search over the configured text fields, best first
    pub fn search_by_text_fields(&self, name: &str) -> Result<Vec<Scored<T>>, DirectoryError> {
        let pattern = NameKey::normalize(name)?;
        let index = self.search_index.get_or_init(|| self.build_search_index());

        let mut best: Vec<Option<f64>> = vec![None; self.items.len()];
        let fuzzy = &self.config.fuzzy;
        for entry in index {
            if let Some(sim) = similarity(pattern.as_str(), entry.text.as_str(), fuzzy) {
                let score = sim * entry.weight;
                let slot = &mut best[entry.item];
                if slot.is_none_or(|s| score > s) {
                    *slot = Some(score);
                }
            }
        }

        let mut results: Vec<Scored<T>> = best
            .into_iter()
            .enumerate()
            .filter_map(|(i, score)| score.map(|s| Scored::new(Rc::clone(&self.items[i]), s)))
            .filter(|s| s.score > 0.0)
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    fn build_search_index(&self) -> Vec<SearchEntry> {
        let mut entries = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            for field in &self.config.text_fields {
                for text in item.field_keys(field.field) {
                    entries.push(SearchEntry {
                        item: i,
                        weight: field.weight,
                        text: text.clone(),
                    });
                }
            }
        }
        entries
    }

    /// Exact lookup, falling back to fuzzy search, then adjusted and ranked.
    pub fn lookup(
        &self,
        name: &str,
        flags: &LookupFlags,
        adjuster: &dyn ResultAdjuster<T>,
    ) -> Result<Vec<Scored<T>>, DirectoryError> {
        let key = NameKey::normalize(name)?;

        let mut candidates = Vec::new();
        if !flags.no_exact_lookup {
            candidates = self
                .exact_indices(&key)
                .into_iter()
                .map(|i| Scored::exact(Rc::clone(&self.items[i])))
                .collect();
        }
        if candidates.is_empty() && !flags.no_text_search {
            candidates = self.search_by_text_fields(name)?;
        }

        let mut results = adjuster.adjust(candidates);
        if results.len() > 1 {
            results.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        Ok(results)
    }

    #[cfg(test)]
    pub(crate) fn has_search_index(&self) -> bool {
        self.search_index.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ALTERNATE_NAMES_FIELD, AlternateKey, NoAdjustment};
    use crate::types::Named;

    #[derive(Debug)]
    struct Entry {
        name: String,
        key: NameKey,
        nicknames: Vec<NameKey>,
        codes: Vec<NameKey>,
    }

    impl Entry {
        fn new(name: &str, nicknames: &[&str]) -> Self {
            Self::with_codes(name, nicknames, &[])
        }

        fn with_codes(name: &str, nicknames: &[&str], codes: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                key: NameKey::normalize(name).unwrap(),
                nicknames: NameKey::normalize_all(nicknames).unwrap(),
                codes: NameKey::normalize_all(codes).unwrap(),
            }
        }
    }

    impl Named for Entry {
        fn name(&self) -> &str {
            &self.name
        }

        fn key(&self) -> &NameKey {
            &self.key
        }
    }

    impl Keyed for Entry {
        fn field_keys(&self, field: &str) -> &[NameKey] {
            match field {
                NAME_FIELD => std::slice::from_ref(&self.key),
                ALTERNATE_NAMES_FIELD => &self.nicknames,
                "code" => &self.codes,
                _ => &[],
            }
        }
    }

    fn directory() -> Directory<Entry> {
        let mut config = DirectoryConfig::default();
        config.alternate_keys.push(AlternateKey {
            field: "code",
            unique: true,
        });
        let mut dir = Directory::new(config);
        dir.add_range(vec![
            Entry::with_codes("Space Needle", &["Needle"], &["SN1"]),
            Entry::with_codes("Pike Place Market", &["The Market", "Pike"], &["PPM"]),
            Entry::with_codes("Pike Place", &["Pike"], &["PP"]),
        ])
        .unwrap();
        dir
    }

    #[test]
    fn test_add_duplicate_key() {
        let mut dir = directory();
        let err = dir.add(Entry::new("space  needle!", &[])).unwrap_err();

        assert_eq!(
            err,
            DirectoryError::DuplicateKey(NameKey::normalize("spaceneedle").unwrap())
        );
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn test_add_duplicate_unique_alternate() {
        let mut dir = directory();
        let err = dir.add(Entry::with_codes("Gas Works", &[], &["ppm"])).unwrap_err();

        assert!(matches!(err, DirectoryError::DuplicateAlternateKey { field: "code", .. }));
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn test_repeated_unique_alternate_on_one_item() {
        let mut dir = directory();
        let gas_works = dir.add(Entry::with_codes("Gas Works", &[], &["GW", "gw"])).unwrap();

        assert_eq!(gas_works.field_keys("code").len(), 2);
        let hits = dir.get_by_field_exact("code", "GW").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Gas Works");

        let err = dir.add(Entry::with_codes("Kerry Park", &[], &["gw"])).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateAlternateKey { field: "code", .. }));
    }

    #[test]
    fn test_non_unique_alternate_collects_all() {
        let dir = directory();
        let hits = dir.get_by_field_exact(ALTERNATE_NAMES_FIELD, "pike").unwrap();

        let names: Vec<&str> = hits.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Pike Place Market", "Pike Place"]);
    }

    #[test]
    fn test_add_range_internal_duplicate_is_atomic() {
        let mut dir = directory();
        let before = dir.len();
        let result = dir.add_range(vec![Entry::new("Gas Works", &[]), Entry::new("gasworks", &[])]);

        assert!(matches!(result, Err(DirectoryError::DuplicateKey(_))));
        assert_eq!(dir.len(), before);
        assert!(dir.get("Gas Works").unwrap().is_none());
    }

    #[test]
    fn test_add_range_unique_alternate_inside_batch() {
        let mut dir = directory();
        let result = dir.add_range(vec![
            Entry::with_codes("Gas Works", &[], &["GW"]),
            Entry::with_codes("Kerry Park", &[], &["gw"]),
        ]);

        assert!(matches!(result, Err(DirectoryError::DuplicateAlternateKey { .. })));
        assert_eq!(dir.len(), 3);
        assert!(dir.get_by_field_exact("code", "GW").unwrap().is_empty());
    }

    #[test]
    fn test_get_is_primary_only() {
        let dir = directory();

        assert_eq!(
            dir.get("SPACE NEEDLE").unwrap().unwrap().name(),
            "Space Needle"
        );
        assert!(dir.get("Needle").unwrap().is_none());
        assert!(matches!(dir.get("  "), Err(DirectoryError::Name(_))));
    }

    #[test]
    fn test_unknown_field_fails() {
        let dir = directory();
        assert_eq!(
            dir.get_by_field_exact("nickname", "pike").unwrap_err(),
            DirectoryError::UnknownField("nickname".to_string())
        );
    }

    #[test]
    fn test_get_by_any_field() {
        let dir = directory();

        let hits = dir.get_by_any_field_exact("pike place").unwrap();
        assert_eq!(hits.len(), 1);

        let hits = dir.get_by_any_field_exact("needle").unwrap();
        assert_eq!(hits[0].name(), "Space Needle");

        let hits = dir.get_by_any_field_exact("sn1").unwrap();
        assert_eq!(hits[0].name(), "Space Needle");
    }

    #[test]
    fn test_exact_lookup_skips_fuzzy() {
        let dir = directory();
        let results = dir.lookup("Pike Place", &LookupFlags::default(), &NoAdjustment).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.name(), "Pike Place");
        assert_eq!(results[0].score, 1.0);
        assert!(!dir.has_search_index());
    }

    #[test]
    fn test_lookup_falls_back_to_fuzzy() {
        let dir = directory();
        let results = dir.lookup("spce needle", &LookupFlags::default(), &NoAdjustment).unwrap();

        assert_eq!(results[0].item.name(), "Space Needle");
        assert!(results[0].score < 1.0);
        assert!(dir.has_search_index());
    }

    #[test]
    fn test_lookup_without_exact() {
        let dir = directory();
        let flags = LookupFlags {
            no_exact_lookup: true,
            no_text_search: false,
        };
        let results = dir.lookup("Pike Place", &flags, &NoAdjustment).unwrap();

        // Fuzzy search also finds the longer name
        assert!(results.len() >= 2);
        assert_eq!(results[0].item.name(), "Pike Place");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_lookup_without_text_search() {
        let dir = directory();
        let flags = LookupFlags {
            no_exact_lookup: false,
            no_text_search: true,
        };

        assert!(dir.lookup("spce needle", &flags, &NoAdjustment).unwrap().is_empty());
    }

    #[test]
    fn test_adjuster_applied() {
        let dir = directory();
        let only_market = |candidates: Vec<Scored<Entry>>| -> Vec<Scored<Entry>> {
            candidates
                .into_iter()
                .filter(|c| c.item.name().contains("Market"))
                .collect()
        };
        let flags = LookupFlags {
            no_exact_lookup: true,
            no_text_search: false,
        };
        let results = dir.lookup("pike place", &flags, &only_market).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.name(), "Pike Place Market");
    }

    #[test]
    fn test_insert_invalidates_search_index() {
        let mut dir = directory();
        dir.search_by_text_fields("needle").unwrap();
        assert!(dir.has_search_index());

        dir.add(Entry::new("Gas Works Park", &[])).unwrap();
        assert!(!dir.has_search_index());

        let results = dir.search_by_text_fields("gas works").unwrap();
        assert_eq!(results[0].item.name(), "Gas Works Park");
    }

    #[test]
    fn test_names_weighted_above_alternates() {
        let mut dir = Directory::new(DirectoryConfig::default());
        dir.add(Entry::new("Needle Park", &[])).unwrap();
        dir.add(Entry::new("Space Tower", &["Needle Park"])).unwrap();

        let results = dir.search_by_text_fields("needle park").unwrap();
        assert_eq!(results[0].item.name(), "Needle Park");
        assert!(results[0].score > results[1].score);
    }
}
