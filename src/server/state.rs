use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, RwLock},
};

use thiserror::Error;

use crate::common::data::{FixtureDefinition, FixtureRecord};

#[derive(Error, Debug)]
pub enum Error {
    #[error("fixture store lock is poisoned")]
    LockPoisoned,
    #[error("unknown fixture store error")]
    Unknown,
}

/// Read/query interface of the fixture catalog. The store is written once
/// at startup and only read while serving, but implementations must stay
/// safe under many concurrent readers and a (future) concurrent writer.
pub trait FixtureStore {
    /// Assigns a fresh id to every definition and inserts all of them in a
    /// single write transaction. Returns the assigned ids in input order.
    fn load(&self, definitions: Vec<FixtureDefinition>) -> Result<Vec<usize>, Error>;

    /// Returns all records whose method and URL exactly equal the
    /// arguments. Bucket order is load order; callers must not rely on it
    /// beyond last-wins tie-breaking.
    fn query_by_method_and_url(
        &self,
        method: &str,
        url: &str,
    ) -> Result<Vec<Arc<FixtureRecord>>, Error>;

    /// Direct primary-key lookup.
    fn fixture_by_id(&self, id: usize) -> Result<Option<Arc<FixtureRecord>>, Error>;

    fn len(&self) -> Result<usize, Error>;
}

/// Arena-style index over the fixture records: the id map owns the records,
/// the compound (method, url) map is a non-unique secondary index into it.
#[derive(Default)]
struct FixtureIndex {
    next_id: usize,
    records: BTreeMap<usize, Arc<FixtureRecord>>,
    by_method_url: HashMap<(String, String), Vec<usize>>,
}

/// In-memory [`FixtureStore`]. A read-lock guard acts as the consistent
/// snapshot for a query; no guard is ever held across an await point.
#[derive(Default)]
pub struct InMemoryFixtureStore {
    index: RwLock<FixtureIndex>,
}

impl InMemoryFixtureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FixtureStore for InMemoryFixtureStore {
    fn load(&self, definitions: Vec<FixtureDefinition>) -> Result<Vec<usize>, Error> {
        let mut index = self.index.write().map_err(|_| Error::LockPoisoned)?;

        let mut ids = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let id = index.next_id;
            index.next_id += 1;

            let record = Arc::new(FixtureRecord::new(id, definition));

            tracing::debug!(
                id,
                method = %record.method,
                url = %record.url,
                "loading fixture into store"
            );

            index
                .by_method_url
                .entry((record.method.clone(), record.url.clone()))
                .or_default()
                .push(id);
            index.records.insert(id, record);
            ids.push(id);
        }

        Ok(ids)
    }

    fn query_by_method_and_url(
        &self,
        method: &str,
        url: &str,
    ) -> Result<Vec<Arc<FixtureRecord>>, Error> {
        let index = self.index.read().map_err(|_| Error::LockPoisoned)?;

        let candidates = match index
            .by_method_url
            .get(&(method.to_string(), url.to_string()))
        {
            Some(ids) => ids
                .iter()
                .filter_map(|id| index.records.get(id).cloned())
                .collect(),
            None => Vec::new(),
        };

        Ok(candidates)
    }

    fn fixture_by_id(&self, id: usize) -> Result<Option<Arc<FixtureRecord>>, Error> {
        let index = self.index.read().map_err(|_| Error::LockPoisoned)?;
        Ok(index.records.get(&id).cloned())
    }

    fn len(&self) -> Result<usize, Error> {
        let index = self.index.read().map_err(|_| Error::LockPoisoned)?;
        Ok(index.records.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::data::{RecordedResponse, RequestShape};

    fn definition(method: &str, url: &str, body: &str) -> FixtureDefinition {
        FixtureDefinition {
            method: method.to_string(),
            url: url.to_string(),
            request: RequestShape {
                headers: Default::default(),
                body: body.to_string(),
            },
            response: RecordedResponse {
                status_code: 200,
                headers: Default::default(),
                body: format!("response for {}", body),
            },
        }
    }

    #[test]
    fn assigns_unique_ids_in_load_order() {
        let store = InMemoryFixtureStore::new();

        let ids = store
            .load(vec![
                definition("GET", "/a", ""),
                definition("GET", "/b", ""),
                definition("POST", "/a", ""),
            ])
            .unwrap();

        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(store.fixture_by_id(1).unwrap().unwrap().url, "/b");
    }

    #[test]
    fn query_is_empty_before_load() {
        let store = InMemoryFixtureStore::new();
        assert!(store
            .query_by_method_and_url("GET", "/a")
            .unwrap()
            .is_empty());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn compound_key_is_non_unique() {
        let store = InMemoryFixtureStore::new();
        store
            .load(vec![
                definition("GET", "/item", ""),
                definition("GET", "/item", "x"),
                definition("POST", "/item", ""),
            ])
            .unwrap();

        let candidates = store.query_by_method_and_url("GET", "/item").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].request.body, "");
        assert_eq!(candidates[1].request.body, "x");
    }

    #[test]
    fn method_is_case_sensitive_and_exact() {
        let store = InMemoryFixtureStore::new();
        store.load(vec![definition("GET", "/a", "")]).unwrap();

        assert!(store
            .query_by_method_and_url("get", "/a")
            .unwrap()
            .is_empty());
        assert!(store
            .query_by_method_and_url("GET", "/a/")
            .unwrap()
            .is_empty());
        assert_eq!(store.query_by_method_and_url("GET", "/a").unwrap().len(), 1);
    }

    #[test]
    fn second_load_continues_id_sequence() {
        let store = InMemoryFixtureStore::new();
        let first = store.load(vec![definition("GET", "/a", "")]).unwrap();
        let second = store.load(vec![definition("GET", "/b", "")]).unwrap();

        assert_eq!(first, vec![0]);
        assert_eq!(second, vec![1]);
    }
}
