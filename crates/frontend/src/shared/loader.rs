//! Загрузка коллекции для страницы админки.
//!
//! Порядок, побеждает первый успех:
//! 1. локальное хранилище (сервер при этом не запрашивается);
//! 2. сервер, результат сразу пишется в локальное хранилище;
//! 3. демо-набор, только если сервер сообщил, что данных у него нет.

use contracts::domain::common::Record;
use contracts::shared::collection::dedupe_by_id;

use crate::shared::local_store::{load_local_json, save_local_json, KeyValueStore};
use crate::shared::remote::{FetchError, RemoteCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Local,
    Remote,
    Demo,
}

impl LoadSource {
    pub fn describe(&self) -> &'static str {
        match self {
            LoadSource::Local => "Saved on this device",
            LoadSource::Remote => "Loaded from server",
            LoadSource::Demo => "Demo data (server unavailable)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome<T> {
    pub source: LoadSource,
    pub items: Vec<T>,
}

pub async fn load_or_seed<T, S, R>(
    storage: &S,
    remote: &R,
    demo: Option<&[T]>,
) -> Result<LoadOutcome<T>, FetchError>
where
    T: Record,
    S: KeyValueStore + ?Sized,
    R: RemoteCollection<T> + ?Sized,
{
    let key = T::collection().storage_key();

    if let Some(items) = load_local_json::<Vec<T>, _>(storage, key) {
        log::debug!("{}: {} records from local store", key, items.len());
        return Ok(LoadOutcome {
            source: LoadSource::Local,
            items: dedupe_by_id(items),
        });
    }

    match remote.fetch_all().await {
        Ok(items) => {
            let items = dedupe_by_id(items);
            // Не записалось, значит при следующей загрузке снова пойдём на сервер
            if let Err(e) = save_local_json(storage, key, &items) {
                log::warn!("{}: could not seed local store: {}", key, e);
            }
            log::info!("{}: {} records from server", key, items.len());
            Ok(LoadOutcome {
                source: LoadSource::Remote,
                items,
            })
        }
        Err(err) => match demo {
            Some(demo) if err.allows_demo_fallback() => {
                log::warn!("{}: {}; showing demo data", key, err);
                Ok(LoadOutcome {
                    source: LoadSource::Demo,
                    items: demo.to_vec(),
                })
            }
            _ => {
                log::error!("{}: load failed: {}", key, err);
                Err(err)
            }
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::local_store::MemoryStorage;
    use async_trait::async_trait;
    use contracts::domain::a001_unit::Unit;
    use contracts::domain::common::RecordMetadata;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    /// Подставной сервер: считает вызовы и отдаёт заготовленный ответ
    pub(crate) struct ScriptedRemote<T> {
        pub calls: Cell<usize>,
        pub answer: RefCell<Result<Vec<T>, FetchError>>,
    }

    impl<T> ScriptedRemote<T> {
        pub(crate) fn ok(items: Vec<T>) -> Self {
            Self {
                calls: Cell::new(0),
                answer: RefCell::new(Ok(items)),
            }
        }

        pub(crate) fn failing(err: FetchError) -> Self {
            Self {
                calls: Cell::new(0),
                answer: RefCell::new(Err(err)),
            }
        }
    }

    #[async_trait(?Send)]
    impl<T: Clone> RemoteCollection<T> for ScriptedRemote<T> {
        async fn fetch_all(&self) -> Result<Vec<T>, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.answer.borrow().clone()
        }
    }

    pub(crate) fn unit(id: &str, unit_no: &str) -> Unit {
        let mut u = <Unit as Record>::blank(id.to_string(), RecordMetadata::new());
        u.unit_no = unit_no.to_string();
        u
    }

    fn key() -> &'static str {
        <Unit as Record>::collection().storage_key()
    }

    #[test]
    fn test_local_data_wins_and_remote_is_not_called() {
        let storage = MemoryStorage::new();
        save_local_json(&storage, key(), &vec![unit("u1", "Local")]).unwrap();
        let remote = ScriptedRemote::ok(vec![unit("r1", "Remote")]);

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();

        assert_eq!(outcome.source, LoadSource::Local);
        assert_eq!(outcome.items, vec![unit_from(&storage, 0)]);
        assert_eq!(remote.calls.get(), 0);
    }

    fn unit_from(storage: &MemoryStorage, index: usize) -> Unit {
        load_local_json::<Vec<Unit>, _>(storage, key()).unwrap()[index].clone()
    }

    #[test]
    fn test_empty_local_array_still_wins() {
        let storage = MemoryStorage::new();
        save_local_json(&storage, key(), &Vec::<Unit>::new()).unwrap();
        let remote = ScriptedRemote::ok(vec![unit("r1", "Remote")]);

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();

        assert_eq!(outcome.source, LoadSource::Local);
        assert!(outcome.items.is_empty());
        assert_eq!(remote.calls.get(), 0);
    }

    #[test]
    fn test_remote_seeds_local_store() {
        let storage = MemoryStorage::new();
        let remote_items = vec![unit("r1", "R1"), unit("r2", "R2")];
        let remote = ScriptedRemote::ok(remote_items.clone());

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();

        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(outcome.items, remote_items);
        assert_eq!(
            load_local_json::<Vec<Unit>, _>(&storage, key()),
            Some(remote_items)
        );

        // second load is served locally
        let again = block_on(load_or_seed(&storage, &remote, None)).unwrap();
        assert_eq!(again.source, LoadSource::Local);
        assert_eq!(remote.calls.get(), 1);
    }

    #[test]
    fn test_malformed_local_data_falls_through_to_remote() {
        let storage = MemoryStorage::new();
        storage.set_item(key(), "[{\"broken\"").unwrap();
        let remote = ScriptedRemote::ok(vec![unit("r1", "R1")]);

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();
        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(remote.calls.get(), 1);
    }

    #[test]
    fn test_seed_write_failure_is_silent() {
        let storage = MemoryStorage::new();
        storage.set_reject_writes(true);
        let remote = ScriptedRemote::ok(vec![unit("r1", "R1")]);

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(storage.raw(key()), None);
    }

    #[test]
    fn test_unavailable_backend_falls_back_to_demo_without_persisting() {
        let storage = MemoryStorage::new();
        let remote = ScriptedRemote::failing(FetchError::Unavailable("db down".into()));
        let demo = <Unit as Record>::demo_records();

        let outcome = block_on(load_or_seed(&storage, &remote, Some(&demo))).unwrap();

        assert_eq!(outcome.source, LoadSource::Demo);
        assert_eq!(outcome.items, demo);
        assert_eq!(storage.raw(key()), None);
    }

    #[test]
    fn test_network_error_is_not_masked_by_demo() {
        let storage = MemoryStorage::new();
        let remote = ScriptedRemote::failing(FetchError::Network("offline".into()));
        let demo = <Unit as Record>::demo_records();

        let result = block_on(load_or_seed(&storage, &remote, Some(&demo)));
        assert_eq!(result, Err(FetchError::Network("offline".into())));
    }

    #[test]
    fn test_unavailable_without_demo_is_an_error() {
        let storage = MemoryStorage::new();
        let remote = ScriptedRemote::<Unit>::failing(FetchError::NotConfigured);

        let result = block_on(load_or_seed(&storage, &remote, None));
        assert_eq!(result, Err(FetchError::NotConfigured));
    }

    #[test]
    fn test_remote_duplicates_are_collapsed() {
        let storage = MemoryStorage::new();
        let remote = ScriptedRemote::ok(vec![unit("r1", "first"), unit("r1", "second")]);

        let outcome = block_on(load_or_seed(&storage, &remote, None)).unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].unit_no, "first");
    }
}
