//! Состояние страницы администрирования коллекции.
//!
//! Контроллер не знает про DOM: страница держит его в `RwSignal` и вызывает
//! методы из обработчиков событий. Все мутации идут по одной схеме:
//! новая коллекция через чистый примитив → запись в локальное хранилище →
//! замена состояния в памяти → уведомление → возврат к списку.

use chrono::Utc;
use contracts::domain::common::{Record, RecordIdSource, RecordMetadata};
use contracts::shared::collection::CollectionStore;
use contracts::shared::form::FormFields;
use std::collections::VecDeque;
use thiserror::Error;

use crate::shared::loader::{load_or_seed, LoadOutcome, LoadSource};
use crate::shared::local_store::{save_local_json, KeyValueStore, StorageError};
use crate::shared::remote::{FetchError, RemoteCollection};

/// Сколько уведомлений держим одновременно
pub const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(LoadSource),
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    List,
    /// `editing: None` — создание новой записи
    Form { editing: Option<String> },
    Details { id: String },
    DeleteConfirm { id: String },
}

impl ViewMode {
    fn name(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Form { .. } => "form",
            ViewMode::Details { .. } => "details",
            ViewMode::DeleteConfirm { .. } => "delete-confirm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("cannot {action} while in {mode} mode")]
    InvalidTransition {
        action: &'static str,
        mode: &'static str,
    },
    #[error("record {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

/// Поиск, фильтр по статусу и сортировка видимого списка
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub status_filter: Option<String>,
    pub sort: Option<SortSpec>,
}

impl ListQuery {
    /// Повторный клик по той же колонке меняет направление
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.field == field => Some(SortSpec {
                field: spec.field,
                ascending: !spec.ascending,
            }),
            _ => Some(SortSpec {
                field: field.to_string(),
                ascending: true,
            }),
        };
    }
}

/// Загрузка, отвязанная от контроллера: страница ждёт её в `spawn_local`,
/// не удерживая сигнал, и отдаёт результат в `finish_load`
pub struct PendingLoad<T, S> {
    storage: S,
    demo: Option<Vec<T>>,
}

impl<T: Record, S: KeyValueStore> PendingLoad<T, S> {
    pub async fn run<R>(self, remote: &R) -> Result<LoadOutcome<T>, FetchError>
    where
        R: RemoteCollection<T> + ?Sized,
    {
        load_or_seed(&self.storage, remote, self.demo.as_deref()).await
    }
}

pub struct CrudController<T: Record, S: KeyValueStore> {
    storage: S,
    store: CollectionStore<T>,
    load_state: LoadState,
    mode: ViewMode,
    draft: T::Form,
    query: ListQuery,
    notifications: VecDeque<Notification>,
    next_notification_id: u64,
    demo: Option<Vec<T>>,
    id_source: RecordIdSource,
}

impl<T: Record, S: KeyValueStore> CrudController<T, S> {
    pub fn new(storage: S, demo: Option<Vec<T>>) -> Self {
        Self {
            storage,
            store: CollectionStore::default(),
            load_state: LoadState::Loading,
            mode: ViewMode::List,
            draft: T::Form::default(),
            query: ListQuery::default(),
            notifications: VecDeque::new(),
            next_notification_id: 1,
            demo,
            id_source: RecordIdSource::default(),
        }
    }

    pub fn with_id_source(mut self, id_source: RecordIdSource) -> Self {
        self.id_source = id_source;
        self
    }

    // ------------------------------------------------------------------
    // Чтение состояния
    // ------------------------------------------------------------------

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn items(&self) -> &[T] {
        self.store.items()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.store.get(id)
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn draft(&self) -> &T::Form {
        &self.draft
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn demo(&self) -> Option<&[T]> {
        self.demo.as_deref()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.load_state, LoadState::Ready(_))
    }

    /// Записи после поиска, фильтра и сортировки. Хранилище не трогается.
    pub fn visible(&self) -> Vec<T> {
        let needle = self.query.search.trim().to_lowercase();
        let mut rows: Vec<T> = self
            .store
            .items()
            .iter()
            .filter(|r| needle.is_empty() || r.search_text().to_lowercase().contains(&needle))
            .filter(|r| match &self.query.status_filter {
                Some(status) => r.status_key() == status.as_str(),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(spec) = &self.query.sort {
            rows.sort_by(|a, b| {
                let ord = a.sort_value(&spec.field).compare(&b.sort_value(&spec.field));
                if spec.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        rows
    }

    // ------------------------------------------------------------------
    // Загрузка
    // ------------------------------------------------------------------

    pub fn finish_load(&mut self, result: Result<LoadOutcome<T>, FetchError>) {
        match result {
            Ok(outcome) => {
                self.store.replace(outcome.items);
                if outcome.source == LoadSource::Demo {
                    self.notify(
                        NotificationLevel::Info,
                        format!("Server unavailable, showing demo {}", T::list_name().to_lowercase()),
                    );
                }
                self.load_state = LoadState::Ready(outcome.source);
            }
            Err(err) => {
                self.notify(
                    NotificationLevel::Error,
                    format!("Failed to load {}: {}", T::list_name().to_lowercase(), err),
                );
                self.load_state = LoadState::Failed(err);
            }
        }
    }

    /// Стереть локальную копию коллекции. Следующая загрузка пойдёт на сервер.
    pub fn forget_local(&mut self) -> Result<(), ControllerError> {
        let key = T::collection().storage_key();
        if let Err(e) = self.storage.remove_item(key) {
            log::error!("{}: failed to clear local copy: {}", key, e);
            self.notify(NotificationLevel::Error, format!("Could not clear local data: {}", e));
            return Err(e.into());
        }
        log::info!("{}: local copy cleared", key);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Переходы
    // ------------------------------------------------------------------

    pub fn open_create(&mut self) -> Result<(), ControllerError> {
        self.expect_ready("add")?;
        self.expect_list("add")?;
        self.draft = T::Form::for_create();
        self.mode = ViewMode::Form { editing: None };
        Ok(())
    }

    /// Из списка или из карточки
    pub fn open_edit(&mut self, id: &str) -> Result<(), ControllerError> {
        self.expect_ready("edit")?;
        match &self.mode {
            ViewMode::List => {}
            ViewMode::Details { id: shown } if shown == id => {}
            other => return Err(invalid("edit", other)),
        }
        let record = self.find(id)?;
        self.draft = record.to_form();
        self.mode = ViewMode::Form {
            editing: Some(id.to_string()),
        };
        Ok(())
    }

    pub fn open_details(&mut self, id: &str) -> Result<(), ControllerError> {
        self.expect_ready("view")?;
        self.expect_list("view")?;
        self.find(id)?;
        self.mode = ViewMode::Details { id: id.to_string() };
        Ok(())
    }

    pub fn edit_from_details(&mut self) -> Result<(), ControllerError> {
        match &self.mode {
            ViewMode::Details { id } => {
                let id = id.clone();
                self.open_edit(&id)
            }
            other => Err(invalid("edit", other)),
        }
    }

    pub fn close_details(&mut self) -> Result<(), ControllerError> {
        match &self.mode {
            ViewMode::Details { .. } => {
                self.mode = ViewMode::List;
                Ok(())
            }
            other => Err(invalid("close details", other)),
        }
    }

    pub fn request_delete(&mut self, id: &str) -> Result<(), ControllerError> {
        self.expect_ready("delete")?;
        self.expect_list("delete")?;
        self.find(id)?;
        self.mode = ViewMode::DeleteConfirm { id: id.to_string() };
        Ok(())
    }

    /// Отмена формы или подтверждения удаления; черновик выбрасывается
    pub fn cancel(&mut self) -> Result<(), ControllerError> {
        match &self.mode {
            ViewMode::Form { .. } | ViewMode::DeleteConfirm { .. } => {
                self.draft = T::Form::default();
                self.mode = ViewMode::List;
                Ok(())
            }
            other => Err(invalid("cancel", other)),
        }
    }

    pub fn set_field(&mut self, key: &str, value: String) -> Result<(), ControllerError> {
        match &self.mode {
            ViewMode::Form { .. } => {
                self.draft.set(key, value);
                Ok(())
            }
            other => Err(invalid("edit fields", other)),
        }
    }

    // ------------------------------------------------------------------
    // Мутации
    // ------------------------------------------------------------------

    pub fn save(&mut self) -> Result<T, ControllerError> {
        let editing = match &self.mode {
            ViewMode::Form { editing } => editing.clone(),
            other => return Err(invalid("save", other)),
        };

        let missing = self.draft.missing_required();
        if !missing.is_empty() {
            return Err(self.reject(format!("Required: {}", missing.join(", "))));
        }

        let now = Utc::now();
        let record = match &editing {
            None => {
                let mut record = T::blank(self.id_source.next_id(now), RecordMetadata::new_at(now));
                record.apply_form(&self.draft);
                record
            }
            Some(id) => {
                let mut record = self.find(id)?.clone();
                record.apply_form(&self.draft);
                record.metadata_mut().touch_at(now);
                record
            }
        };
        if let Err(message) = record.validate() {
            return Err(self.reject(message));
        }

        let next = self.store.upserted(record.clone());
        self.commit(next)?;

        let verb = if editing.is_some() { "updated" } else { "created" };
        self.notify(
            NotificationLevel::Success,
            format!("{} {}", T::element_name(), verb),
        );
        self.draft = T::Form::default();
        self.mode = ViewMode::List;
        Ok(record)
    }

    /// Смена только статуса, из списка или карточки
    pub fn set_status(&mut self, id: &str, status: &str) -> Result<(), ControllerError> {
        self.expect_ready("change status")?;
        if !matches!(self.mode, ViewMode::List | ViewMode::Details { .. }) {
            return Err(invalid("change status", &self.mode));
        }

        let mut record = self.find(id)?.clone();
        if let Err(message) = record.set_status(status) {
            return Err(self.reject(message));
        }
        record.metadata_mut().touch_at(Utc::now());

        let next = self.store.upserted(record);
        self.commit(next)?;
        self.notify(
            NotificationLevel::Success,
            format!("{} status updated", T::element_name()),
        );
        Ok(())
    }

    pub fn confirm_delete(&mut self) -> Result<(), ControllerError> {
        let id = match &self.mode {
            ViewMode::DeleteConfirm { id } => id.clone(),
            other => return Err(invalid("confirm delete", other)),
        };

        let next = self.store.removed(&id);
        self.commit(next)?;
        self.notify(
            NotificationLevel::Success,
            format!("{} deleted", T::element_name()),
        );
        self.mode = ViewMode::List;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Список
    // ------------------------------------------------------------------

    pub fn set_search(&mut self, search: String) {
        self.query.search = search;
    }

    pub fn set_status_filter(&mut self, status: Option<String>) {
        self.query.status_filter = status.filter(|s| !s.is_empty());
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.query.toggle_sort(field);
    }

    // ------------------------------------------------------------------
    // Уведомления
    // ------------------------------------------------------------------

    pub fn notify(&mut self, level: NotificationLevel, message: String) -> u64 {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push_back(Notification { id, level, message });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    // ------------------------------------------------------------------

    /// Запись на диск, затем замена состояния в памяти.
    /// При ошибке состояние и режим не меняются.
    fn commit(&mut self, next: Vec<T>) -> Result<(), ControllerError> {
        let key = T::collection().storage_key();
        if let Err(e) = save_local_json(&self.storage, key, &next) {
            log::error!("{}: write-through failed: {}", key, e);
            self.notify(
                NotificationLevel::Error,
                format!("Could not save {}: {}", T::element_name().to_lowercase(), e),
            );
            return Err(e.into());
        }
        self.store.replace(next);
        log::debug!("{}: {} records persisted", key, self.store.len());
        Ok(())
    }

    fn reject(&mut self, message: String) -> ControllerError {
        self.notify(NotificationLevel::Error, message.clone());
        ControllerError::Validation(message)
    }

    fn find(&self, id: &str) -> Result<&T, ControllerError> {
        self.store
            .get(id)
            .ok_or_else(|| ControllerError::NotFound(id.to_string()))
    }

    fn expect_ready(&self, action: &'static str) -> Result<(), ControllerError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                action,
                mode: "loading",
            })
        }
    }

    fn expect_list(&self, action: &'static str) -> Result<(), ControllerError> {
        match &self.mode {
            ViewMode::List => Ok(()),
            other => Err(invalid(action, other)),
        }
    }
}

impl<T: Record, S: KeyValueStore + Clone> CrudController<T, S> {
    /// Перевести страницу в "Загрузка" и отдать саму загрузку наружу
    pub fn begin_load(&mut self) -> PendingLoad<T, S> {
        self.load_state = LoadState::Loading;
        self.mode = ViewMode::List;
        PendingLoad {
            storage: self.storage.clone(),
            demo: self.demo.clone(),
        }
    }

    /// Сброс к данным сервера: локальная копия стирается, затем обычная загрузка
    pub fn begin_reset(&mut self) -> Result<PendingLoad<T, S>, ControllerError> {
        self.forget_local()?;
        Ok(self.begin_load())
    }

    /// Полный цикл загрузки; используется и как "Повторить" после ошибки
    pub async fn reload<R>(&mut self, remote: &R)
    where
        R: RemoteCollection<T> + ?Sized,
    {
        let result = self.begin_load().run(remote).await;
        self.finish_load(result);
    }

    pub async fn reset_to_remote<R>(&mut self, remote: &R) -> Result<(), ControllerError>
    where
        R: RemoteCollection<T> + ?Sized,
    {
        let result = self.begin_reset()?.run(remote).await;
        self.finish_load(result);
        Ok(())
    }
}

fn invalid(action: &'static str, mode: &ViewMode) -> ControllerError {
    ControllerError::InvalidTransition {
        action,
        mode: mode.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::loader::tests::{unit, ScriptedRemote};
    use crate::shared::local_store::{load_local_json, save_local_json, MemoryStorage};
    use contracts::domain::a001_unit::{Unit, UnitStatus};
    use contracts::domain::a003_agent::Agent;
    use futures::executor::block_on;

    type Units = CrudController<Unit, MemoryStorage>;

    fn key() -> &'static str {
        <Unit as Record>::collection().storage_key()
    }

    fn ready_with(storage: MemoryStorage, items: Vec<Unit>) -> Units {
        let mut ctrl = Units::new(storage, None);
        ctrl.finish_load(Ok(LoadOutcome {
            source: LoadSource::Local,
            items,
        }));
        ctrl
    }

    fn fill_unit(ctrl: &mut Units, unit_no: &str, project: &str, price: &str) {
        ctrl.set_field("unitNo", unit_no.into()).unwrap();
        ctrl.set_field("projectName", project.into()).unwrap();
        ctrl.set_field("unitType", "2BHK".into()).unwrap();
        ctrl.set_field("price", price.into()).unwrap();
    }

    #[test]
    fn test_create_persists_and_returns_to_list() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1")]);

        ctrl.open_create().unwrap();
        fill_unit(&mut ctrl, "B-7", "Skyline", "₹ 1,20,000");
        let created = ctrl.save().unwrap();

        assert_eq!(ctrl.mode(), &ViewMode::List);
        assert_eq!(ctrl.items()[0].id, created.id);
        assert_eq!(created.price, 120000.0);
        assert_eq!(created.metadata.created_at, created.metadata.updated_at);
        assert_eq!(
            storage.raw(key()),
            Some(serde_json::to_string(ctrl.items()).unwrap())
        );
        assert!(ctrl
            .notifications()
            .any(|n| n.level == NotificationLevel::Success));
    }

    #[test]
    fn test_edit_preserves_identity_and_refreshes_updated_at() {
        let original = Unit::demo_records().remove(0);
        let mut ctrl = ready_with(MemoryStorage::new(), vec![original.clone()]);

        ctrl.open_edit(&original.id).unwrap();
        assert_eq!(ctrl.draft().unit_no, original.unit_no);
        ctrl.set_field("unitNo", "A-101 (corner)".into()).unwrap();
        let saved = ctrl.save().unwrap();

        assert_eq!(saved.id, original.id);
        assert_eq!(saved.metadata.created_at, original.metadata.created_at);
        assert!(saved.metadata.updated_at > original.metadata.updated_at);
        assert_eq!(ctrl.items().len(), 1);
        assert_eq!(ctrl.items()[0].unit_no, "A-101 (corner)");
    }

    #[test]
    fn test_delete_then_reload_keeps_record_gone() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1"), unit("u2", "A-2")]);

        ctrl.request_delete("u1").unwrap();
        ctrl.confirm_delete().unwrap();
        assert_eq!(ctrl.mode(), &ViewMode::List);

        // "page reload": fresh controller over the same origin storage
        let remote = ScriptedRemote::ok(vec![unit("u1", "A-1"), unit("u2", "A-2")]);
        let mut reloaded = Units::new(storage, None);
        block_on(reloaded.reload(&remote));

        assert_eq!(reloaded.load_state(), &LoadState::Ready(LoadSource::Local));
        assert!(reloaded.get("u1").is_none());
        assert!(reloaded.get("u2").is_some());
        assert_eq!(remote.calls.get(), 0);
    }

    #[test]
    fn test_concurrent_tabs_last_write_wins() {
        let origin = MemoryStorage::new();
        save_local_json(&origin, key(), &vec![unit("x", "X")]).unwrap();
        let remote = ScriptedRemote::ok(Vec::new());

        let mut tab_a = Units::new(origin.clone(), None);
        let mut tab_b = Units::new(origin.clone(), None);
        block_on(tab_a.reload(&remote));
        block_on(tab_b.reload(&remote));

        tab_b.request_delete("x").unwrap();
        tab_b.confirm_delete().unwrap();
        assert_eq!(
            load_local_json::<Vec<Unit>, _>(&origin, key()),
            Some(Vec::new())
        );

        // tab A still shows X and saves its edit over B's empty list
        tab_a.open_edit("x").unwrap();
        tab_a.set_field("unitNo", "X-edited".into()).unwrap();
        let edited = tab_a.save().unwrap();

        let persisted: Vec<Unit> = load_local_json(&origin, key()).unwrap();
        assert_eq!(persisted, vec![edited]);
        assert_eq!(persisted[0].unit_no, "X-edited");
    }

    #[test]
    fn test_concurrent_creates_keep_only_the_later_tab() {
        let origin = MemoryStorage::new();
        let seed = vec![unit("u1", "A-1")];
        let mut tab_a = ready_with(origin.clone(), seed.clone());
        let mut tab_b = ready_with(origin.clone(), seed);

        tab_a.open_create().unwrap();
        fill_unit(&mut tab_a, "FROM-A", "P", "1");
        let from_a = tab_a.save().unwrap();

        tab_b.open_create().unwrap();
        fill_unit(&mut tab_b, "FROM-B", "P", "2");
        let from_b = tab_b.save().unwrap();

        // tab B never saw A's record and overwrote the whole collection
        let persisted: Vec<Unit> = load_local_json(&origin, key()).unwrap();
        assert!(persisted.iter().any(|u| u.id == from_b.id));
        assert!(!persisted.iter().any(|u| u.id == from_a.id));
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn test_save_keeps_unknown_status_and_fields_of_other_records() {
        let storage = MemoryStorage::new();
        let raw = serde_json::json!([
            {
                "id": "srv-1",
                "unitNo": "T-1",
                "status": "reserved_for_vip",
                "facing": "east",
                "createdAt": "2026-01-15T09:00:00Z",
                "updatedAt": "2026-01-15T09:00:00Z"
            },
            { "id": "srv-2", "unitNo": "T-2", "price": 100 }
        ]);
        storage.set_item(key(), &raw.to_string()).unwrap();

        let mut ctrl = Units::new(storage.clone(), None);
        block_on(ctrl.reload(&ScriptedRemote::ok(Vec::new())));
        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Local));

        ctrl.open_edit("srv-2").unwrap();
        ctrl.set_field("unitNo", "T-2b".into()).unwrap();
        ctrl.save().unwrap();

        ctrl.open_edit("srv-1").unwrap();
        ctrl.set_field("price", "500".into()).unwrap();
        ctrl.save().unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(&storage.raw(key()).unwrap()).unwrap();
        let first = stored
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == "srv-1")
            .unwrap();
        assert_eq!(first["status"], "reserved_for_vip");
        assert_eq!(first["facing"], "east");
        assert_eq!(first["price"], 500.0);
    }

    #[test]
    fn test_split_load_matches_page_flow() {
        let storage = MemoryStorage::new();
        let mut ctrl = Units::new(storage.clone(), Some(Unit::demo_records()));

        let pending = ctrl.begin_load();
        assert_eq!(ctrl.load_state(), &LoadState::Loading);
        let result = block_on(pending.run(&ScriptedRemote::ok(vec![unit("r1", "R-1")])));
        ctrl.finish_load(result);

        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Remote));
        assert!(storage.raw(key()).is_some());

        let pending = ctrl.begin_reset().unwrap();
        assert_eq!(storage.raw(key()), None);
        let result = block_on(pending.run(&ScriptedRemote::failing(FetchError::NotConfigured)));
        ctrl.finish_load(result);
        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Demo));
    }

    #[test]
    fn test_reset_fails_when_storage_is_read_only() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1")]);
        storage.set_reject_writes(true);

        assert!(matches!(ctrl.begin_reset(), Err(ControllerError::Storage(_))));
        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Local));
    }

    #[test]
    fn test_storage_failure_keeps_form_open_and_state_unchanged() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1")]);
        storage.set_reject_writes(true);

        ctrl.open_create().unwrap();
        fill_unit(&mut ctrl, "B-1", "P", "10");
        let result = ctrl.save();

        assert!(matches!(result, Err(ControllerError::Storage(_))));
        assert_eq!(ctrl.mode(), &ViewMode::Form { editing: None });
        assert_eq!(ctrl.items().len(), 1);
        assert_eq!(ctrl.draft().unit_no, "B-1");
        assert!(ctrl
            .notifications()
            .any(|n| n.level == NotificationLevel::Error));

        // retry after the quota frees up
        storage.set_reject_writes(false);
        ctrl.save().unwrap();
        assert_eq!(ctrl.items().len(), 2);
    }

    #[test]
    fn test_failed_delete_stays_in_confirm() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1")]);
        ctrl.request_delete("u1").unwrap();
        storage.set_reject_writes(true);

        assert!(ctrl.confirm_delete().is_err());
        assert_eq!(
            ctrl.mode(),
            &ViewMode::DeleteConfirm { id: "u1".into() }
        );
        assert!(ctrl.get("u1").is_some());
    }

    #[test]
    fn test_required_fields_block_save() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), Vec::new());
        ctrl.open_create().unwrap();
        ctrl.set_field("unitNo", "   ".into()).unwrap();

        assert!(matches!(ctrl.save(), Err(ControllerError::Validation(_))));
        assert!(matches!(ctrl.mode(), ViewMode::Form { .. }));
        assert_eq!(storage.raw(key()), None);
    }

    #[test]
    fn test_second_save_is_rejected() {
        let mut ctrl = ready_with(MemoryStorage::new(), Vec::new());
        ctrl.open_create().unwrap();
        fill_unit(&mut ctrl, "C-1", "P", "5");
        ctrl.save().unwrap();

        assert!(matches!(
            ctrl.save(),
            Err(ControllerError::InvalidTransition { .. })
        ));
        assert_eq!(ctrl.items().len(), 1);
    }

    #[test]
    fn test_transitions() {
        let mut ctrl = ready_with(MemoryStorage::new(), vec![unit("u1", "A-1")]);

        ctrl.open_details("u1").unwrap();
        assert!(ctrl.open_create().is_err());
        ctrl.edit_from_details().unwrap();
        assert_eq!(
            ctrl.mode(),
            &ViewMode::Form {
                editing: Some("u1".into())
            }
        );
        ctrl.cancel().unwrap();
        assert_eq!(ctrl.mode(), &ViewMode::List);

        ctrl.open_details("u1").unwrap();
        ctrl.close_details().unwrap();
        ctrl.request_delete("u1").unwrap();
        ctrl.cancel().unwrap();
        assert_eq!(ctrl.items().len(), 1);

        assert!(ctrl.cancel().is_err());
        assert!(ctrl.set_field("unitNo", "x".into()).is_err());
        assert_eq!(
            ctrl.open_edit("missing"),
            Err(ControllerError::NotFound("missing".into()))
        );
    }

    #[test]
    fn test_mutations_wait_for_load() {
        let mut ctrl = Units::new(MemoryStorage::new(), None);
        assert!(matches!(
            ctrl.open_create(),
            Err(ControllerError::InvalidTransition { mode: "loading", .. })
        ));
    }

    #[test]
    fn test_load_failure_and_retry() {
        let storage = MemoryStorage::new();
        let mut ctrl = Units::new(storage, None);
        let offline = ScriptedRemote::failing(FetchError::Network("offline".into()));
        block_on(ctrl.reload(&offline));
        assert!(matches!(ctrl.load_state(), LoadState::Failed(FetchError::Network(_))));

        let online = ScriptedRemote::ok(vec![unit("r1", "R-1")]);
        block_on(ctrl.reload(&online));
        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Remote));
        assert_eq!(ctrl.items().len(), 1);
    }

    #[test]
    fn test_demo_mode_is_not_persisted_until_first_mutation() {
        let storage = MemoryStorage::new();
        let mut ctrl = Units::new(storage.clone(), Some(Unit::demo_records()));
        block_on(ctrl.reload(&ScriptedRemote::failing(FetchError::NotConfigured)));

        assert_eq!(ctrl.load_state(), &LoadState::Ready(LoadSource::Demo));
        assert_eq!(storage.raw(key()), None);

        ctrl.set_status("demo-unit-1", "sold").unwrap();
        let persisted: Vec<Unit> = load_local_json(&storage, key()).unwrap();
        assert_eq!(persisted.len(), Unit::demo_records().len());
        assert_eq!(ctrl.get("demo-unit-1").map(|u| u.status.clone()), Some(UnitStatus::Sold));
    }

    #[test]
    fn test_reset_to_remote_drops_local_edits() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), vec![unit("u1", "A-1")]);
        ctrl.request_delete("u1").unwrap();
        ctrl.confirm_delete().unwrap();

        let remote = ScriptedRemote::ok(vec![unit("u1", "A-1")]);
        block_on(ctrl.reset_to_remote(&remote)).unwrap();

        assert_eq!(remote.calls.get(), 1);
        assert!(ctrl.get("u1").is_some());
    }

    #[test]
    fn test_search_filter_sort_touch_memory_only() {
        let storage = MemoryStorage::new();
        let mut ctrl = ready_with(storage.clone(), Unit::demo_records());

        ctrl.set_search("SKY".into());
        assert!(ctrl
            .visible()
            .iter()
            .all(|u| u.search_text().to_lowercase().contains("sky")));

        ctrl.set_search(String::new());
        ctrl.set_status_filter(Some("sold".into()));
        assert!(ctrl.visible().iter().all(|u| u.status == UnitStatus::Sold));

        ctrl.set_status_filter(None);
        ctrl.toggle_sort("price");
        let asc: Vec<f64> = ctrl.visible().iter().map(|u| u.price).collect();
        assert!(asc.windows(2).all(|w| w[0] <= w[1]));
        ctrl.toggle_sort("price");
        let desc: Vec<f64> = ctrl.visible().iter().map(|u| u.price).collect();
        assert!(desc.windows(2).all(|w| w[0] >= w[1]));

        assert_eq!(storage.raw(key()), None);
    }

    #[test]
    fn test_notifications_are_bounded_and_dismissible() {
        let mut ctrl = CrudController::<Agent, MemoryStorage>::new(MemoryStorage::new(), None);
        let first = ctrl.notify(NotificationLevel::Info, "first".into());
        ctrl.dismiss(first);
        assert_eq!(ctrl.notifications().count(), 0);

        for i in 0..(MAX_NOTIFICATIONS + 3) {
            ctrl.notify(NotificationLevel::Info, format!("n{}", i));
        }
        assert_eq!(ctrl.notifications().count(), MAX_NOTIFICATIONS);
        assert_eq!(
            ctrl.notifications().last().map(|n| n.message.as_str()),
            Some("n7")
        );
    }
}
