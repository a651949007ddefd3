use contracts::domain::common::Record;
use contracts::shared::export::{ExportFormat, Exportable};
use leptos::prelude::*;
use thaw::*;

use super::controller::{CrudController, LoadState, NotificationLevel, PendingLoad, ViewMode};
use super::details::{delete_confirm_view, details_view};
use super::form::form_view;
use crate::shared::export::export_items;
use crate::shared::local_store::BrowserStorage;
use crate::shared::remote::HttpCollection;

/// Контроллер страницы в реактивной обертке
pub type PageController<T> = RwSignal<CrudController<T, BrowserStorage>>;

/// Сколько висит уведомление, мс
const NOTIFICATION_TTL_MS: u32 = 4000;

/// Запустить загрузку коллекции (локально → сервер → демо)
pub fn start_load<T: Record>(ctrl: PageController<T>) {
    if let Some(pending) = ctrl.try_update(|c| c.begin_load()) {
        run_load(ctrl, pending);
    }
}

/// Стереть локальную копию и загрузить заново
fn start_reset<T: Record>(ctrl: PageController<T>) {
    if let Some(Ok(pending)) = ctrl.try_update(|c| c.begin_reset()) {
        run_load(ctrl, pending);
    }
}

fn run_load<T: Record>(ctrl: PageController<T>, pending: PendingLoad<T, BrowserStorage>) {
    wasm_bindgen_futures::spawn_local(async move {
        let remote = HttpCollection::<T>::new();
        let result = pending.run(&remote).await;
        ctrl.update(|c| c.finish_load(result));
    });
}

/// Применить действие контроллера; отказ переходов только логируется,
/// пользователь уже получил уведомление от самого контроллера
pub fn apply<T, F>(ctrl: PageController<T>, action: &'static str, f: F)
where
    T: Record,
    F: FnOnce(&mut CrudController<T, BrowserStorage>) -> Result<(), super::ControllerError>,
{
    ctrl.update(|c| {
        if let Err(e) = f(c) {
            log::warn!("{}: {}: {}", T::collection(), action, e);
        }
    });
}

/// Страница администрирования одной коллекции: список, форма, карточка,
/// подтверждение удаления, экспорт.
pub fn crud_page<T: Record + Exportable>() -> impl IntoView {
    let ctrl: PageController<T> =
        RwSignal::new(CrudController::new(BrowserStorage, Some(T::demo_records())));

    start_load(ctrl);

    // Автоскрытие уведомлений
    let scheduled = StoredValue::new(0u64);
    Effect::new(move |_| {
        let fresh: Vec<u64> = ctrl.with(|c| {
            c.notifications()
                .map(|n| n.id)
                .filter(|id| *id > scheduled.get_value())
                .collect()
        });
        for id in fresh {
            scheduled.set_value(id);
            wasm_bindgen_futures::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(NOTIFICATION_TTL_MS).await;
                ctrl.update(|c| c.dismiss(id));
            });
        }
    });

    let export = move |format: ExportFormat| {
        let rows = ctrl.with_untracked(|c| c.visible());
        let collection = T::collection();
        match export_items(&rows, collection.resource(), collection.title(), format) {
            Ok(filename) => ctrl.update(|c| {
                c.notify(NotificationLevel::Success, format!("Exported {}", filename));
            }),
            Err(e) => {
                log::error!("{}: export failed: {}", collection, e);
                ctrl.update(|c| {
                    c.notify(NotificationLevel::Error, format!("Export failed: {}", e));
                });
            }
        }
    };

    let reset = move || {
        let confirmed = web_sys::window()
            .and_then(|w| {
                w.confirm_with_message("Discard local changes and reload from server?")
                    .ok()
            })
            .unwrap_or(false);
        if confirmed {
            start_reset(ctrl);
        }
    };

    let is_ready = Signal::derive(move || ctrl.with(|c| c.is_ready()));

    view! {
        <div class="page">
            <div class="header">
                <div class="header__content">
                    <h1 class="header__title">{T::list_name()}</h1>
                    <span class="header__subtitle">
                        {move || ctrl.with(|c| match c.load_state() {
                            LoadState::Loading => "Loading...".to_string(),
                            LoadState::Ready(source) => {
                                format!("{} · {} records", source.describe(), c.items().len())
                            }
                            LoadState::Failed(_) => "Not loaded".to_string(),
                        })}
                    </span>
                </div>
                <div class="header__actions">
                    <Button
                        appearance=ButtonAppearance::Primary
                        disabled=Signal::derive(move || !is_ready.get())
                        on_click=move |_| apply(ctrl, "add", |c| c.open_create())
                    >
                        {format!("Add {}", T::element_name())}
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        disabled=Signal::derive(move || !is_ready.get())
                        on_click=move |_| export(ExportFormat::Csv)
                    >
                        "Export CSV"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        disabled=Signal::derive(move || !is_ready.get())
                        on_click=move |_| export(ExportFormat::Pdf)
                    >
                        "Export PDF"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Subtle
                        on_click=move |_| reset()
                    >
                        "Reset to server data"
                    </Button>
                </div>
            </div>

            {notifications_view(ctrl)}

            {move || {
                let state = ctrl.with(|c| c.load_state().clone());
                match state {
                    LoadState::Loading => view! {
                        <div class="page__loading">"Loading..."</div>
                    }
                    .into_any(),
                    LoadState::Failed(err) => view! {
                        <div class="warning-box warning-box--error">
                            <span class="warning-box__icon">"⚠"</span>
                            <span class="warning-box__text">{err.to_string()}</span>
                            <Button
                                size=ButtonSize::Small
                                appearance=ButtonAppearance::Secondary
                                on_click=move |_| start_load(ctrl)
                            >
                                "Retry"
                            </Button>
                        </div>
                    }
                    .into_any(),
                    LoadState::Ready(_) => body_view(ctrl).into_any(),
                }
            }}
        </div>
    }
}

fn notifications_view<T: Record>(ctrl: PageController<T>) -> impl IntoView {
    view! {
        <div class="notifications">
            {move || {
                ctrl.with(|c| c.notifications().cloned().collect::<Vec<_>>())
                    .into_iter()
                    .map(|n| {
                        let class = match n.level {
                            NotificationLevel::Success => "notification notification--success",
                            NotificationLevel::Info => "notification notification--info",
                            NotificationLevel::Error => "notification notification--error",
                        };
                        let id = n.id;
                        view! {
                            <div class=class role="status">
                                <span class="notification__text">{n.message}</span>
                                <button
                                    class="notification__close"
                                    on:click=move |_| ctrl.update(|c| c.dismiss(id))
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

fn body_view<T: Record>(ctrl: PageController<T>) -> impl IntoView {
    move || {
        let mode = ctrl.with(|c| c.mode().clone());
        match mode {
            ViewMode::List => list_view(ctrl).into_any(),
            ViewMode::Form { editing } => form_view(ctrl, editing).into_any(),
            ViewMode::Details { id } => details_view(ctrl, id).into_any(),
            ViewMode::DeleteConfirm { id } => view! {
                {list_view(ctrl)}
                {delete_confirm_view(ctrl, id)}
            }
            .into_any(),
        }
    }
}

fn list_view<T: Record>(ctrl: PageController<T>) -> impl IntoView {
    let sort_marker = move |field: &'static str| {
        ctrl.with(|c| match &c.query().sort {
            Some(spec) if spec.field == field => {
                if spec.ascending {
                    " ▲"
                } else {
                    " ▼"
                }
            }
            _ => "",
        })
    };

    view! {
        <div class="filter-panel">
            <input
                type="search"
                class="filter-panel__search"
                placeholder="Search..."
                prop:value=move || ctrl.with(|c| c.query().search.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    ctrl.update(|c| c.set_search(value));
                }
            />
            <select
                class="filter-panel__select"
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    ctrl.update(|c| c.set_status_filter(Some(value)));
                }
            >
                <option value="">"All statuses"</option>
                {T::status_options()
                    .iter()
                    .map(|(key, label)| {
                        let key = *key;
                        view! {
                            <option
                                value=key
                                selected=move || ctrl.with(|c| {
                                    c.query().status_filter.as_deref() == Some(key)
                                })
                            >
                                {*label}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>

        <div class="table">
            <table class="table__data table--striped">
                <thead class="table__head">
                    <tr>
                        {T::columns()
                            .iter()
                            .map(|(key, label)| {
                                let key = *key;
                                view! {
                                    <th
                                        class="table__header-cell table__header-cell--sortable"
                                        on:click=move |_| ctrl.update(|c| c.toggle_sort(key))
                                    >
                                        {*label}
                                        {move || sort_marker(key)}
                                    </th>
                                }
                            })
                            .collect_view()}
                        <th class="table__header-cell">"Actions"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = ctrl.with(|c| c.visible());
                        if rows.is_empty() {
                            let span = (T::columns().len() + 1).to_string();
                            return view! {
                                <tr>
                                    <td class="table__cell table__cell--empty" colspan=span>
                                        "No records"
                                    </td>
                                </tr>
                            }
                            .into_any();
                        }
                        rows.into_iter()
                            .map(|record| row_view(ctrl, record))
                            .collect_view()
                            .into_any()
                    }}
                </tbody>
            </table>
        </div>
    }
}

fn row_view<T: Record>(ctrl: PageController<T>, record: T) -> impl IntoView {
    let id = record.id().to_string();
    let id_view = id.clone();
    let id_edit = id.clone();
    let id_delete = id.clone();
    let id_status = id;
    let current_status = record.status_key().to_string();
    // Неизвестный статус показываем как есть, а не первым пунктом списка
    let unknown_status = (!record.has_known_status()).then(|| record.status_label().to_string());

    view! {
        <tr class="table__row">
            {T::columns()
                .iter()
                .map(|(key, _)| {
                    if *key == "status" {
                        let id_status = id_status.clone();
                        view! {
                            <td class="table__cell">
                                <select
                                    class="table__status-select"
                                    on:change=move |ev| {
                                        let value = event_target_value(&ev);
                                        let id = id_status.clone();
                                        apply(ctrl, "change status", move |c| c.set_status(&id, &value));
                                    }
                                >
                                    {unknown_status.clone().map(|label| {
                                        view! {
                                            <option value=current_status.clone() selected=true disabled=true>
                                                {label}
                                            </option>
                                        }
                                    })}
                                    {T::status_options()
                                        .iter()
                                        .map(|(value, label)| {
                                            view! {
                                                <option value=*value selected=*value == current_status>
                                                    {*label}
                                                </option>
                                            }
                                        })
                                        .collect_view()}
                                </select>
                            </td>
                        }
                        .into_any()
                    } else {
                        view! { <td class="table__cell">{record.cell(key)}</td> }.into_any()
                    }
                })
                .collect_view()}
            <td class="table__cell table__cell--actions">
                <button
                    class="button button--small"
                    on:click=move |_| {
                        let id = id_view.clone();
                        apply(ctrl, "view", move |c| c.open_details(&id));
                    }
                >
                    "View"
                </button>
                <button
                    class="button button--small"
                    on:click=move |_| {
                        let id = id_edit.clone();
                        apply(ctrl, "edit", move |c| c.open_edit(&id));
                    }
                >
                    "Edit"
                </button>
                <button
                    class="button button--small button--danger"
                    on:click=move |_| {
                        let id = id_delete.clone();
                        apply(ctrl, "delete", move |c| c.request_delete(&id));
                    }
                >
                    "Delete"
                </button>
            </td>
        </tr>
    }
}
