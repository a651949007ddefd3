use contracts::domain::common::Record;
use leptos::prelude::*;
use thaw::*;

use super::page::{apply, PageController};
use crate::shared::date_utils::format_datetime;

/// Карточка записи только для чтения
pub fn details_view<T: Record>(ctrl: PageController<T>, id: String) -> impl IntoView {
    let Some(record) = ctrl.with_untracked(|c| c.get(&id).cloned()) else {
        return view! { <div class="error">{format!("{} {} not found", T::element_name(), id)}</div> }
            .into_any();
    };
    let meta = record.metadata().clone();

    view! {
        <div class="details-container">
            <div class="details-header">
                <h3>{format!("{} details", T::element_name())}</h3>
            </div>

            <dl class="details-grid">
                {T::columns()
                    .iter()
                    .map(|(key, label)| {
                        view! {
                            <dt>{*label}</dt>
                            <dd>{record.cell(key)}</dd>
                        }
                    })
                    .collect_view()}
                <dt>"Created"</dt>
                <dd>{format_datetime(&meta.created_at)}</dd>
                <dt>"Updated"</dt>
                <dd>{format_datetime(&meta.updated_at)}</dd>
            </dl>

            <div class="details-actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| apply(ctrl, "edit", |c| c.edit_from_details())
                >
                    "Edit"
                </Button>
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| apply(ctrl, "close", |c| c.close_details())
                >
                    "Close"
                </Button>
            </div>
        </div>
    }
    .into_any()
}

/// Модальное подтверждение удаления поверх списка
pub fn delete_confirm_view<T: Record>(ctrl: PageController<T>, id: String) -> impl IntoView {
    let name = ctrl
        .with_untracked(|c| {
            c.get(&id)
                .zip(T::columns().first())
                .map(|(record, (key, _))| record.cell(key))
        })
        .unwrap_or(id);

    view! {
        <div class="modal-overlay">
            <div class="modal" role="dialog">
                <h3 class="modal__title">{format!("Delete {}?", T::element_name())}</h3>
                <p class="modal__text">
                    {format!("\"{}\" will be removed from this device.", name)}
                </p>
                <div class="modal__actions">
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=move |_| apply(ctrl, "delete", |c| c.confirm_delete())
                    >
                        "Delete"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| apply(ctrl, "cancel", |c| c.cancel())
                    >
                        "Cancel"
                    </Button>
                </div>
            </div>
        </div>
    }
}
