use contracts::domain::common::Record;
use contracts::shared::form::{parse_flag, FieldDef, FieldKind, FormFields};
use leptos::prelude::*;
use thaw::*;

use super::page::{apply, PageController};

/// Форма создания/редактирования, строится по описанию полей записи
pub fn form_view<T: Record>(ctrl: PageController<T>, editing: Option<String>) -> impl IntoView {
    let title = if editing.is_some() {
        format!("Edit {}", T::element_name())
    } else {
        format!("New {}", T::element_name())
    };
    let submit_label = if editing.is_some() { "Save" } else { "Create" };

    view! {
        <div class="details-container">
            <div class="details-header">
                <h3>{title}</h3>
            </div>

            <form
                class="details-form"
                on:submit=move |ev| {
                    ev.prevent_default();
                    ctrl.update(|c| {
                        if let Err(e) = c.save() {
                            log::warn!("{}: save rejected: {}", T::collection(), e);
                        }
                    });
                }
            >
                {<T::Form as FormFields>::fields()
                    .iter()
                    .map(|field| field_view(ctrl, *field))
                    .collect_view()}

                <div class="details-actions">
                    <button type="submit" class="btn btn-primary">{submit_label}</button>
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| apply(ctrl, "cancel", |c| c.cancel())
                    >
                        "Cancel"
                    </Button>
                </div>
            </form>
        </div>
    }
}

fn field_view<T: Record>(ctrl: PageController<T>, field: FieldDef) -> impl IntoView {
    let key = field.key;
    let value = move || ctrl.with(|c| c.draft().get(key));
    let set = move |value: String| apply(ctrl, "edit field", move |c| c.set_field(key, value));
    let label = if field.required {
        format!("{} *", field.label)
    } else {
        field.label.to_string()
    };

    let input = match field.kind {
        FieldKind::Text => view! {
            <input
                type="text"
                id=key
                prop:value=value
                on:input=move |ev| set(event_target_value(&ev))
            />
        }
        .into_any(),
        FieldKind::Number => view! {
            <input
                type="text"
                inputmode="decimal"
                id=key
                prop:value=value
                on:input=move |ev| set(event_target_value(&ev))
            />
        }
        .into_any(),
        FieldKind::Select(options) => {
            let initial = ctrl.with_untracked(|c| c.draft().get(key));
            let unknown = (!initial.is_empty() && !options.iter().any(|(o, _)| *o == initial))
                .then_some(initial);
            view! {
                <select id=key on:change=move |ev| set(event_target_value(&ev))>
                    {unknown.map(|current| {
                        view! {
                            <option value=current.clone() selected=true disabled=true>
                                {current.clone()}
                            </option>
                        }
                    })}
                    {options
                        .iter()
                        .map(|(option, caption)| {
                            let option = *option;
                            view! {
                                <option value=option selected=move || value() == option>
                                    {*caption}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            }
            .into_any()
        }
        FieldKind::Checkbox => view! {
            <input
                type="checkbox"
                id=key
                prop:checked=move || parse_flag(&value())
                on:change=move |ev| set(event_target_checked(&ev).to_string())
            />
        }
        .into_any(),
    };

    view! {
        <div class="form-group">
            <label for=key>{label}</label>
            {input}
        </div>
    }
}
