use contracts::shared::collection_key::CollectionKey;
use leptos::prelude::*;

use crate::domain::a001_unit::ui::list::UnitList;
use crate::domain::a002_property::ui::list::PropertyList;
use crate::domain::a003_agent::ui::list::AgentList;

#[component]
pub fn App() -> impl IntoView {
    let active = RwSignal::new(CollectionKey::Units);

    view! {
        <div class="app">
            <nav class="app__tabs">
                {CollectionKey::ALL
                    .into_iter()
                    .map(|key| {
                        view! {
                            <button
                                class="app__tab"
                                class:app__tab--active=move || active.get() == key
                                on:click=move |_| active.set(key)
                            >
                                {key.title()}
                            </button>
                        }
                    })
                    .collect_view()}
            </nav>

            <main class="app__content">
                // Страница пересоздаётся при смене вкладки и заново читает хранилище
                {move || match active.get() {
                    CollectionKey::Units => view! { <UnitList /> }.into_any(),
                    CollectionKey::Properties => view! { <PropertyList /> }.into_any(),
                    CollectionKey::Agents => view! { <AgentList /> }.into_any(),
                }}
            </main>
        </div>
    }
}
