use crate::shared::crud::crud_page;
use contracts::domain::a003_agent::Agent;
use leptos::prelude::*;

#[component]
#[allow(non_snake_case)]
pub fn AgentList() -> impl IntoView {
    crud_page::<Agent>()
}
