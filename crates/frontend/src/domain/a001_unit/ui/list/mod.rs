use crate::shared::crud::crud_page;
use contracts::domain::a001_unit::Unit;
use leptos::prelude::*;

#[component]
#[allow(non_snake_case)]
pub fn UnitList() -> impl IntoView {
    crud_page::<Unit>()
}
