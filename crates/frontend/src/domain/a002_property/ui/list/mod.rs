use crate::shared::crud::crud_page;
use contracts::domain::a002_property::Property;
use leptos::prelude::*;

/// Объекты недвижимости: витрина агентства
#[component]
#[allow(non_snake_case)]
pub fn PropertyList() -> impl IntoView {
    crud_page::<Property>()
}
