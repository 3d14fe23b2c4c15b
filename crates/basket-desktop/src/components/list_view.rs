//! The shopping list for the signed-in owner

use dioxus::prelude::*;

use basket_core::list::{view, Mode};

use super::{AddCategoryForm, CategorySection, EmptyState, ListHeader};
use crate::state::AppState;

#[component]
pub fn ListView() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let list = state.list.read();

    let needed = view::needed_count(&list.items);
    let bought = view::bought_count(&list.items);
    let email = (state.session)()
        .and_then(|session| session.user.email)
        .unwrap_or_default();
    let sections: Vec<_> = view::sections(&list)
        .into_iter()
        .map(|section| {
            (
                section.category.to_string(),
                section.collapsed,
                section.stats,
                section.items.into_iter().cloned().collect::<Vec<_>>(),
                list.new_item_name(section.category).to_string(),
            )
        })
        .collect();

    rsx! {
        div {
            class: "list-view",
            style: "
                max-width: 640px;
                margin: 0 auto;
                padding: 16px 20px 48px;
                color: {colors.text_primary};
            ",

            ListHeader {
                mode: list.mode,
                needed,
                bought,
                email,
            }

            if let Some(error_message) = (state.error_message)() {
                div {
                    style: "margin: 8px 0; font-size: 13px; color: {colors.error};",
                    "{error_message}"
                }
            }

            if list.loading {
                div {
                    style: "padding: 12px 0; color: {colors.text_muted};",
                    "Loading..."
                }
            }

            if list.mode == Mode::Plan {
                AddCategoryForm {
                    open: list.show_category_form,
                    name: list.new_category_name.clone(),
                }
            }

            if view::shows_empty_state(&list) {
                EmptyState {}
            }

            for (category, collapsed, stats, items, new_item_name) in sections {
                CategorySection {
                    key: "{category}",
                    category: category.clone(),
                    mode: list.mode,
                    collapsed,
                    stats,
                    items,
                    new_item_name,
                }
            }
        }
    }
}
