//! One category with its items and, in plan mode, an add-item input

use dioxus::prelude::*;

use basket_core::list::view::CategoryStats;
use basket_core::list::{Action, Mode};
use basket_core::models::Item;

use super::ItemRow;
use crate::state::AppState;

#[component]
pub fn CategorySection(
    category: String,
    mode: Mode,
    collapsed: bool,
    stats: CategoryStats,
    items: Vec<Item>,
    new_item_name: String,
) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let revision = (state.revision)();
    let marker = if collapsed { "+" } else { "-" };

    let toggle_collapse = {
        let category = category.clone();
        move |_: MouseEvent| state.dispatch(Action::ToggleCollapse(category.clone()))
    };
    let edit_name = {
        let category = category.clone();
        move |event: FormEvent| {
            state.dispatch(Action::EditItemName {
                category: category.clone(),
                text: event.value(),
            });
        }
    };
    let add_item = {
        let category = category.clone();
        move || {
            let category = category.clone();
            state.perform(move |controller, snapshot| async move {
                controller.add_item(&snapshot, &category).await
            });
        }
    };
    let add_item_on_enter = {
        let add_item = add_item.clone();
        move |event: KeyboardEvent| {
            if event.key() == Key::Enter {
                add_item();
            }
        }
    };

    rsx! {
        section {
            class: "category",
            style: "
                margin-bottom: 12px;
                border: 1px solid {colors.border};
                border-radius: 10px;
                overflow: hidden;
            ",

            div {
                class: "category-header",
                style: "
                    display: flex;
                    align-items: center;
                    justify-content: space-between;
                    padding: 10px 14px;
                    cursor: pointer;
                    user-select: none;
                    background: {colors.bg_secondary};
                ",
                onclick: toggle_collapse,
                span {
                    style: "font-weight: 600;",
                    "{marker} {category}"
                }
                span {
                    style: "font-size: 12px; color: {colors.text_muted};",
                    "{stats}"
                }
            }

            if !collapsed {
                for item in items {
                    ItemRow { key: "{item.id}-{revision}", item: item.clone(), mode }
                }

                if mode == Mode::Plan {
                    div {
                        style: "display: flex; gap: 8px; padding: 8px 14px;",
                        input {
                            style: "
                                flex: 1;
                                padding: 6px 10px;
                                border: 1px solid {colors.border};
                                border-radius: 6px;
                                background: {colors.bg_primary};
                                color: {colors.text_primary};
                            ",
                            placeholder: "Add to {category}",
                            value: "{new_item_name}",
                            oninput: edit_name,
                            onkeydown: add_item_on_enter,
                        }
                        button {
                            style: "
                                padding: 6px 12px;
                                border: none;
                                border-radius: 6px;
                                cursor: pointer;
                                background: {colors.accent};
                                color: {colors.accent_text};
                            ",
                            disabled: new_item_name.trim().is_empty(),
                            onclick: move |_| add_item(),
                            "Add"
                        }
                    }
                }
            }
        }
    }
}
