//! Single item row

use dioxus::prelude::*;

use basket_core::list::Mode;
use basket_core::models::Item;

use crate::state::AppState;

/// Plan mode toggles `needed` and offers delete; store mode toggles `bought`.
#[component]
pub fn ItemRow(item: Item, mode: Mode) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let id = item.id;

    let checked = match mode {
        Mode::Plan => item.needed,
        Mode::Store => item.bought,
    };
    let name_style = if mode == Mode::Store && item.bought {
        format!("text-decoration: line-through; color: {};", colors.text_muted)
    } else {
        format!("color: {};", colors.text_primary)
    };

    let toggle = move |_: FormEvent| match mode {
        Mode::Plan => state.perform(move |controller, snapshot| async move {
            controller.toggle_needed(&snapshot, id).await
        }),
        Mode::Store => state.perform(move |controller, snapshot| async move {
            controller.toggle_bought(&snapshot, id).await
        }),
    };
    let delete = move |_: MouseEvent| {
        state.perform(move |controller, snapshot| async move {
            controller.delete_item(&snapshot, id).await
        });
    };

    rsx! {
        div {
            class: "item-row",
            style: "
                display: flex;
                align-items: center;
                gap: 10px;
                padding: 8px 14px;
                border-top: 1px solid {colors.border};
            ",
            input {
                r#type: "checkbox",
                checked,
                onchange: toggle,
            }
            span {
                style: "flex: 1; {name_style}",
                "{item.name}"
            }
            if mode == Mode::Plan {
                button {
                    style: "
                        padding: 2px 8px;
                        border: none;
                        cursor: pointer;
                        background: transparent;
                        color: {colors.text_muted};
                    ",
                    title: "Delete",
                    onclick: delete,
                    "x"
                }
            }
        }
    }
}
