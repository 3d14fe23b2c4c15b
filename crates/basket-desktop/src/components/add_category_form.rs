//! Inline form for a new custom category

use dioxus::prelude::*;

use basket_core::list::Action;

use crate::state::AppState;

#[component]
pub fn AddCategoryForm(open: bool, name: String) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let submit = move || {
        state.perform(|controller, snapshot| async move {
            controller.add_category(&snapshot).await
        });
    };

    if !open {
        return rsx! {
            button {
                style: "
                    margin-bottom: 12px;
                    padding: 6px 12px;
                    border: 1px dashed {colors.border};
                    border-radius: 6px;
                    cursor: pointer;
                    background: transparent;
                    color: {colors.text_secondary};
                ",
                onclick: move |_| state.dispatch(Action::ShowCategoryForm(true)),
                "+ Category"
            }
        };
    }

    rsx! {
        div {
            class: "add-category",
            style: "display: flex; gap: 8px; margin-bottom: 12px;",
            input {
                style: "
                    flex: 1;
                    padding: 6px 10px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: {colors.bg_primary};
                    color: {colors.text_primary};
                ",
                placeholder: "Category name",
                autofocus: true,
                value: "{name}",
                oninput: move |event: FormEvent| {
                    state.dispatch(Action::EditCategoryName(event.value()));
                },
                onkeydown: move |event: KeyboardEvent| match event.key() {
                    Key::Enter => submit(),
                    Key::Escape => state.dispatch(Action::ShowCategoryForm(false)),
                    _ => {}
                },
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
                onclick: move |_| submit(),
                "Add"
            }
            button {
                style: "
                    padding: 6px 12px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    cursor: pointer;
                    background: transparent;
                    color: {colors.text_secondary};
                ",
                onclick: move |_| state.dispatch(Action::ShowCategoryForm(false)),
                "Cancel"
            }
        }
    }
}
