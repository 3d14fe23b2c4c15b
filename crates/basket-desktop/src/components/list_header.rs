//! Header with mode switch, totals and session controls

use dioxus::prelude::*;

use basket_core::list::{Action, Mode};

use crate::state::AppState;

#[component]
pub fn ListHeader(mode: Mode, needed: usize, bought: usize, email: String) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let mode_button = move |target: Mode, label: &'static str| {
        let active = mode == target;
        let (bg, fg) = if active {
            (colors.accent, colors.accent_text)
        } else {
            ("transparent", colors.text_secondary)
        };
        rsx! {
            button {
                style: "
                    padding: 6px 14px;
                    border: none;
                    border-radius: 6px;
                    cursor: pointer;
                    background: {bg};
                    color: {fg};
                ",
                onclick: move |_| state.dispatch(Action::SetMode(target)),
                "{label}"
            }
        }
    };

    let reset = move |_: MouseEvent| {
        state.perform(|controller, _| async move { controller.reset_shopping().await });
    };

    rsx! {
        header {
            class: "list-header",
            style: "
                display: flex;
                flex-direction: column;
                gap: 12px;
                padding-bottom: 12px;
                margin-bottom: 12px;
                border-bottom: 1px solid {colors.border};
            ",

            div {
                style: "display: flex; align-items: center; justify-content: space-between;",
                h1 { style: "margin: 0; font-size: 22px;", "Basket" }
                div {
                    style: "display: flex; align-items: center; gap: 8px; font-size: 12px; color: {colors.text_muted};",
                    span { "{email}" }
                    button {
                        style: "
                            padding: 4px 10px;
                            border: 1px solid {colors.border};
                            border-radius: 6px;
                            cursor: pointer;
                            background: transparent;
                            color: {colors.text_secondary};
                        ",
                        onclick: move |_| state.sign_out(),
                        "Sign Out"
                    }
                }
            }

            div {
                style: "display: flex; align-items: center; justify-content: space-between;",
                div {
                    style: "
                        display: flex;
                        gap: 4px;
                        padding: 3px;
                        border-radius: 8px;
                        background: {colors.bg_secondary};
                    ",
                    {mode_button(Mode::Plan, "Plan")}
                    {mode_button(Mode::Store, "Store")}
                }
                div {
                    style: "display: flex; align-items: center; gap: 12px; font-size: 13px; color: {colors.text_secondary};",
                    span { "{needed} needed" }
                    span { "{bought} bought" }
                    button {
                        style: "
                            padding: 6px 12px;
                            border: 1px solid {colors.border};
                            border-radius: 6px;
                            cursor: pointer;
                            background: transparent;
                            color: {colors.text_primary};
                        ",
                        title: "Clear needed and bought on every item",
                        onclick: reset,
                        "Reset"
                    }
                }
            }
        }
    }
}
