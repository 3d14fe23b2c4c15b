use dioxus::prelude::*;

use basket_core::list::view::EMPTY_STORE_MESSAGE;

use crate::state::AppState;

/// Store mode with nothing needed.
#[component]
pub fn EmptyState() -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    rsx! {
        div {
            class: "empty-state",
            style: "
                padding: 48px 16px;
                text-align: center;
                color: {colors.text_muted};
            ",
            "{EMPTY_STORE_MESSAGE}"
        }
    }
}
