use basket_core::list::view::{self, Section, EMPTY_STORE_MESSAGE};
use basket_core::list::{Action, ListState, Mode};
use basket_core::models::Item;
use serde::Serialize;

use crate::commands::common::{short_id, ListContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ListJson<'a> {
    pub mode: Mode,
    pub needed: usize,
    pub bought: usize,
    pub sections: Vec<Section<'a>>,
}

pub async fn run_list(store: bool, as_json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;
    if store {
        state.dispatch(Action::SetMode(Mode::Store));
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&list_json(&state))?);
    } else {
        for line in render_list(&state) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn list_json(state: &ListState) -> ListJson<'_> {
    ListJson {
        mode: state.mode,
        needed: view::needed_count(&state.items),
        bought: view::bought_count(&state.items),
        sections: view::sections(state),
    }
}

pub fn render_list(state: &ListState) -> Vec<String> {
    let mut lines = vec![format!(
        "{} mode | {} needed | {} bought",
        capitalize(state.mode.label()),
        view::needed_count(&state.items),
        view::bought_count(&state.items)
    )];

    if view::shows_empty_state(state) {
        lines.push(String::new());
        lines.push(EMPTY_STORE_MESSAGE.to_string());
        return lines;
    }

    for section in view::sections(state) {
        lines.push(String::new());
        let marker = if section.collapsed { '+' } else { '-' };
        lines.push(format!("{marker} {} ({})", section.category, section.stats));
        if section.collapsed {
            continue;
        }
        lines.extend(
            section
                .items
                .iter()
                .map(|item| render_item(item, state.mode)),
        );
    }
    lines
}

fn render_item(item: &Item, mode: Mode) -> String {
    let checked = match mode {
        Mode::Plan => item.needed,
        Mode::Store => item.bought,
    };
    let check = if checked { 'x' } else { ' ' };
    format!("  [{check}] {:<24} {}", item.name, short_id(item.id))
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use basket_core::models::OwnerId;
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(name: &str, category: &str, needed: bool, bought: bool) -> Item {
        let mut item = Item::new(name, category, OwnerId::from("user-1"));
        item.needed = needed;
        item.bought = bought;
        item
    }

    fn state(mode: Mode, items: Vec<Item>) -> ListState {
        let mut state = ListState::new();
        state.dispatch_all([Action::ItemsLoaded(items), Action::SetMode(mode)]);
        state
    }

    #[test]
    fn plan_view_lists_every_category_with_stats() {
        let state = state(
            Mode::Plan,
            vec![
                item("Milk", "Dairy", true, false),
                item("butter", "Dairy", false, false),
            ],
        );
        let lines = render_list(&state);

        assert_eq!(lines[0], "Plan mode | 1 needed | 0 bought");
        assert!(lines.iter().any(|line| line == "- Produce (0/0)"));
        let dairy = lines.iter().position(|line| line == "- Dairy (1/2)").unwrap();
        assert!(lines[dairy + 1].starts_with("  [ ] butter"));
        assert!(lines[dairy + 2].starts_with("  [x] Milk"));
    }

    #[test]
    fn store_view_shows_needed_items_and_bought_marks() {
        let state = state(
            Mode::Store,
            vec![
                item("Milk", "Dairy", true, true),
                item("Bread", "Bakery", false, false),
            ],
        );
        let lines = render_list(&state);

        assert_eq!(lines[0], "Store mode | 0 needed | 1 bought");
        assert!(lines.iter().any(|line| line == "- Dairy (1/1)"));
        assert!(!lines.iter().any(|line| line.contains("Bakery")));
        assert!(lines.iter().any(|line| line.starts_with("  [x] Milk")));
    }

    #[test]
    fn store_view_without_needed_items_shows_empty_message() {
        let state = state(Mode::Store, vec![item("Milk", "Dairy", false, false)]);
        let lines = render_list(&state);
        assert_eq!(lines.last().map(String::as_str), Some(EMPTY_STORE_MESSAGE));
    }

    #[test]
    fn collapsed_sections_hide_items() {
        let mut state = state(Mode::Plan, vec![item("Milk", "Dairy", true, false)]);
        state.dispatch(Action::ToggleCollapse("Dairy".to_string()));
        let lines = render_list(&state);

        assert!(lines.iter().any(|line| line == "+ Dairy (1/1)"));
        assert!(!lines.iter().any(|line| line.contains("Milk")));
    }

    #[test]
    fn json_output_carries_mode_and_totals() {
        let state = state(Mode::Store, vec![item("Milk", "Dairy", true, false)]);
        let value = serde_json::to_value(list_json(&state)).unwrap();

        assert_eq!(value["mode"], "store");
        assert_eq!(value["needed"], 1);
        assert_eq!(value["sections"][0]["category"], "Dairy");
        assert_eq!(value["sections"][0]["items"][0]["name"], "Milk");
        assert_eq!(value["sections"][0]["stats"]["total"], 1);
    }
}
