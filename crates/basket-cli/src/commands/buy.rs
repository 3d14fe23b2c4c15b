use basket_core::list::{Action, ListState, Mode};
use basket_core::models::Item;

use crate::commands::common::{apply_outcome, resolve_item, ListContext};
use crate::error::CliError;

pub async fn run_buy(query: &str, profile: Option<&str>) -> Result<(), CliError> {
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;
    state.dispatch(Action::SetMode(Mode::Store));
    let id = resolve_item(&on_the_list(&state), query)?.id;

    let outcome = context.controller.toggle_bought(&state, id).await;
    apply_outcome(&mut state, outcome)?;

    if let Some(item) = state.item(id) {
        let label = if item.bought { "bought" } else { "not bought" };
        println!("{} is {label}", item.name);
    }
    Ok(())
}

/// Items the store view shows, the only ones `buy` can match.
fn on_the_list(state: &ListState) -> Vec<Item> {
    state
        .items
        .iter()
        .filter(|item| item.needed)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use basket_core::models::OwnerId;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn only_needed_items_can_be_bought() {
        let owner = OwnerId::from("user-1");
        let mut milk = Item::new("Milk", "Dairy", owner.clone());
        milk.needed = true;
        let bread = Item::new("Bread", "Bakery", owner);

        let mut state = ListState::new();
        state.dispatch(Action::ItemsLoaded(vec![milk, bread]));
        let candidates = on_the_list(&state);

        assert_eq!(resolve_item(&candidates, "milk").unwrap().name, "Milk");
        assert!(matches!(
            resolve_item(&candidates, "Bread"),
            Err(CliError::ItemNotFound(_))
        ));
    }
}
