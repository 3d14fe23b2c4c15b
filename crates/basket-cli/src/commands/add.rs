use basket_core::list::Action;

use crate::commands::common::{apply_outcome, join_words, resolve_category, ListContext};
use crate::error::CliError;

pub async fn run_add(
    category: &str,
    name_parts: &[String],
    profile: Option<&str>,
) -> Result<(), CliError> {
    let name = join_words(name_parts)?;
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;
    let category = resolve_category(&state, category)?.to_string();

    state.dispatch(Action::EditItemName {
        category: category.clone(),
        text: name.clone(),
    });
    let outcome = context.controller.add_item(&state, &category).await;
    apply_outcome(&mut state, outcome)?;

    println!("Added {name} to {category}");
    Ok(())
}
