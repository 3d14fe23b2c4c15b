use crate::commands::common::{apply_outcome, resolve_item, ListContext};
use crate::error::CliError;

pub async fn run_need(query: &str, profile: Option<&str>) -> Result<(), CliError> {
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;
    let id = resolve_item(&state.items, query)?.id;

    let outcome = context.controller.toggle_needed(&state, id).await;
    apply_outcome(&mut state, outcome)?;

    if let Some(item) = state.item(id) {
        let label = if item.needed { "needed" } else { "not needed" };
        println!("{} is {label}", item.name);
    }
    Ok(())
}
