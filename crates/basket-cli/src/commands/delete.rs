use crate::commands::common::{apply_outcome, resolve_item, short_id, ListContext};
use crate::error::CliError;

pub async fn run_delete(query: &str, profile: Option<&str>) -> Result<(), CliError> {
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;
    let item = resolve_item(&state.items, query)?;
    let (id, name) = (item.id, item.name.clone());

    let outcome = context.controller.delete_item(&state, id).await;
    apply_outcome(&mut state, outcome)?;

    println!("Deleted {name} ({})", short_id(id));
    Ok(())
}
