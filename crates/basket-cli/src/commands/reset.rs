use basket_core::list::view::needed_count;

use crate::commands::common::{apply_outcome, ListContext};
use crate::error::CliError;

pub async fn run_reset(profile: Option<&str>) -> Result<(), CliError> {
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;

    let outcome = context.controller.reset_shopping().await;
    apply_outcome(&mut state, outcome)?;

    println!(
        "Reset {} items ({} needed)",
        state.items.len(),
        needed_count(&state.items)
    );
    Ok(())
}
