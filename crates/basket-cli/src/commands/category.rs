use basket_core::list::Action;

use crate::cli::CategoryCommands;
use crate::commands::common::{apply_outcome, join_words, ListContext};
use crate::error::CliError;

pub async fn run_category(
    command: CategoryCommands,
    profile: Option<&str>,
) -> Result<(), CliError> {
    match command {
        CategoryCommands::Add { name } => run_category_add(&name, profile).await,
    }
}

async fn run_category_add(name_parts: &[String], profile: Option<&str>) -> Result<(), CliError> {
    let name = join_words(name_parts)?;
    let context = ListContext::open(profile).await?;
    let mut state = context.load().await;

    state.dispatch_all([
        Action::ShowCategoryForm(true),
        Action::EditCategoryName(name.clone()),
    ]);
    let outcome = context.controller.add_category(&state).await;
    apply_outcome(&mut state, outcome)?;

    println!("Added category {name}");
    Ok(())
}
