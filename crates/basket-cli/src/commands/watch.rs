use std::time::Duration;

use basket_core::list::{follow_list, Action, ListState, Mode};
use basket_core::remote::RealtimeFeed;

use crate::commands::common::ListContext;
use crate::commands::list::render_list;
use crate::error::CliError;

const FEED_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Redraw on every change until Ctrl-C. The profile is reopened whenever its
/// session is due for a refresh, so the store and feed always carry a live
/// token.
pub async fn run_watch(store: bool, profile: Option<&str>) -> Result<(), CliError> {
    let mut state = ListState::new();
    if store {
        state.dispatch(Action::SetMode(Mode::Store));
    }

    loop {
        let context = ListContext::open(profile).await?;
        let feed = RealtimeFeed::new(context.backend.clone(), context.session.access_token.clone());
        let renew_in = Duration::from_secs(context.session.seconds_until_refresh());
        let follow = follow_list(&feed, &context.controller, FEED_RETRY_DELAY, |actions| {
            if !actions.is_empty() {
                state.dispatch_all(actions);
                draw(&state);
            }
        });

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Stopping watch for {}", context.session.owner());
                return Ok(());
            }
            () = follow => {}
            () = tokio::time::sleep(renew_in) => {
                tracing::debug!("Renewing session for profile '{}'", context.profile_name);
            }
        }
    }
}

fn draw(state: &ListState) {
    println!();
    for line in render_list(state) {
        println!("{line}");
    }
}
