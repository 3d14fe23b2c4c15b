pub mod add;
pub mod auth_cmd;
pub mod buy;
pub mod category;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod need;
pub mod reset;
pub mod watch;
