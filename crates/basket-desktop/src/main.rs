//! Basket Desktop Application
//!
//! A shopping list with a plan mode for building it and a store mode for
//! checking it off.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod bootstrap_config;
mod components;
mod services;
mod state;
mod theme;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};

fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("basket=debug".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Basket...");

    let window = WindowBuilder::new()
        .with_title("Basket")
        .with_inner_size(LogicalSize::new(560.0, 760.0));
    let config = Config::new().with_window(window);

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .launch(app::App);
}
