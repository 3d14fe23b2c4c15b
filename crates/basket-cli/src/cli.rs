use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "basket")]
#[command(about = "Plan a shopping list at home, tick it off in the store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name for backend and session settings
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the list grouped by category
    #[command(alias = "ls")]
    List {
        /// Show the store view (needed items only)
        #[arg(long)]
        store: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an item to a category
    Add {
        /// Category name
        category: String,
        /// Item name
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Manage custom categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Toggle whether an item is needed
    Need {
        /// Item ID, unique ID prefix, or name
        item: String,
    },
    /// Toggle whether a needed item is bought
    Buy {
        /// Item ID, unique ID prefix, or name
        item: String,
    },
    /// Delete an item
    Delete {
        /// Item ID, unique ID prefix, or name
        item: String,
    },
    /// Clear needed and bought on every item
    Reset,
    /// Show the list and redraw it on every remote change
    Watch {
        /// Show the store view (needed items only)
        #[arg(long)]
        store: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate a CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a custom category
    Add {
        /// Category name
        #[arg(required = true)]
        name: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Table holding items
        #[arg(long, value_name = "TABLE")]
        items_table: Option<String>,
        /// Table holding custom categories
        #[arg(long, value_name = "TABLE")]
        categories_table: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile config
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create a Supabase account
    Signup {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Login with Supabase email/password and store session in keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status,
    /// Logout profile and clear stored session
    Logout,
}
