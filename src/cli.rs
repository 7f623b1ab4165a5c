//! Command-line definitions for the `estore` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, DEFAULT_INVENTORY_FILE, DEFAULT_USERS_FILE};
use crate::model::{Size, SwitchColor};

/// Inspect and edit the keyboard catalog and user account records
#[derive(Parser, Debug)]
#[command(name = "estore", version)]
pub struct Cli {
    /// Catalog backing file
    #[arg(long, global = true, env = "INVENTORY_FILE", default_value = DEFAULT_INVENTORY_FILE)]
    pub inventory: PathBuf,

    /// Accounts backing file
    #[arg(long, global = true, env = "USERS_FILE", default_value = DEFAULT_USERS_FILE)]
    pub users: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::new(&self.inventory, &self.users)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Catalog records
    #[command(subcommand)]
    Keyboards(KeyboardCommand),

    /// Account records
    #[command(subcommand)]
    Users(UserCommand),

    /// Shopping cart of an account
    #[command(subcommand)]
    Cart(CartCommand),

    /// Order history of an account
    Orders { username: String },
}

#[derive(Subcommand, Debug)]
pub enum KeyboardCommand {
    /// List keyboards, optionally filtered by name and price
    List {
        /// Only names containing this text (case-sensitive)
        #[arg(long)]
        search: Option<String>,
        /// Lowest price, inclusive
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Highest price, inclusive
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Show one keyboard
    Get { id: u32 },
    /// Create a keyboard with the next free id
    Add(NewKeyboard),
    /// Change fields of an existing keyboard
    Update {
        id: u32,
        #[command(flatten)]
        changes: KeyboardChanges,
    },
    /// Delete a keyboard
    Delete { id: u32 },
    /// Write the catalog as CSV
    Export,
    /// Create one keyboard per row of a CSV file
    Import { file: PathBuf },
}

#[derive(Args, Debug)]
pub struct NewKeyboard {
    #[arg(long)]
    pub name: String,
    #[arg(long, value_enum, ignore_case = true)]
    pub size: Size,
    #[arg(long, value_enum, ignore_case = true)]
    pub switch_color: SwitchColor,
    #[arg(long)]
    pub price: u32,
    #[arg(long)]
    pub quantity: i32,
}

#[derive(Args, Debug)]
pub struct KeyboardChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_enum, ignore_case = true)]
    pub size: Option<Size>,
    #[arg(long, value_enum, ignore_case = true)]
    pub switch_color: Option<SwitchColor>,
    #[arg(long)]
    pub price: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List accounts
    List,
    /// Show one account
    Get { username: String },
    /// Create an account
    Create { username: String, password: String },
    /// Delete an account
    Delete { username: String },
    /// Check the password and mark the account logged in
    Login { username: String, password: String },
    /// Mark the account logged out
    Logout { username: String },
}

/// Line commands address the first cart line for the keyboard id.
#[derive(Subcommand, Debug)]
pub enum CartCommand {
    Show { username: String },
    Add { username: String, id: u32 },
    Remove { username: String, id: u32 },
    Increase { username: String, id: u32 },
    Decrease { username: String, id: u32 },
    Clear { username: String },
    Checkout { username: String },
}
