pub mod cli;
pub mod config;
pub mod csv_utils;
mod error;
pub mod json_utils;
pub mod model;
pub mod runner;
mod shop;
pub mod stores;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{Account, Keyboard, KeyboardRow, Size, SwitchColor};
pub use runner::run;
pub use shop::Shop;
pub use stores::{AccountStore, CatalogStore};
