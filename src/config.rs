//! Locations of the backing files.
//!
//! The CLI fills these from `--inventory` / `--users`, falling back to the
//! `INVENTORY_FILE` / `USERS_FILE` environment variables (a `.env` file is
//! honoured) and then to the defaults below.

use std::path::PathBuf;

pub const DEFAULT_INVENTORY_FILE: &str = "data/inventory.json";
pub const DEFAULT_USERS_FILE: &str = "data/users.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub inventory_file: PathBuf,
    pub users_file: PathBuf,
}

impl Config {
    pub fn new(inventory_file: impl Into<PathBuf>, users_file: impl Into<PathBuf>) -> Self {
        Self {
            inventory_file: inventory_file.into(),
            users_file: users_file.into(),
        }
    }
}
