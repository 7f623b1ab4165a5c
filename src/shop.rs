//! Operations that span the catalog and the account stores.
//!
//! Stock handling: adding a keyboard to a cart takes one unit out of the
//! catalog, removing the line puts it back, and checkout takes the remaining
//! units of each line. Catalog and account writes are separate; a failure
//! between them is not compensated.

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Account, Keyboard};
use crate::stores::{AccountStore, CatalogStore};

#[derive(Debug)]
pub struct Shop {
    catalog: CatalogStore,
    accounts: AccountStore,
}

impl Shop {
    pub fn new(catalog: CatalogStore, accounts: AccountStore) -> Self {
        Self { catalog, accounts }
    }

    /// Loads both stores from the configured files.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(
            CatalogStore::open(&config.inventory_file)?,
            AccountStore::open(&config.users_file)?,
        ))
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn sign_up(&self, username: &str, password: &str) -> Result<Account> {
        let account = self.accounts.create(&Account::new(username, password))?;
        info!(username, "account created");
        Ok(account)
    }

    /// Checks the password and marks the account as logged in.
    pub fn login(&self, username: &str, password: &str) -> Result<Account> {
        let account = self.resolve(username)?;
        if account.password != password {
            return Err(Error::InvalidCredentials);
        }
        self.accounts.login(username)?;
        self.resolve(username)
    }

    pub fn logout(&self, username: &str) -> Result<()> {
        self.accounts.logout(username)
    }

    /// Puts one unit of catalog keyboard `id` into the cart.
    ///
    /// Returns false when the keyboard is out of stock or an equal line is
    /// already in the cart.
    pub fn add_to_cart(&self, username: &str, id: u32) -> Result<bool> {
        let Some(keyboard) = self.catalog.reserve(id)? else {
            return Ok(false);
        };
        let added = self.accounts.add_to_cart(username, &keyboard.snapshot(1), 1);
        if !matches!(added, Ok(true)) {
            // Hand the reserved unit back.
            self.adjust_stock(id, 1)?;
        }
        added
    }

    /// Removes the cart line equal to `line` and returns its reserved unit.
    pub fn remove_from_cart(&self, username: &str, line: &Keyboard) -> Result<bool> {
        if !self.accounts.remove_from_cart(username, line)? {
            return Ok(false);
        }
        self.adjust_stock(line.id, 1)?;
        Ok(true)
    }

    /// Moves every cart line into the order history and empties the cart.
    /// Returns the purchased lines.
    pub fn checkout(&self, username: &str) -> Result<Vec<Keyboard>> {
        let cart = self.accounts.get_cart(username)?;
        for line in &cart {
            if self.accounts.add_to_order_history(username, line, line.quantity)? {
                // One unit was already taken when the line was added.
                self.adjust_stock(line.id, 1 - line.quantity)?;
            }
        }
        self.accounts.clear_cart(username)?;
        info!(username, lines = cart.len(), "checkout complete");
        Ok(cart)
    }

    fn resolve(&self, username: &str) -> Result<Account> {
        self.accounts
            .get_by_username(username)
            .ok_or_else(|| Error::AccountNotFound(username.to_owned()))
    }

    /// Shifts the catalog stock of `id`. Keyboards deleted from the catalog
    /// are skipped.
    fn adjust_stock(&self, id: u32, delta: i32) -> Result<()> {
        if delta != 0 {
            self.catalog.adjust_quantity(id, delta)?;
        }
        Ok(())
    }
}
