//! File-backed user accounts, including each account's cart and order
//! history.
//!
//! Cart and order-history lines are matched with [`Keyboard`]'s value
//! equality, which includes the quantity. A line for the same keyboard with a
//! different quantity is a different line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::json_utils::{read_json, write_json};
use crate::model::{Account, Keyboard};

type Accounts = HashMap<String, Account>;

#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: Mutex<Accounts>,
}

impl AccountStore {
    /// Loads accounts from `path`. A missing or malformed file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records: Vec<Account> = read_json(&path)?;
        let accounts: Accounts = records
            .into_iter()
            .map(|a| (a.username.clone(), a))
            .collect();
        info!(path = %path.display(), accounts = accounts.len(), "accounts loaded");
        Ok(Self {
            path,
            accounts: Mutex::new(accounts),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, accounts: &Accounts) -> Result<()> {
        let records = sorted(accounts);
        if let Err(err) = write_json(&self.path, &records) {
            warn!(path = %self.path.display(), error = %err, "accounts snapshot write failed");
            return Err(err);
        }
        debug!(path = %self.path.display(), accounts = records.len(), "accounts snapshot written");
        Ok(())
    }

    /// Runs `apply` on the stored account and writes the snapshot if it
    /// reports a change. Returns what `apply` reported.
    fn modify(&self, username: &str, apply: impl FnOnce(&mut Account) -> bool) -> Result<bool> {
        let mut accounts = self.lock();
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| Error::AccountNotFound(username.to_owned()))?;
        let changed = apply(account);
        if changed {
            self.save(&accounts)?;
        }
        Ok(changed)
    }

    fn read<T>(&self, username: &str, view: impl FnOnce(&Account) -> T) -> Result<T> {
        self.lock()
            .get(username)
            .map(view)
            .ok_or_else(|| Error::AccountNotFound(username.to_owned()))
    }

    pub fn get_by_username(&self, username: &str) -> Option<Account> {
        self.lock().get(username).cloned()
    }

    /// All accounts ordered by username.
    pub fn get_all(&self) -> Vec<Account> {
        sorted(&self.lock()).into_iter().cloned().collect()
    }

    /// Creates a fresh account from the candidate's username and password.
    pub fn create(&self, candidate: &Account) -> Result<Account> {
        let mut accounts = self.lock();
        let account = Account::new(candidate.username.as_str(), candidate.password.as_str());
        if accounts.values().any(|a| *a == account) {
            return Err(Error::AccountConflict(account.username));
        }
        accounts.insert(account.username.clone(), account.clone());
        self.save(&accounts)?;
        Ok(account)
    }

    /// Replaces the whole stored record for `account.username`.
    pub fn update(&self, account: Account) -> Result<Account> {
        let mut accounts = self.lock();
        if !accounts.contains_key(&account.username) || !accounts.values().any(|a| *a == account) {
            return Err(Error::AccountNotFound(account.username));
        }
        accounts.insert(account.username.clone(), account.clone());
        self.save(&accounts)?;
        Ok(account)
    }

    /// Removes an account. Returns false, without writing, if it was absent.
    pub fn delete(&self, username: &str) -> Result<bool> {
        let mut accounts = self.lock();
        if accounts.remove(username).is_none() {
            return Ok(false);
        }
        self.save(&accounts)?;
        Ok(true)
    }

    pub fn login(&self, username: &str) -> Result<()> {
        self.set_login_status(username, true)
    }

    pub fn logout(&self, username: &str) -> Result<()> {
        self.set_login_status(username, false)
    }

    fn set_login_status(&self, username: &str, status: bool) -> Result<()> {
        self.modify(username, |account| {
            account.login_status = status;
            true
        })?;
        Ok(())
    }

    /// Appends a copy of `keyboard` to the cart unless an equal line is
    /// already there. The line keeps `keyboard.quantity`; callers set the
    /// requested count on `keyboard` itself.
    pub fn add_to_cart(&self, username: &str, keyboard: &Keyboard, _quantity: i32) -> Result<bool> {
        self.modify(username, |account| {
            if account.cart.contains(keyboard) {
                return false;
            }
            account.cart.push(keyboard.clone());
            true
        })
    }

    /// Removes the first cart line equal to `keyboard`.
    pub fn remove_from_cart(&self, username: &str, keyboard: &Keyboard) -> Result<bool> {
        self.modify(username, |account| {
            match account.cart.iter().position(|line| line == keyboard) {
                Some(index) => {
                    account.cart.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    pub fn increase_quantity(&self, username: &str, keyboard: &Keyboard) -> Result<bool> {
        self.adjust_quantity(username, keyboard, 1)
    }

    /// No floor is applied: a line can be decreased below zero.
    pub fn decrease_quantity(&self, username: &str, keyboard: &Keyboard) -> Result<bool> {
        self.adjust_quantity(username, keyboard, -1)
    }

    fn adjust_quantity(&self, username: &str, keyboard: &Keyboard, delta: i32) -> Result<bool> {
        self.modify(username, |account| {
            match account.cart.iter_mut().find(|line| *line == keyboard) {
                Some(line) => {
                    line.quantity += delta;
                    true
                }
                None => false,
            }
        })
    }

    pub fn clear_cart(&self, username: &str) -> Result<bool> {
        self.modify(username, |account| {
            account.cart = Vec::new();
            true
        })
    }

    /// A copy of the account's cart.
    pub fn get_cart(&self, username: &str) -> Result<Vec<Keyboard>> {
        self.read(username, |account| account.cart.clone())
    }

    /// The cart line equal to `keyboard`, if any.
    pub fn get_item_from_cart(&self, username: &str, keyboard: &Keyboard) -> Result<Option<Keyboard>> {
        self.read(username, |account| {
            account.cart.iter().find(|line| *line == keyboard).cloned()
        })
    }

    /// Records a purchase of `quantity` units. An equal order-history line
    /// has its quantity increased, otherwise a new line is appended.
    ///
    /// A `keyboard` with zero quantity is accepted without any change.
    pub fn add_to_order_history(
        &self,
        username: &str,
        keyboard: &Keyboard,
        quantity: i32,
    ) -> Result<bool> {
        self.modify(username, |account| {
            if keyboard.quantity == 0 {
                return false;
            }
            match account.order_history.iter_mut().find(|line| *line == keyboard) {
                Some(line) => line.quantity += quantity,
                None => account.order_history.push(keyboard.snapshot(quantity)),
            }
            true
        })?;
        Ok(true)
    }

    /// A copy of the order history, or `None` for an unknown username.
    pub fn get_order_history(&self, username: &str) -> Option<Vec<Keyboard>> {
        self.read(username, |account| account.order_history.clone()).ok()
    }
}

fn sorted(accounts: &Accounts) -> Vec<&Account> {
    let mut records: Vec<_> = accounts.values().collect();
    records.sort_by(|a, b| a.username.cmp(&b.username));
    records
}
