use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Full,
    Tkl,
    Sixty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchColor {
    Black,
    Red,
    Blue,
    Brown,
}

/// A catalog keyboard. The same type is used for cart and order-history lines,
/// where `quantity` is the requested count instead of the available stock.
///
/// Equality compares `id`, `name`, `price` and `quantity` only. Two cart lines
/// for the same keyboard with different quantities are therefore not equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyboard {
    #[serde(rename = "keyboardId")]
    pub id: u32,
    #[serde(rename = "keyboardName")]
    pub name: String,
    pub size: Size,
    #[serde(rename = "switchColor")]
    pub switch_color: SwitchColor,
    pub price: u32,
    pub quantity: i32,
}

impl Keyboard {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        size: Size,
        switch_color: SwitchColor,
        price: u32,
        quantity: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            switch_color,
            price,
            quantity,
        }
    }

    /// Copies this keyboard as a standalone line with the given quantity.
    pub fn snapshot(&self, quantity: i32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

impl PartialEq for Keyboard {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.price == other.price
            && self.quantity == other.quantity
    }
}

impl Eq for Keyboard {}

impl fmt::Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Keyboard [id={}, name={}, size={:?}, switchColor={:?}, price={}, quantity={}]",
            self.id, self.name, self.size, self.switch_color, self.price, self.quantity
        )
    }
}

fn logged_in_by_default() -> bool {
    true
}

/// A user account. Accounts are keyed and compared by `username` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
    #[serde(rename = "userOrderHistory", default)]
    pub order_history: Vec<Keyboard>,
    #[serde(rename = "userCart", default)]
    pub cart: Vec<Keyboard>,
    #[serde(rename = "loginStatus", default = "logged_in_by_default")]
    pub login_status: bool,
}

impl Account {
    /// A fresh account: empty cart and order history, logged in.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            order_history: Vec::new(),
            cart: Vec::new(),
            login_status: true,
        }
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for Account {}

/// Flat CSV shape of a catalog keyboard used by export and import.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyboardRow {
    pub id: u32,
    pub name: String,
    pub size: Size,
    pub switch_color: SwitchColor,
    pub price: u32,
    pub quantity: i32,
}

impl From<&Keyboard> for KeyboardRow {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            id: keyboard.id,
            name: keyboard.name.clone(),
            size: keyboard.size,
            switch_color: keyboard.switch_color,
            price: keyboard.price,
            quantity: keyboard.quantity,
        }
    }
}

impl From<KeyboardRow> for Keyboard {
    fn from(row: KeyboardRow) -> Self {
        Keyboard::new(
            row.id,
            row.name,
            row.size,
            row.switch_color,
            row.price,
            row.quantity,
        )
    }
}
