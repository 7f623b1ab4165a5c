use serde::Serialize;
use serde_json::json;
use std::io::Write;

use crate::{
    cli::{CartCommand, Command, KeyboardChanges, KeyboardCommand, NewKeyboard, UserCommand},
    csv_utils::{export_keyboards, import_keyboards},
    error::{Error, Result},
    model::Keyboard,
    Shop,
};

/// Runs one command against the shop and writes its result to the provided writer.
///
/// Records are written as pretty JSON, except `keyboards export` which writes CSV.
///
/// # Errors
/// Returns an error if:
/// * A keyboard or account named by the command does not exist
/// * A create conflicts with an existing record
/// * A backing file cannot be written, or an import file cannot be read
/// * Writing to the output fails
pub fn run<W: Write>(shop: &Shop, command: Command, mut writer: W) -> Result<()> {
    match command {
        Command::Keyboards(command) => run_keyboards(shop, command, &mut writer),
        Command::Users(command) => run_users(shop, command, &mut writer),
        Command::Cart(command) => run_cart(shop, command, &mut writer),
        Command::Orders { username } => {
            let history = shop
                .accounts()
                .get_order_history(&username)
                .ok_or(Error::AccountNotFound(username))?;
            emit(&mut writer, &history)
        }
    }
}

fn run_keyboards<W: Write>(shop: &Shop, command: KeyboardCommand, writer: &mut W) -> Result<()> {
    let catalog = shop.catalog();
    match command {
        KeyboardCommand::List { search, from, to } => {
            let mut keyboards = match (from, to) {
                (Some(from), Some(to)) => catalog.filter_by_price_range(&from, &to)?,
                _ => catalog.get_all(),
            };
            if let Some(text) = search {
                keyboards.retain(|k| k.name.contains(&text));
            }
            emit(writer, &keyboards)
        }
        KeyboardCommand::Get { id } => {
            let keyboard = catalog.get_by_id(id).ok_or(Error::KeyboardNotFound(id))?;
            emit(writer, &keyboard)
        }
        KeyboardCommand::Add(new) => emit(writer, &catalog.create(&keyboard_from(new))?),
        KeyboardCommand::Update { id, changes } => {
            let keyboard = catalog.get_by_id(id).ok_or(Error::KeyboardNotFound(id))?;
            emit(writer, &catalog.update(apply_changes(keyboard, changes))?)
        }
        KeyboardCommand::Delete { id } => {
            let deleted = catalog.delete(id)?;
            emit(writer, &json!({ "deleted": deleted }))
        }
        KeyboardCommand::Export => export_keyboards(writer, &catalog.get_all()),
        KeyboardCommand::Import { file } => {
            let created = import_keyboards(file)?
                .iter()
                .map(|keyboard| catalog.create(keyboard))
                .collect::<Result<Vec<_>>>()?;
            emit(writer, &created)
        }
    }
}

fn run_users<W: Write>(shop: &Shop, command: UserCommand, writer: &mut W) -> Result<()> {
    let accounts = shop.accounts();
    match command {
        UserCommand::List => emit(writer, &accounts.get_all()),
        UserCommand::Get { username } => {
            let account = accounts
                .get_by_username(&username)
                .ok_or(Error::AccountNotFound(username))?;
            emit(writer, &account)
        }
        UserCommand::Create { username, password } => {
            emit(writer, &shop.sign_up(&username, &password)?)
        }
        UserCommand::Delete { username } => {
            let deleted = accounts.delete(&username)?;
            emit(writer, &json!({ "deleted": deleted }))
        }
        UserCommand::Login { username, password } => {
            emit(writer, &shop.login(&username, &password)?)
        }
        UserCommand::Logout { username } => {
            shop.logout(&username)?;
            emit(writer, &json!({ "loginStatus": false }))
        }
    }
}

fn run_cart<W: Write>(shop: &Shop, command: CartCommand, writer: &mut W) -> Result<()> {
    let accounts = shop.accounts();
    let changed = match command {
        CartCommand::Show { username } => return emit(writer, &accounts.get_cart(&username)?),
        CartCommand::Checkout { username } => return emit(writer, &shop.checkout(&username)?),
        CartCommand::Add { username, id } => shop.add_to_cart(&username, id)?,
        CartCommand::Remove { username, id } => {
            let line = cart_line(shop, &username, id)?;
            shop.remove_from_cart(&username, &line)?
        }
        CartCommand::Increase { username, id } => {
            let line = cart_line(shop, &username, id)?;
            accounts.increase_quantity(&username, &line)?
        }
        CartCommand::Decrease { username, id } => {
            let line = cart_line(shop, &username, id)?;
            accounts.decrease_quantity(&username, &line)?
        }
        CartCommand::Clear { username } => accounts.clear_cart(&username)?,
    };
    emit(writer, &json!({ "changed": changed }))
}

/// The first line in the cart for keyboard `id`.
fn cart_line(shop: &Shop, username: &str, id: u32) -> Result<Keyboard> {
    shop.accounts()
        .get_cart(username)?
        .into_iter()
        .find(|line| line.id == id)
        .ok_or(Error::KeyboardNotFound(id))
}

fn keyboard_from(new: NewKeyboard) -> Keyboard {
    // The id is assigned by the catalog on create.
    Keyboard::new(0, new.name, new.size, new.switch_color, new.price, new.quantity)
}

fn apply_changes(mut keyboard: Keyboard, changes: KeyboardChanges) -> Keyboard {
    if let Some(name) = changes.name {
        keyboard.name = name;
    }
    if let Some(size) = changes.size {
        keyboard.size = size;
    }
    if let Some(switch_color) = changes.switch_color {
        keyboard.switch_color = switch_color;
    }
    if let Some(price) = changes.price {
        keyboard.price = price;
    }
    if let Some(quantity) = changes.quantity {
        keyboard.quantity = quantity;
    }
    keyboard
}

fn emit<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}
