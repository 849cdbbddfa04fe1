use std::path::PathBuf;

use crate::db::open_ledger;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>, user: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(user) = user {
        settings.user_name = user.trim().to_string();
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    open_ledger(&resolved)?;

    println!("Initialized casa at {}", resolved.display());
    if settings.user_name.is_empty() {
        println!("No user set yet; imports need `casa init --user NAME`.");
    } else {
        println!("Importing as {}", settings.user_name);
    }
    Ok(())
}
