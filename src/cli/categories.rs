use comfy_table::{Cell, Table};

use crate::db::open_ledger;
use crate::error::Result;
use crate::settings::get_data_dir;
use crate::store::list_categories;

pub fn list() -> Result<()> {
    let conn = open_ledger(&get_data_dir())?;
    let categories = list_categories(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type"]);
    for cat in categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.name),
            Cell::new(cat.category_type),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}
