//! `biblio inventory`

use serde_json::json;

use biblio_core::application::InventoryView;

use crate::{cli::InventoryCommands, error::CliResult, output::OutputManager, session::Session};

pub fn execute(cmd: InventoryCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let inventory = &session.library.inventory;
    match cmd {
        InventoryCommands::Init { book, stock } => {
            let view = inventory.init(book, stock)?;
            done(&view, &format!("Stock record opened for \"{}\"", view.book_title), output)
        }
        InventoryCommands::Show { book } => {
            let view = inventory.for_book(book)?;
            if output.is_json() {
                return output.json(&view_json(&view));
            }
            let s = &view.snapshot;
            output.fields(&[
                ("Book", format!("{} \"{}\"", view.record.book_id, view.book_title)),
                ("Initial", view.record.initial_stock.to_string()),
                ("Inflows", view.record.inflows.to_string()),
                ("Outflows", view.record.outflows.to_string()),
                ("Total", s.total.to_string()),
                ("Loaned", format!("{} ({:.1}%)", s.loaned, s.loaned_percentage)),
                ("Available", s.available.to_string()),
                ("Value", format!("{:.2}", s.value)),
                ("Tier", s.tier.to_string()),
            ])?;
            Ok(())
        }
        InventoryCommands::List { tier } => {
            let views = inventory.list(tier)?;
            if output.is_json() {
                return output.json(&views.iter().map(view_json).collect::<Vec<_>>());
            }
            if views.is_empty() {
                output.info("No stock records")?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = views
                .iter()
                .map(|v| {
                    vec![
                        v.record.book_id.to_string(),
                        v.book_title.clone(),
                        v.snapshot.total.to_string(),
                        v.snapshot.loaned.to_string(),
                        v.snapshot.available.to_string(),
                        v.snapshot.tier.to_string(),
                    ]
                })
                .collect();
            output.table(&["BOOK", "TITLE", "TOTAL", "LOANED", "AVAILABLE", "TIER"], &rows)?;
            Ok(())
        }
        InventoryCommands::AddStock { book, quantity } => {
            let view = inventory.add_stock(book, quantity)?;
            done(
                &view,
                &format!(
                    "Added {quantity} cop{} of \"{}\"; {} in stock",
                    if quantity == 1 { "y" } else { "ies" },
                    view.book_title,
                    view.snapshot.total
                ),
                output,
            )
        }
        InventoryCommands::WriteOff { book } => {
            let view = inventory.write_off(book)?;
            done(
                &view,
                &format!(
                    "Wrote off one copy of \"{}\"; {} available",
                    view.book_title, view.snapshot.available
                ),
                output,
            )
        }
        InventoryCommands::Adjust {
            book,
            initial,
            inflows,
            outflows,
        } => {
            let view = inventory.adjust(book, initial, inflows, outflows)?;
            done(
                &view,
                &format!("Stock of \"{}\" set to {}", view.book_title, view.snapshot.total),
                output,
            )
        }
    }
}

fn done(view: &InventoryView, message: &str, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(&view_json(view));
    }
    output.success(message)?;
    Ok(())
}

fn view_json(view: &InventoryView) -> serde_json::Value {
    json!({
        "record": view.record,
        "book": view.book_title,
        "snapshot": view.snapshot,
    })
}
