//! `biblio category`

use tracing::info;

use super::or_dash;
use crate::{cli::CategoryCommands, error::CliResult, output::OutputManager, session::Session};

pub fn execute(cmd: CategoryCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let catalog = &session.library.catalog;
    match cmd {
        CategoryCommands::Add {
            name,
            description,
            color,
        } => {
            let category = catalog.create_category(&name, description, color)?;
            if output.is_json() {
                return output.json(&category);
            }
            output.success(&format!(
                "Created category {} \"{}\" (color {})",
                category.id, category.name, category.color
            ))?;
        }
        CategoryCommands::List => {
            let categories = catalog.list_categories()?;
            if output.is_json() {
                let items: Vec<_> = categories
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "category": c.category,
                            "book_count": c.book_count,
                        })
                    })
                    .collect();
                return output.json(&items);
            }
            if categories.is_empty() {
                output.info("No categories yet")?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = categories
                .iter()
                .map(|c| {
                    vec![
                        c.category.id.to_string(),
                        c.category.name.clone(),
                        c.category.color.to_string(),
                        c.book_count.to_string(),
                        or_dash(c.category.description.as_deref()),
                    ]
                })
                .collect();
            output.table(&["ID", "NAME", "COLOR", "BOOKS", "DESCRIPTION"], &rows)?;
        }
        CategoryCommands::Rename { id, name } => {
            let category = catalog.rename_category(id, &name)?;
            if output.is_json() {
                return output.json(&category);
            }
            output.success(&format!("Category {} is now \"{}\"", category.id, category.name))?;
        }
        CategoryCommands::Assign { book, categories } => {
            let book = catalog.assign_categories(book, &categories)?;
            let names = catalog.category_names(&book)?;
            if output.is_json() {
                return output.json(&serde_json::json!({
                    "book": book.id,
                    "categories": names,
                }));
            }
            output.success(&format!("\"{}\" is filed under {}", book.title, names.join(", ")))?;
        }
        CategoryCommands::Delete { id } => {
            let detached = catalog.delete_category(id)?;
            info!(category = %id, detached, "Category deleted");
            output.success(&format!(
                "Deleted category {id}; removed from {detached} book(s)"
            ))?;
        }
    }
    Ok(())
}
