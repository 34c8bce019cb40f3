//! `biblio author`

use biblio_core::domain::{AuthorProfile, ContactDraft};

use super::or_dash;
use crate::{cli::AuthorCommands, error::CliResult, output::OutputManager, session::Session};

pub fn execute(cmd: AuthorCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let catalog = &session.library.catalog;
    match cmd {
        AuthorCommands::Add {
            name,
            nationality,
            born,
            died,
            genre,
            biography,
            email,
        } => {
            let draft = ContactDraft {
                email,
                author: Some(AuthorProfile {
                    biography,
                    birth_date: born,
                    death_date: died,
                    nationality,
                    genre,
                }),
                ..ContactDraft::person(name)
            };
            let author = catalog.add_author(draft)?;
            if output.is_json() {
                return output.json(&author);
            }
            output.success(&format!(
                "Registered author {} \"{}\"",
                author.id,
                author.display_name()
            ))?;
        }
        AuthorCommands::List => {
            let authors = catalog.list_authors()?;
            if output.is_json() {
                let items: Vec<_> = authors
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "author": a.contact,
                            "book_count": a.book_count,
                        })
                    })
                    .collect();
                return output.json(&items);
            }
            if authors.is_empty() {
                output.info("No authors registered")?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = authors
                .iter()
                .map(|a| {
                    let profile = a.contact.author.as_ref();
                    vec![
                        a.contact.id.to_string(),
                        a.contact.display_name(),
                        or_dash(profile.and_then(|p| p.nationality.as_deref())),
                        or_dash(profile.and_then(|p| p.genre)),
                        a.book_count.to_string(),
                    ]
                })
                .collect();
            output.table(&["ID", "NAME", "NATIONALITY", "GENRE", "BOOKS"], &rows)?;
        }
    }
    Ok(())
}
