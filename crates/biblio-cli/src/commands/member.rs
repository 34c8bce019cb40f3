//! `biblio member`: registration and membership terms.

use tracing::{info, instrument};

use biblio_core::{
    application::{MemberContact, MemberPatch, MemberQuery, MemberRegistration},
    domain::{ContactDraft, MemberProfile},
};

use super::{or_dash, yes_no};
use crate::{
    cli::{MemberAddArgs, MemberCommands, MemberUpdateArgs},
    error::{CliError, CliResult},
    output::{OutputManager, confirm},
    session::Session,
};

#[instrument(skip_all)]
pub fn execute(cmd: MemberCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let members = &session.library.members;
    match cmd {
        MemberCommands::Add(args) => add(args, session, output),
        MemberCommands::List {
            active,
            inactive,
            search,
        } => {
            let query = MemberQuery {
                active: match (active, inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                search,
            };
            list(&members.list(&query)?, output)
        }
        MemberCommands::Show { member } => {
            let profile = members.get(session.member_id(&member)?)?;
            show(&profile, session, output)
        }
        MemberCommands::Update(args) => update(args, session, output),
        MemberCommands::Renew { member } => {
            let profile = members.renew(session.member_id(&member)?)?;
            done(
                &profile,
                &format!(
                    "Renewed {} until {}",
                    profile.label(),
                    profile.member.expiry_date()
                ),
                output,
            )
        }
        MemberCommands::Deactivate { member } => {
            let profile = members.set_active(session.member_id(&member)?, false)?;
            done(&profile, &format!("Deactivated {}", profile.label()), output)
        }
        MemberCommands::Activate { member } => {
            let profile = members.set_active(session.member_id(&member)?, true)?;
            done(&profile, &format!("Activated {}", profile.label()), output)
        }
        MemberCommands::Delete { member, yes } => {
            let id = session.member_id(&member)?;
            let profile = members.get(id)?;
            if !yes && !confirm(&format!("Delete member {}?", profile.label()))? {
                return Err(CliError::Cancelled);
            }
            let deleted = members.delete(id)?;
            info!(member = %deleted.id, "Member deleted");
            output.success(&format!("Deleted member {}", deleted.card_number))?;
            Ok(())
        }
    }
}

fn add(args: MemberAddArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let contact = match (args.contact, args.name) {
        (Some(id), _) => MemberContact::Existing(id),
        (None, Some(name)) => MemberContact::New(ContactDraft {
            email: args.email,
            phone: args.phone,
            address: args.address,
            ..ContactDraft::person(name)
        }),
        (None, None) => {
            return Err(CliError::InvalidInput {
                message: "a name or --contact is required".into(),
                source: None,
            });
        }
    };
    let profile = session.library.members.register(MemberRegistration {
        contact,
        registration_date: args.registered,
        notes: args.notes,
    })?;
    info!(member = %profile.member.id, card = profile.card_number(), "Member registered");
    done(
        &profile,
        &format!("Registered {} with card {}", profile.name(), profile.card_number()),
        output,
    )
}

fn update(args: MemberUpdateArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let patch = MemberPatch {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        notes: args.notes,
    };
    if patch == MemberPatch::default() {
        return Err(CliError::InvalidInput {
            message: "nothing to update; pass at least one field".into(),
            source: None,
        });
    }
    let profile = session
        .library
        .members
        .update(session.member_id(&args.member)?, patch)?;
    done(&profile, &format!("Updated {}", profile.label()), output)
}

fn done(profile: &MemberProfile, message: &str, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(profile);
    }
    output.success(message)?;
    Ok(())
}

fn list(profiles: &[MemberProfile], output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(profiles);
    }
    if profiles.is_empty() {
        output.info("No members found")?;
        return Ok(());
    }
    let rows: Vec<Vec<String>> = profiles
        .iter()
        .map(|p| {
            vec![
                p.member.id.to_string(),
                p.card_number().to_string(),
                p.name().to_string(),
                or_dash(p.email()),
                p.active_loans.to_string(),
                yes_no(p.member.active),
            ]
        })
        .collect();
    output.table(&["ID", "CARD", "NAME", "EMAIL", "LOANS", "ACTIVE"], &rows)?;
    Ok(())
}

fn show(profile: &MemberProfile, session: &Session, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(profile);
    }
    let member = &profile.member;
    let expired = session.library.members.is_expired(member);
    let mut fields = vec![
        ("ID", member.id.to_string()),
        ("Card", member.card_number.clone()),
        ("Name", profile.name().to_string()),
        ("Email", or_dash(profile.email())),
        ("Phone", or_dash(profile.phone())),
        ("Address", or_dash(profile.address())),
        ("Registered", member.registration_date.to_string()),
        (
            "Expires",
            if expired {
                format!("{} (expired)", member.expiry_date())
            } else {
                member.expiry_date().to_string()
            },
        ),
        ("Active", yes_no(member.active)),
        (
            "Loans",
            format!("{} open, {} total", profile.active_loans, profile.total_loans),
        ),
    ];
    if let Some(notes) = &member.notes {
        fields.push(("Notes", notes.clone()));
    }
    output.fields(&fields)?;
    Ok(())
}
