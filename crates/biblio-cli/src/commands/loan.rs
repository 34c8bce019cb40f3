//! `biblio loan`: checkout, return, renewal and the overdue sweep.

use serde_json::{Value, json};
use tracing::{info, instrument};

use biblio_core::{
    application::{CheckoutRequest, LoanQuery, LoanView},
    domain::Loan,
};

use super::or_dash;
use crate::{
    cli::{LoanCheckoutArgs, LoanCommands, LoanListArgs},
    error::CliResult,
    output::OutputManager,
    session::Session,
};

#[instrument(skip_all)]
pub fn execute(cmd: LoanCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let loans = &session.library.loans;
    match cmd {
        LoanCommands::Checkout(args) => checkout(args, session, output),
        LoanCommands::Return { id } => {
            let view = loans.describe(loans.return_loan(id)?)?;
            info!(loan = %id, "Loan returned");
            done(
                &view,
                &format!(
                    "\"{}\" returned by {}",
                    view.book_title,
                    view.member_label()
                ),
                output,
            )
        }
        LoanCommands::Renew { id } => {
            let view = loans.describe(loans.renew(id)?)?;
            done(
                &view,
                &format!("Loan {} renewed, now due {}", id, view.due_date),
                output,
            )
        }
        LoanCommands::Delete { id } => {
            let loan = loans.delete(id)?;
            output.success(&format!("Deleted loan {}", loan.id))?;
            Ok(())
        }
        LoanCommands::List(args) => list(args, session, output),
        LoanCommands::Sweep => {
            let marked = loans.sweep_overdue()?;
            if output.is_json() {
                return output.json(&json!({ "marked_overdue": marked }));
            }
            if marked == 0 {
                output.info("No loans became overdue")?;
            } else {
                output.success(&format!("Marked {marked} loan(s) as overdue"))?;
            }
            Ok(())
        }
    }
}

fn checkout(args: LoanCheckoutArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let loans = &session.library.loans;
    let request = CheckoutRequest {
        start_date: args.start,
        duration_days: args.days,
        notes: args.notes,
        ..CheckoutRequest::new(args.book, session.member_id(&args.member)?)
    };
    let checkout = loans.checkout(request)?;
    for warning in &checkout.warnings {
        output.warning(warning)?;
    }

    let view = loans.describe(checkout.loan)?;
    info!(loan = %view.loan.id, "Book checked out");
    done(
        &view,
        &format!(
            "Loan {}: \"{}\" to {}, due {}",
            view.loan.id,
            view.book_title,
            view.member_label(),
            view.due_date
        ),
        output,
    )
}

fn list(args: LoanListArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let loans = &session.library.loans;
    let query = LoanQuery {
        member: args
            .member
            .as_ref()
            .map(|m| session.member_id(m))
            .transpose()?,
        book: args.book,
        state: args.state,
        from: args.from,
        to: args.to,
    };
    let views = loans
        .list(&query)?
        .into_iter()
        .map(|loan| loans.describe(loan))
        .collect::<Result<Vec<_>, _>>()?;

    if output.is_json() {
        return output.json(&views.iter().map(view_json).collect::<Vec<_>>());
    }
    if views.is_empty() {
        output.info("No loans found")?;
        return Ok(());
    }
    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            vec![
                v.loan.id.to_string(),
                v.book_title.clone(),
                v.member_label(),
                v.loan.start_date.to_string(),
                v.due_date.to_string(),
                or_dash(v.loan.return_date),
                v.loan.state.to_string(),
                if v.days_late > 0 {
                    v.days_late.to_string()
                } else {
                    "-".into()
                },
            ]
        })
        .collect();
    output.table(
        &["ID", "BOOK", "MEMBER", "START", "DUE", "RETURNED", "STATE", "LATE"],
        &rows,
    )?;
    Ok(())
}

fn done(view: &LoanView, message: &str, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(&view_json(view));
    }
    output.success(message)?;
    Ok(())
}

fn view_json(view: &LoanView) -> Value {
    let Loan { id, book_id, member_id, .. } = &view.loan;
    json!({
        "id": id,
        "book_id": book_id,
        "book": view.book_title,
        "member_id": member_id,
        "member": view.member_name,
        "card_number": view.card_number,
        "start_date": view.loan.start_date,
        "due_date": view.due_date,
        "return_date": view.loan.return_date,
        "state": view.loan.state,
        "days_late": view.days_late,
        "notes": view.loan.notes,
    })
}
