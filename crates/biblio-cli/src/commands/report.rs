//! `biblio report`: printable text documents.

use serde_json::json;

use biblio_core::application::{LoanReport, LoanReportRequest};

use super::emit;
use crate::{
    cli::{LoanReportArgs, ReportCommands},
    error::CliResult,
    output::OutputManager,
    session::Session,
};

pub fn execute(cmd: ReportCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    let reports = &session.library.reports;
    match cmd {
        ReportCommands::Loans(args) => loans(args, session, output),
        ReportCommands::Book { id } => Ok(output.data(&reports.book_detail(id)?)?),
        ReportCommands::Catalog => Ok(output.data(&reports.catalog()?)?),
        ReportCommands::MemberCard { member } => {
            Ok(output.data(&reports.member_card(session.member_id(&member)?)?)?)
        }
        ReportCommands::MemberLoans { member } => {
            Ok(output.data(&reports.member_loans(session.member_id(&member)?)?)?)
        }
    }
}

fn loans(args: LoanReportArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let request = LoanReportRequest {
        member: args
            .member
            .as_ref()
            .map(|m| session.member_id(m))
            .transpose()?,
        state: args.state,
        from: args.from,
        to: args.to,
        group_by: args.group_by,
    };
    let report = session.library.reports.loan_report(&request)?;

    if output.is_json() {
        return output.json(&report_json(&report));
    }
    emit(output, args.output.path.as_deref(), &report.render()?)
}

fn report_json(report: &LoanReport) -> serde_json::Value {
    json!({
        "generated_on": report.generated_on,
        "totals": {
            "active": report.totals.active,
            "overdue": report.totals.overdue,
            "returned": report.totals.returned,
        },
        "groups": report.groups.iter().map(|g| json!({
            "key": g.key,
            "loans": g.rows.iter().map(|v| json!({
                "id": v.loan.id,
                "book": v.book_title,
                "member": v.member_label(),
                "start_date": v.loan.start_date,
                "due_date": v.due_date,
                "return_date": v.loan.return_date,
                "state": v.loan.state,
                "days_late": v.days_late,
            })).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}
