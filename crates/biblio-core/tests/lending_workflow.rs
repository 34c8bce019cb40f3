//! End-to-end use cases against the in-memory adapters.

use std::sync::Arc;

use chrono::NaiveDate;

use biblio_adapters::{FixedClock, InMemoryStore};
use biblio_core::{
    application::GroupBy,
    domain::{ContactDraft, DataKind, Email, ImportState, LoanState, StockTier},
    error::ErrorCategory,
    prelude::*,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Library, FixedClock) {
    let clock = FixedClock::at(date(2024, 3, 1));
    let library = biblio_adapters::library(
        InMemoryStore::new(),
        Arc::new(clock.clone()),
        LibrarySettings::default(),
    );
    (library, clock)
}

fn add_book(library: &Library, title: &str) -> Book {
    library.catalog.create_book(BookDraft::new(title)).unwrap()
}

fn add_member(library: &Library, name: &str) -> MemberId {
    let draft = ContactDraft::person(name);
    library
        .members
        .register(MemberRegistration::new_person(draft))
        .unwrap()
        .member
        .id
}

#[test]
fn checkout_return_cycle_updates_book_status() {
    let (library, clock) = setup();
    let book = add_book(&library, "Rayuela");
    let member = add_member(&library, "Ana García");

    let checkout = library
        .loans
        .checkout(CheckoutRequest::new(book.id, member))
        .unwrap();
    assert!(checkout.warnings.is_empty());
    assert_eq!(checkout.loan.due_date(), date(2024, 3, 15));
    assert_eq!(
        library.catalog.get_book(book.id).unwrap().status,
        BookStatus::Loaned
    );

    clock.advance_days(16);
    assert_eq!(library.loans.sweep_overdue().unwrap(), 1);
    let overdue = library.loans.get(checkout.loan.id).unwrap();
    assert_eq!(overdue.state, LoanState::Overdue);

    let returned = library.loans.return_loan(checkout.loan.id).unwrap();
    assert_eq!(returned.state, LoanState::Returned);
    assert_eq!(returned.days_late(library.today()), 2);
    assert!(library.catalog.get_book(book.id).unwrap().available());
}

#[test]
fn second_checkout_of_same_book_names_the_holder() {
    let (library, _) = setup();
    let book = add_book(&library, "Ficciones");
    let ana = add_member(&library, "Ana García");
    let luis = add_member(&library, "Luis Pérez");

    library
        .loans
        .checkout(CheckoutRequest::new(book.id, ana))
        .unwrap();
    let err = library
        .loans
        .checkout(CheckoutRequest::new(book.id, luis))
        .unwrap_err();
    assert_eq!(err.to_string(), "'Ficciones' is already on loan to Ana García");
}

#[test]
fn sixth_open_loan_is_refused() {
    let (library, _) = setup();
    let member = add_member(&library, "Ana García");
    for i in 0..5 {
        let book = add_book(&library, &format!("Book {}", i));
        library
            .loans
            .checkout(CheckoutRequest::new(book.id, member))
            .unwrap();
    }

    let extra = add_book(&library, "One too many");
    let err = library
        .loans
        .checkout(CheckoutRequest::new(extra.id, member))
        .unwrap_err();
    assert_eq!(err.to_string(), "Member MBR-0001 already has 5 active loans");
    assert!(library.catalog.get_book(extra.id).unwrap().available());
}

#[test]
fn renewal_restarts_the_term_but_not_when_late() {
    let (library, clock) = setup();
    let book = add_book(&library, "Rayuela");
    let member = add_member(&library, "Ana García");
    let loan = library
        .loans
        .checkout(CheckoutRequest::new(book.id, member))
        .unwrap()
        .loan;

    clock.advance_days(10);
    let renewed = library.loans.renew(loan.id).unwrap();
    assert_eq!(renewed.start_date, date(2024, 3, 11));
    assert_eq!(renewed.due_date(), date(2024, 3, 25));

    clock.advance_days(20);
    assert!(library.loans.renew(loan.id).is_err());
}

#[test]
fn expired_membership_warns_but_lends() {
    let (library, clock) = setup();
    let book = add_book(&library, "Rayuela");
    let member = add_member(&library, "Ana García");

    clock.advance_days(400);
    let checkout = library
        .loans
        .checkout(CheckoutRequest::new(book.id, member))
        .unwrap();
    assert_eq!(checkout.warnings.len(), 1);
    assert!(checkout.warnings[0].contains("MBR-0001 expired on 2025-03-01"));
}

#[test]
fn book_import_reports_each_failed_line() {
    let (library, _) = setup();
    let file = "name,isbn,autor,editorial,paginas,precio\n\
                Rayuela,978-84-204-1214-6,Julio Cortázar,Alfaguara,736,22.50\n\
                ,9788437604947,,,,\n\
                Ficciones,123,Borges,,224,\n\
                Aleph,,Borges,,muchas,\n\
                El túnel,,Sabato,,158,\"9,90\"\n";

    let summary = library
        .imports
        .import_books(file.as_bytes(), &ImportOptions::default())
        .unwrap();

    assert_eq!(summary.processed, 5);
    assert_eq!(summary.created, 2);
    let lines: Vec<usize> = summary.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert_eq!(summary.errors[2].message, "Pages must be a number: muchas");

    let log = library.imports.log(summary.log_id).unwrap();
    assert_eq!(log.state, ImportState::CompletedWithErrors);
    assert_eq!((log.processed, log.succeeded, log.failed), (5, 2, 3));
    assert_eq!(log.created_ids, summary.created_ids);
}

#[test]
fn member_import_skips_known_emails() {
    let (library, _) = setup();
    let template = library.imports.template(DataKind::Member).unwrap();

    let first = library
        .imports
        .import_members(template.as_bytes(), &ImportOptions::default())
        .unwrap();
    assert_eq!(first.created, 3);

    let second = library
        .imports
        .import_members(template.as_bytes(), &ImportOptions::default())
        .unwrap();
    assert_eq!((second.created, second.skipped), (0, 3));
    assert!(second.errors.is_empty());

    let log = library.imports.log(second.log_id).unwrap();
    assert!(log.errors.contains("Line 2: skipped duplicate"));
}

#[test]
fn exported_books_import_into_a_fresh_library() {
    let (source, _) = setup();
    let template = source.imports.template(DataKind::Book).unwrap();
    source
        .imports
        .import_books(template.as_bytes(), &ImportOptions::default())
        .unwrap();

    let file = source.exports.export(&ExportRequest::new(DataKind::Book)).unwrap();
    assert_eq!(file.records, 3);
    assert!(file.file_name.starts_with("export_book_20240301_"));

    let (target, _) = setup();
    let options = ImportOptions {
        format: CsvFormat {
            delimiter: Delimiter::Semicolon,
            has_header: true,
        },
        ..ImportOptions::default()
    };
    let summary = target.imports.import_books(&file.bytes, &options).unwrap();
    assert_eq!(summary.created, 3);
    assert!(summary.errors.is_empty());

    let ficciones = target.catalog.find_by_isbn("9788420633800").unwrap().unwrap();
    assert_eq!(ficciones.author.as_deref(), Some("Jorge Luis Borges"));
    assert!((ficciones.price - 12.95).abs() < f64::EPSILON);
}

#[test]
fn exported_members_import_into_a_fresh_library() {
    let (source, _) = setup();
    let template = source.imports.template(DataKind::Member).unwrap();
    source
        .imports
        .import_members(template.as_bytes(), &ImportOptions::default())
        .unwrap();

    let file = source.exports.export(&ExportRequest::new(DataKind::Member)).unwrap();
    assert_eq!(file.records, 3);
    assert!(file.file_name.starts_with("export_member_20240301_"));

    let (target, _) = setup();
    let options = ImportOptions {
        format: CsvFormat {
            delimiter: Delimiter::Semicolon,
            has_header: true,
        },
        ..ImportOptions::default()
    };
    let summary = target.imports.import_members(&file.bytes, &options).unwrap();
    assert_eq!(summary.created, 3);
    assert!(summary.errors.is_empty());

    let email = Email::parse("luis.perez@example.com").unwrap();
    let luis = target.members.find_by_email(&email).unwrap().unwrap();
    assert_eq!(luis.name(), "Luis Pérez");
    assert_eq!(luis.member.registration_date, date(2024, 2, 1));
}

#[test]
fn oversized_stock_is_refused_without_changing_the_record() {
    let (library, _) = setup();
    let book = add_book(&library, "Rayuela");
    library.inventory.init(book.id, 1).unwrap();

    let err = library.inventory.add_stock(book.id, i64::MAX).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(library.inventory.adjust(book.id, i64::MAX, 1, 0).is_err());

    let view = library.inventory.for_book(book.id).unwrap();
    assert_eq!(view.snapshot.total, 1);
}

#[test]
fn inventory_tiers_follow_open_loans() {
    let (library, _) = setup();
    let book = add_book(&library, "Rayuela");
    let member = add_member(&library, "Ana García");

    let view = library.inventory.init(book.id, 3).unwrap();
    assert_eq!(view.snapshot.tier, StockTier::Low);

    library
        .loans
        .checkout(CheckoutRequest::new(book.id, member))
        .unwrap();
    let view = library.inventory.for_book(book.id).unwrap();
    assert_eq!(view.snapshot.available, 2);
    assert_eq!(view.snapshot.tier, StockTier::Low);

    library.inventory.add_stock(book.id, 10).unwrap();
    let high = library.inventory.list(Some(StockTier::High)).unwrap();
    assert_eq!(high.len(), 1);
}

#[test]
fn loan_report_groups_by_state() {
    let (library, clock) = setup();
    let member = add_member(&library, "Ana García");
    let first = add_book(&library, "Rayuela");
    let second = add_book(&library, "Ficciones");
    let loan = library
        .loans
        .checkout(CheckoutRequest::new(first.id, member))
        .unwrap()
        .loan;
    library
        .loans
        .checkout(CheckoutRequest::new(second.id, member))
        .unwrap();
    clock.advance_days(1);
    library.loans.return_loan(loan.id).unwrap();

    let report = library
        .reports
        .loan_report(&LoanReportRequest {
            group_by: GroupBy::State,
            ..LoanReportRequest::default()
        })
        .unwrap();
    assert_eq!(report.totals.total(), 2);
    assert_eq!((report.totals.active, report.totals.returned), (1, 1));
    let keys: Vec<&str> = report.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["active", "returned"]);
    assert!(report.render().unwrap().contains("Rayuela"));
}

#[test]
fn empty_loan_report_is_an_error() {
    let (library, _) = setup();
    let err = library
        .reports
        .loan_report(&LoanReportRequest::default())
        .unwrap_err();
    assert!(err.to_string().contains("No loans"));
}
