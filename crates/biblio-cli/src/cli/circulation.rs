//! `member`, `loan` and `inventory` arguments.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use biblio_core::domain::{BookId, ContactId, LoanId, LoanState, StockTier};

use crate::session::MemberRef;

// ── member ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum MemberCommands {
    /// Register a member. A card number is assigned automatically.
    #[command(visible_alias = "new")]
    Add(MemberAddArgs),

    /// List members.
    #[command(visible_alias = "ls")]
    List {
        /// Only active members.
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        /// Only inactive members.
        #[arg(long)]
        inactive: bool,
        /// Match name, email or card number.
        #[arg(short = 's', long)]
        search: Option<String>,
    },

    /// Show a member with loan counts and membership status.
    Show {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },

    /// Change contact details or notes.
    Update(MemberUpdateArgs),

    /// Restart the membership term from today.
    Renew {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },

    /// Stop a member from borrowing.
    Deactivate {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },

    /// Allow a member to borrow again.
    Activate {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },

    /// Delete a member. Refused while they have open loans.
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct MemberAddArgs {
    /// Full name. Ignored with `--contact`.
    #[arg(required_unless_present = "contact")]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Make an existing contact a member instead of creating one.
    #[arg(long, value_name = "CONTACT_ID", conflicts_with_all = ["email", "phone", "address"])]
    pub contact: Option<ContactId>,

    /// Registration date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub registered: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct MemberUpdateArgs {
    #[arg(value_name = "MEMBER")]
    pub member: MemberRef,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

// ── loan ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum LoanCommands {
    /// Lend a book to a member.
    #[command(visible_alias = "lend")]
    Checkout(LoanCheckoutArgs),

    /// Take a book back.
    Return {
        #[arg(value_name = "LOAN_ID")]
        id: LoanId,
    },

    /// Extend a loan that is not late, starting today.
    Renew {
        #[arg(value_name = "LOAN_ID")]
        id: LoanId,
    },

    /// Delete a returned loan.
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "LOAN_ID")]
        id: LoanId,
    },

    /// List loans, newest first.
    #[command(visible_alias = "ls")]
    List(LoanListArgs),

    /// Mark loans past their due date as overdue.
    Sweep,
}

#[derive(Debug, Args)]
pub struct LoanCheckoutArgs {
    #[arg(value_name = "BOOK_ID")]
    pub book: BookId,

    /// Member id or card number.
    #[arg(value_name = "MEMBER")]
    pub member: MemberRef,

    /// Loan length. Defaults to `library.default_loan_days`.
    #[arg(short = 'd', long)]
    pub days: Option<i64>,

    /// Start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoanListArgs {
    #[arg(long, value_name = "MEMBER")]
    pub member: Option<MemberRef>,

    #[arg(long, value_name = "BOOK_ID")]
    pub book: Option<BookId>,

    /// active, overdue or returned.
    #[arg(long)]
    pub state: Option<LoanState>,

    /// Earliest start date.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Latest start date.
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

// ── inventory ─────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum InventoryCommands {
    /// Open the stock record of a book.
    Init {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
        /// Copies on hand.
        #[arg(long, default_value_t = 1)]
        stock: i64,
    },

    /// Show the stock figures of a book.
    Show {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
    },

    /// List stock records.
    #[command(visible_alias = "ls")]
    List {
        /// critical, low, normal or high.
        #[arg(long)]
        tier: Option<StockTier>,
    },

    /// Record incoming copies.
    AddStock {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: i64,
    },

    /// Write off one available copy.
    WriteOff {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
    },

    /// Overwrite the stock counters.
    Adjust {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
        #[arg(long)]
        initial: i64,
        #[arg(long, default_value_t = 0)]
        inflows: i64,
        #[arg(long, default_value_t = 0)]
        outflows: i64,
    },
}
