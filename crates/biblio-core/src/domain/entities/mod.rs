pub mod book;
pub mod category;
pub mod common;
pub mod contact;
pub mod import_log;
pub mod inventory;
pub mod loan;
pub mod member;

pub use crate::domain::DomainError;
pub use book::{Book, BookDraft, BookPatch};
pub use category::{CATEGORY_COLORS, Category};
pub use common::{BookId, CategoryId, ContactId, ImportLogId, InventoryId, LoanId, MemberId};
pub use contact::{AuthorProfile, Contact, ContactDraft};
pub use import_log::ImportLog;
pub use inventory::{InventoryRecord, InventorySnapshot};
pub use loan::Loan;
pub use member::{Member, MemberProfile};
