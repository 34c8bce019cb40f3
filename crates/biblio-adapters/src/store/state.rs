//! The tables held by the store and their on-disk snapshot form.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use biblio_core::{
    application::ApplicationError,
    domain::{
        Book, BookId, Category, CategoryId, Contact, ContactId, ImportLog, ImportLogId, InventoryId,
        InventoryRecord, Loan, LoanId, Member, MemberId,
    },
    error::LibraryResult,
};

/// Snapshot layout version written to disk.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Last id handed out per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequences {
    pub book: u64,
    pub contact: u64,
    pub member: u64,
    pub loan: u64,
    pub category: u64,
    pub inventory: u64,
    pub import_log: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub books: BTreeMap<BookId, Book>,
    pub contacts: BTreeMap<ContactId, Contact>,
    pub members: BTreeMap<MemberId, Member>,
    pub loans: BTreeMap<LoanId, Loan>,
    pub categories: BTreeMap<CategoryId, Category>,
    pub inventory: BTreeMap<InventoryId, InventoryRecord>,
    pub import_logs: BTreeMap<ImportLogId, ImportLog>,
    pub sequences: Sequences,
}

/// Serialized form: plain lists, so ids never become JSON object keys.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub version: u32,
    pub sequences: Sequences,
    pub books: Vec<Book>,
    pub contacts: Vec<Contact>,
    pub members: Vec<Member>,
    pub loans: Vec<Loan>,
    pub categories: Vec<Category>,
    pub inventory: Vec<InventoryRecord>,
    pub import_logs: Vec<ImportLog>,
}

impl From<&LibraryState> for Snapshot {
    fn from(state: &LibraryState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            sequences: state.sequences,
            books: state.books.values().cloned().collect(),
            contacts: state.contacts.values().cloned().collect(),
            members: state.members.values().cloned().collect(),
            loans: state.loans.values().cloned().collect(),
            categories: state.categories.values().cloned().collect(),
            inventory: state.inventory.values().cloned().collect(),
            import_logs: state.import_logs.values().cloned().collect(),
        }
    }
}

impl From<Snapshot> for LibraryState {
    fn from(snapshot: Snapshot) -> Self {
        let mut state = Self {
            books: snapshot.books.into_iter().map(|r| (r.id, r)).collect(),
            contacts: snapshot.contacts.into_iter().map(|r| (r.id, r)).collect(),
            members: snapshot.members.into_iter().map(|r| (r.id, r)).collect(),
            loans: snapshot.loans.into_iter().map(|r| (r.id, r)).collect(),
            categories: snapshot.categories.into_iter().map(|r| (r.id, r)).collect(),
            inventory: snapshot.inventory.into_iter().map(|r| (r.id, r)).collect(),
            import_logs: snapshot.import_logs.into_iter().map(|r| (r.id, r)).collect(),
            sequences: snapshot.sequences,
        };
        state.repair_sequences();
        state
    }
}

impl LibraryState {
    /// Sequences never fall behind the highest stored id.
    fn repair_sequences(&mut self) {
        let seq = &mut self.sequences;
        seq.book = seq.book.max(last(&self.books, BookId::get));
        seq.contact = seq.contact.max(last(&self.contacts, ContactId::get));
        seq.member = seq.member.max(last(&self.members, MemberId::get));
        seq.loan = seq.loan.max(last(&self.loans, LoanId::get));
        seq.category = seq.category.max(last(&self.categories, CategoryId::get));
        seq.inventory = seq.inventory.max(last(&self.inventory, InventoryId::get));
        seq.import_log = seq.import_log.max(last(&self.import_logs, ImportLogId::get));
    }
}

fn last<K: Copy, V>(map: &BTreeMap<K, V>, get: fn(K) -> u64) -> u64 {
    map.keys().next_back().map_or(0, |k| get(*k))
}

pub fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

pub fn fetch<K, V>(map: &BTreeMap<K, V>, entity: &'static str, id: K) -> LibraryResult<V>
where
    K: Ord + Display,
    V: Clone,
{
    map.get(&id)
        .cloned()
        .ok_or_else(|| ApplicationError::not_found(entity, id).into())
}

pub fn add<K, V>(map: &mut BTreeMap<K, V>, entity: &'static str, id: K, value: V) -> LibraryResult<()>
where
    K: Ord + Display,
{
    if map.contains_key(&id) {
        return Err(ApplicationError::Storage {
            reason: format!("{} {} is already stored", entity, id),
        }
        .into());
    }
    map.insert(id, value);
    Ok(())
}

pub fn replace<K, V>(map: &mut BTreeMap<K, V>, entity: &'static str, id: K, value: V) -> LibraryResult<()>
where
    K: Ord + Display,
{
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(ApplicationError::not_found(entity, id).into()),
    }
}

pub fn discard<K, V>(map: &mut BTreeMap<K, V>, entity: &'static str, id: K) -> LibraryResult<()>
where
    K: Ord + Display,
{
    map.remove(&id)
        .map(|_| ())
        .ok_or_else(|| ApplicationError::not_found(entity, id).into())
}
