//! Wiring: the set of ports every service draws from, and the facade that
//! the CLI and the HTTP server hold.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::application::{
    LibrarySettings,
    ports::{
        BookRepository, CategoryRepository, Clock, ContactRepository, ImportLogRepository,
        InventoryRepository, LoanRepository, MemberRepository, TableCodec,
    },
    services::{
        CatalogService, ExportService, ImportService, InventoryService, LoanService,
        MembershipService, ReportService,
    },
};

/// Driven ports shared by all services.
#[derive(Clone)]
pub struct Repositories {
    pub books: Arc<dyn BookRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub loans: Arc<dyn LoanRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub import_logs: Arc<dyn ImportLogRepository>,
    pub clock: Arc<dyn Clock>,
}

impl Repositories {
    /// Use one store for every repository port.
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Self
    where
        S: BookRepository
            + ContactRepository
            + MemberRepository
            + LoanRepository
            + CategoryRepository
            + InventoryRepository
            + ImportLogRepository
            + 'static,
    {
        Self {
            books: store.clone(),
            contacts: store.clone(),
            members: store.clone(),
            loans: store.clone(),
            categories: store.clone(),
            inventory: store.clone(),
            import_logs: store,
            clock,
        }
    }
}

/// Every use case behind one handle.
///
/// Services are cheap to clone; they share the same ports.
#[derive(Clone)]
pub struct Library {
    pub catalog: CatalogService,
    pub members: MembershipService,
    pub loans: LoanService,
    pub inventory: InventoryService,
    pub imports: ImportService,
    pub exports: ExportService,
    pub reports: ReportService,
    clock: Arc<dyn Clock>,
    settings: LibrarySettings,
}

impl Library {
    pub fn new(repos: Repositories, codec: Arc<dyn TableCodec>, settings: LibrarySettings) -> Self {
        let catalog = CatalogService::new(repos.clone());
        let members = MembershipService::new(repos.clone(), settings.clone());
        let loans = LoanService::new(repos.clone(), settings.clone());
        let inventory = InventoryService::new(repos.clone());
        let imports = ImportService::new(
            repos.clone(),
            codec.clone(),
            catalog.clone(),
            members.clone(),
        );
        let exports = ExportService::new(repos.clone(), codec, members.clone());
        let reports = ReportService::new(
            repos.clone(),
            catalog.clone(),
            members.clone(),
            loans.clone(),
            inventory.clone(),
        );

        Self {
            catalog,
            members,
            loans,
            inventory,
            imports,
            exports,
            reports,
            clock: repos.clock,
            settings,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }
}
