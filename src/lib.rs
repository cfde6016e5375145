// ERP Finance - Reporting Library
// Read-only reports over clients, payables, receivables and ledger entries.
// Exposes all modules for use in the CLI, the TUI, the API server and tests.

pub mod db;
pub mod error;
pub mod config;
pub mod entities;
pub mod calendar;
pub mod aggregation;
pub mod reports;
pub mod format;

// Re-export commonly used types
pub use db::{with_store, Entity, Listing, Store};
pub use error::{ReportError, Result};
pub use config::Settings;
pub use entities::{
    Client, EntryType, LedgerEntry,
    Payable, PayableStatus, Receivable, ReceivableStatus,
};
pub use calendar::{month_window, MonthWindow};
pub use aggregation::{
    ClientRevenue, StatusTotal, TypeTotal, TOP_CLIENTS_LIMIT,
    top_clients_by_revenue, sum_by_status, sum_payables_by_status,
    sum_receivables_by_status, sum_by_entry_type, windowed_type_sum,
};
pub use reports::{
    BillSource, ChartPoint, ReportKind, ReportOutput,
    RevenueExpense, StatusComparisonRow, TopClientsReport,
    render, run,
};
pub use format::{format_brl, Tabular};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
