use rusqlite::types::FromSql;
use rusqlite::{Connection, OpenFlags, Params, Row};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::entities::{Client, LedgerEntry, Payable, Receivable};
use crate::error::{ReportError, Result};

/// The four tables a report can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Clients,
    Payables,
    Receivables,
    LedgerEntries,
}

impl Entity {
    pub const ALL: [Entity; 4] = [
        Entity::Clients,
        Entity::Payables,
        Entity::Receivables,
        Entity::LedgerEntries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Clients => "clients",
            Entity::Payables => "payables",
            Entity::Receivables => "receivables",
            Entity::LedgerEntries => "ledger_entries",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Entity::Clients => Client::TABLE,
            Entity::Payables => Payable::TABLE,
            Entity::Receivables => Receivable::TABLE,
            Entity::LedgerEntries => LedgerEntry::TABLE,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Entity::Clients => Client::COLUMNS,
            Entity::Payables => Payable::COLUMNS,
            Entity::Receivables => Receivable::COLUMNS,
            Entity::LedgerEntries => LedgerEntry::COLUMNS,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the entity name or the physical table name.
impl FromStr for Entity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.as_str() == s || entity.table() == s)
            .ok_or_else(|| ReportError::UnknownEntity(s.to_string()))
    }
}

/// Every row of one entity, in the order the store yielded them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", content = "rows", rename_all = "snake_case")]
pub enum Listing {
    Clients(Vec<Client>),
    Payables(Vec<Payable>),
    Receivables(Vec<Receivable>),
    LedgerEntries(Vec<LedgerEntry>),
}

impl Listing {
    pub fn entity(&self) -> Entity {
        match self {
            Listing::Clients(_) => Entity::Clients,
            Listing::Payables(_) => Entity::Payables,
            Listing::Receivables(_) => Entity::Receivables,
            Listing::LedgerEntries(_) => Entity::LedgerEntries,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Listing::Clients(rows) => rows.len(),
            Listing::Payables(rows) => rows.len(),
            Listing::Receivables(rows) => rows.len(),
            Listing::LedgerEntries(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read handle over the finance database.
///
/// A `Store` is opened for one report and dropped when it finishes; nothing
/// is cached between reports and no cursor outlives a single call.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database file read-only. A missing or unreadable file is
    /// reported as `StorageUnavailable`; there is no retry.
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(path, flags)?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(Self { conn })
    }

    /// Wrap an already opened connection (in-memory databases, embedding).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a parameterized query and map every result row.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        tracing::debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Run a query that yields exactly one row with one possibly-NULL column,
    /// such as an aggregate without GROUP BY.
    pub fn query_scalar<T, P>(&self, sql: &str, params: P) -> Result<Option<T>>
    where
        T: FromSql,
        P: Params,
    {
        tracing::debug!(sql, "scalar query");
        let value = self.conn.query_row(sql, params, |row| row.get::<_, Option<T>>(0))?;
        Ok(value)
    }

    pub fn clients(&self) -> Result<Vec<Client>> {
        self.query(Client::SELECT_ALL, [], Client::from_row)
    }

    pub fn payables(&self) -> Result<Vec<Payable>> {
        self.query(Payable::SELECT_ALL, [], Payable::from_row)
    }

    pub fn receivables(&self) -> Result<Vec<Receivable>> {
        self.query(Receivable::SELECT_ALL, [], Receivable::from_row)
    }

    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>> {
        self.query(LedgerEntry::SELECT_ALL, [], LedgerEntry::from_row)
    }

    /// All rows of one entity, unsorted.
    pub fn fetch_all(&self, entity: Entity) -> Result<Listing> {
        Ok(match entity {
            Entity::Clients => Listing::Clients(self.clients()?),
            Entity::Payables => Listing::Payables(self.payables()?),
            Entity::Receivables => Listing::Receivables(self.receivables()?),
            Entity::LedgerEntries => Listing::LedgerEntries(self.ledger_entries()?),
        })
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        tracing::debug!("store released");
    }
}

/// Open a store, hand it to `f`, and release it whatever `f` returns.
pub fn with_store<T, F>(path: impl AsRef<Path>, f: F) -> Result<T>
where
    F: FnOnce(&Store) -> Result<T>,
{
    let store = Store::open(path.as_ref())?;
    f(&store)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const SCHEMA: &str = "
        CREATE TABLE clientes (
            id INTEGER PRIMARY KEY,
            nome TEXT NOT NULL,
            email TEXT,
            telefone TEXT
        );
        CREATE TABLE contas_pagar (
            id INTEGER PRIMARY KEY,
            status TEXT NOT NULL,
            valor REAL NOT NULL,
            data DATE NOT NULL
        );
        CREATE TABLE contas_receber (
            id INTEGER PRIMARY KEY,
            cliente_id INTEGER NOT NULL,
            status TEXT NOT NULL,
            valor REAL NOT NULL,
            data DATE NOT NULL
        );
        CREATE TABLE lancamentos (
            id INTEGER PRIMARY KEY,
            tipo TEXT NOT NULL,
            valor REAL NOT NULL,
            data DATE NOT NULL
        );
    ";

    /// In-memory store with the finance schema and the given INSERTs applied.
    pub fn store_with(inserts: &str) -> Store {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(inserts).unwrap();
        Store::from_connection(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::store_with;
    use super::*;
    use crate::entities::{EntryType, PayableStatus, ReceivableStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_listing_preserves_store_order() {
        let store = store_with(
            "INSERT INTO clientes VALUES (3, 'Ana', 'ana@example.com', NULL);
             INSERT INTO clientes VALUES (1, 'Carla', NULL, '555-0101');
             INSERT INTO clientes VALUES (2, 'Bruno', NULL, NULL);",
        );

        let clients = store.clients().unwrap();
        let names: Vec<_> = clients.iter().map(|c| c.name.as_str()).collect();

        // whatever the table scan yields; no ORDER BY
        assert_eq!(names, ["Carla", "Bruno", "Ana"]);
        assert_eq!(clients[0].phone.as_deref(), Some("555-0101"));
        assert_eq!(clients[2].email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_rows_are_typed_on_read() {
        let store = store_with(
            "INSERT INTO contas_pagar VALUES (1, 'Pago', 80.5, '2024-03-02');
             INSERT INTO contas_receber VALUES (1, 7, 'Recebido', 120.0, '2024-03-04 10:30:00');
             INSERT INTO lancamentos VALUES (1, 'Despesa', 42.0, '2024-03-05');",
        );

        let payables = store.payables().unwrap();
        assert_eq!(payables[0].status, PayableStatus::Paid);
        assert_eq!(payables[0].date, date(2024, 3, 2));

        let receivables = store.receivables().unwrap();
        assert_eq!(receivables[0].status, ReceivableStatus::Received);
        assert_eq!(receivables[0].client_id, 7);
        // timestamps are truncated to their calendar date
        assert_eq!(receivables[0].date, date(2024, 3, 4));

        let entries = store.ledger_entries().unwrap();
        assert_eq!(entries[0].entry_type, EntryType::Expense);
        assert_eq!(entries[0].amount, 42.0);
    }

    #[test]
    fn test_unlisted_status_passes_through_listing() {
        let store = store_with(
            "INSERT INTO contas_pagar VALUES (1, 'Pago', 40.0, '2024-01-01');
             INSERT INTO contas_pagar VALUES (2, 'Vencido', 15.0, '2024-01-02');",
        );

        let statuses: Vec<_> = store.payables().unwrap().into_iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            [PayableStatus::Paid, PayableStatus::Other("Vencido".to_string())]
        );
    }

    #[test]
    fn test_fetch_all_by_entity_name() {
        let store = store_with("INSERT INTO lancamentos VALUES (1, 'Receita', 300.0, '2024-03-05');");

        let entity: Entity = "lancamentos".parse().unwrap();
        assert_eq!(entity, Entity::LedgerEntries);
        assert_eq!("ledger_entries".parse::<Entity>().unwrap(), Entity::LedgerEntries);

        let listing = store.fetch_all(entity).unwrap();
        assert_eq!(listing.entity(), Entity::LedgerEntries);
        assert_eq!(listing.len(), 1);

        assert!(store.fetch_all(Entity::Clients).unwrap().is_empty());
        assert!(matches!(
            "invoices".parse::<Entity>(),
            Err(ReportError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_query_scalar_returns_none_for_null_aggregate() {
        let store = store_with("");
        let total: Option<f64> = store
            .query_scalar("SELECT SUM(valor) FROM lancamentos WHERE tipo = ?1", [EntryType::Revenue])
            .unwrap();
        assert_eq!(total, None);
    }

    #[test]
    fn test_malformed_query_is_storage_unavailable() {
        let store = store_with("");
        let result = store.query("SELECT nope FROM nowhere", [], |row| row.get::<_, i64>(0));
        assert!(matches!(result, Err(ReportError::StorageUnavailable(_))));
    }

    #[test]
    fn test_missing_database_file_is_storage_unavailable() {
        let path = std::env::temp_dir().join("erp-finance-missing/none.db");
        let result = with_store(&path, |store| store.clients());
        assert!(matches!(result, Err(ReportError::StorageUnavailable(_))));
    }

    #[test]
    fn test_with_store_reads_a_database_file() {
        let path = std::env::temp_dir().join(format!("erp-finance-{}.db", std::process::id()));
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(fixtures::SCHEMA).unwrap();
            conn.execute_batch("INSERT INTO clientes VALUES (1, 'Ana', NULL, NULL);")
                .unwrap();
        }

        let clients = with_store(&path, |store| store.clients()).unwrap();
        assert_eq!(clients.len(), 1);

        std::fs::remove_file(&path).unwrap();
    }
}
