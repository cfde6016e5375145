// Aggregation Engine
//
// Ranking, grouped sums and windowed sums over the finance tables. Grouped
// breakdowns are sparse (a category with no rows has no entry); windowed sums
// are scalars that are always present and fall back to zero.

use rusqlite::params;
use rusqlite::types::FromSql;
use serde::Serialize;

use crate::calendar::MonthWindow;
use crate::db::Store;
use crate::entities::{EntryType, Payable, PayableStatus, Receivable, ReceivableStatus};
use crate::error::Result;

/// How many clients the revenue ranking keeps.
pub const TOP_CLIENTS_LIMIT: usize = 5;

/// Equal totals are ordered by ascending client id so the ranking does not
/// depend on the store's scan order.
const TOP_CLIENTS_SQL: &str = "
    SELECT c.id, c.nome, c.email, c.telefone, SUM(cr.valor) AS total_receita
    FROM clientes c
    JOIN contas_receber cr ON c.id = cr.cliente_id
    WHERE cr.status = ?1
    GROUP BY c.id
    HAVING total_receita > 0
    ORDER BY total_receita DESC, c.id ASC
    LIMIT ?2";

const ENTRY_TYPE_TOTALS_SQL: &str = "
    SELECT tipo, SUM(valor) AS total
    FROM lancamentos
    GROUP BY tipo
    ORDER BY tipo";

const WINDOWED_TYPE_SUM_SQL: &str = "
    SELECT SUM(valor)
    FROM lancamentos
    WHERE tipo = ?1 AND date(data) BETWEEN ?2 AND ?3";

/// One line of the revenue ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRevenue {
    pub client_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusTotal<S> {
    pub status: S,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeTotal {
    pub entry_type: EntryType,
    pub total: f64,
}

/// A table whose rows carry a status and an amount.
pub trait StatusLedger {
    type Status: FromSql;

    const TABLE: &'static str;
}

impl StatusLedger for Payable {
    type Status = PayableStatus;

    const TABLE: &'static str = Payable::TABLE;
}

impl StatusLedger for Receivable {
    type Status = ReceivableStatus;

    const TABLE: &'static str = Receivable::TABLE;
}

/// Clients ranked by the sum of their received receivables, highest first.
///
/// Inner-join semantics: clients without a received receivable, and
/// receivables pointing at no client, are left out.
pub fn top_clients_by_revenue(store: &Store, limit: usize) -> Result<Vec<ClientRevenue>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    store.query(
        TOP_CLIENTS_SQL,
        params![ReceivableStatus::Received, limit],
        |row| {
            Ok(ClientRevenue {
                client_id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                total: row.get(4)?,
            })
        },
    )
}

/// Sum of amounts per status, ordered by status label. Statuses with no rows
/// are absent.
pub fn sum_by_status<L: StatusLedger>(store: &Store) -> Result<Vec<StatusTotal<L::Status>>> {
    let sql = format!(
        "SELECT status, SUM(valor) AS total FROM {} GROUP BY status ORDER BY status",
        L::TABLE
    );

    store.query(&sql, [], |row| {
        Ok(StatusTotal {
            status: row.get(0)?,
            total: row.get(1)?,
        })
    })
}

pub fn sum_payables_by_status(store: &Store) -> Result<Vec<StatusTotal<PayableStatus>>> {
    sum_by_status::<Payable>(store)
}

pub fn sum_receivables_by_status(store: &Store) -> Result<Vec<StatusTotal<ReceivableStatus>>> {
    sum_by_status::<Receivable>(store)
}

/// Sum of ledger amounts per entry type; types with no entries are absent.
pub fn sum_by_entry_type(store: &Store) -> Result<Vec<TypeTotal>> {
    store.query(ENTRY_TYPE_TOTALS_SQL, [], |row| {
        Ok(TypeTotal {
            entry_type: row.get(0)?,
            total: row.get(1)?,
        })
    })
}

/// Sum of ledger amounts of one type dated inside `window`. Zero when nothing
/// matches.
pub fn windowed_type_sum(store: &Store, window: &MonthWindow, entry_type: EntryType) -> Result<f64> {
    let total: Option<f64> = store.query_scalar(
        WINDOWED_TYPE_SUM_SQL,
        params![entry_type, window.start, window.end],
    )?;
    Ok(total.unwrap_or(0.0))
}
