use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

category_enum! {
    /// Direction of a cash-flow event.
    EntryType {
        Revenue => "Receita",
        Expense => "Despesa",
    }
}

/// Row of `lancamentos`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub entry_type: EntryType,
    pub amount: f64,
    pub date: NaiveDate,
}

impl LedgerEntry {
    pub const TABLE: &'static str = "lancamentos";

    pub const SELECT_ALL: &'static str = "SELECT id, tipo, valor, date(data) FROM lancamentos";

    pub const COLUMNS: &'static [&'static str] = &["id", "type", "amount", "date"];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entry_type: row.get(1)?,
            amount: row.get(2)?,
            date: row.get(3)?,
        })
    }
}
