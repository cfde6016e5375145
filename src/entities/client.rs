use rusqlite::Row;
use serde::Serialize;

/// A customer; receivables point at it through `client_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Client {
    pub const TABLE: &'static str = "clientes";

    pub const SELECT_ALL: &'static str = "SELECT id, nome, email, telefone FROM clientes";

    pub const COLUMNS: &'static [&'static str] = &["id", "name", "email", "phone"];

    /// Maps a row shaped like `SELECT_ALL` (id, nome, email, telefone).
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
        })
    }
}
