use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

category_enum! {
    /// Status of an amount the organization owes.
    PayableStatus {
        Pending => "Pendente",
        Paid => "Pago",
    }
}

category_enum! {
    /// Status of an amount a client owes the organization.
    ReceivableStatus {
        Pending => "Pendente",
        Received => "Recebido",
    }
}

/// Row of `contas_pagar`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payable {
    pub id: i64,
    pub status: PayableStatus,
    pub amount: f64,
    pub date: NaiveDate,
}

impl Payable {
    pub const TABLE: &'static str = "contas_pagar";

    pub const SELECT_ALL: &'static str =
        "SELECT id, status, valor, date(data) FROM contas_pagar";

    pub const COLUMNS: &'static [&'static str] = &["id", "status", "amount", "date"];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            status: row.get(1)?,
            amount: row.get(2)?,
            date: row.get(3)?,
        })
    }
}

/// Row of `contas_receber`. `client_id` is assumed to resolve to a client;
/// dangling references simply vanish from joined reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receivable {
    pub id: i64,
    pub client_id: i64,
    pub status: ReceivableStatus,
    pub amount: f64,
    pub date: NaiveDate,
}

impl Receivable {
    pub const TABLE: &'static str = "contas_receber";

    pub const SELECT_ALL: &'static str =
        "SELECT id, cliente_id, status, valor, date(data) FROM contas_receber";

    pub const COLUMNS: &'static [&'static str] = &["id", "client_id", "status", "amount", "date"];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            status: row.get(2)?,
            amount: row.get(3)?,
            date: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip_through_from_str() {
        for status in PayableStatus::KNOWN {
            assert_eq!(status.as_str().parse::<PayableStatus>().unwrap(), *status);
        }
        for status in ReceivableStatus::KNOWN {
            assert_eq!(status.as_str().parse::<ReceivableStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_unlisted_labels_are_kept_verbatim() {
        let status = ReceivableStatus::from("recebido");
        assert_eq!(status, ReceivableStatus::Other("recebido".to_string()));
        assert_eq!(status.as_str(), "recebido");
        assert!(!status.is_known());

        // Paid is a payable state only
        assert!(!ReceivableStatus::from("Pago").is_known());
        assert_eq!(PayableStatus::from(" Pago"), PayableStatus::Other(" Pago".to_string()));
        assert!(PayableStatus::Paid.is_known());
    }

    #[test]
    fn test_status_serializes_as_store_label() {
        let json = serde_json::to_string(&ReceivableStatus::Received).unwrap();
        assert_eq!(json, "\"Recebido\"");

        let json = serde_json::to_string(&PayableStatus::Other("Vencido".to_string())).unwrap();
        assert_eq!(json, "\"Vencido\"");
    }
}
