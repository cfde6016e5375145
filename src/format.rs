// Presentation helpers shared by the CLI, the TUI and CSV export.
// The reporting core never calls into this module.

use std::io::Write;

use crate::db::Listing;
use crate::reports::ReportOutput;

/// Currency display used throughout the app: `R$1,234.56`.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("R${sign}{grouped}.{:02}", cents % 100)
}

fn amount(value: f64) -> String {
    format!("{value:.2}")
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// A report flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tabular {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Tabular {
    fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest cell per column, header included.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Plain-text table with padded columns.
    pub fn to_text(&self) -> String {
        let widths = self.column_widths();
        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl From<&Listing> for Tabular {
    fn from(listing: &Listing) -> Self {
        let headers = listing.entity().columns();
        let rows = match listing {
            Listing::Clients(rows) => rows
                .iter()
                .map(|c| vec![c.id.to_string(), c.name.clone(), optional(&c.email), optional(&c.phone)])
                .collect(),
            Listing::Payables(rows) => rows
                .iter()
                .map(|p| vec![p.id.to_string(), p.status.to_string(), amount(p.amount), p.date.to_string()])
                .collect(),
            Listing::Receivables(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.client_id.to_string(),
                        r.status.to_string(),
                        amount(r.amount),
                        r.date.to_string(),
                    ]
                })
                .collect(),
            Listing::LedgerEntries(rows) => rows
                .iter()
                .map(|e| vec![e.id.to_string(), e.entry_type.to_string(), amount(e.amount), e.date.to_string()])
                .collect(),
        };
        Tabular::new(headers, rows)
    }
}

impl From<&ReportOutput> for Tabular {
    fn from(output: &ReportOutput) -> Self {
        match output {
            ReportOutput::Listing(listing) => Tabular::from(listing),
            ReportOutput::CashFlow { totals } => Tabular::new(
                &["type", "total"],
                totals
                    .iter()
                    .map(|t| vec![t.entry_type.to_string(), amount(t.total)])
                    .collect(),
            ),
            ReportOutput::TopClients(report) => Tabular::new(
                &["id", "name", "email", "phone", "total_revenue"],
                report
                    .ranking
                    .iter()
                    .map(|r| {
                        vec![
                            r.client_id.to_string(),
                            r.name.clone(),
                            optional(&r.email),
                            optional(&r.phone),
                            amount(r.total),
                        ]
                    })
                    .collect(),
            ),
            ReportOutput::StatusComparison { rows } => Tabular::new(
                &["status", "total", "source"],
                rows.iter()
                    .map(|r| vec![r.status.clone(), amount(r.total), r.source.as_str().to_string()])
                    .collect(),
            ),
            ReportOutput::RevenueVsExpense(comparison) => Tabular::new(
                &["category", "total"],
                comparison
                    .series()
                    .into_iter()
                    .map(|point| vec![point.label, format_brl(point.value)])
                    .collect(),
            ),
        }
    }
}
