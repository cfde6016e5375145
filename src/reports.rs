// Report Assembler
//
// The eight menu choices and the data each one hands to the presentation
// layer. Every report is a stateless function of the current store contents,
// plus "today" for the monthly comparison.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

use crate::aggregation::{self, ClientRevenue, TypeTotal, TOP_CLIENTS_LIMIT};
use crate::calendar::{month_window, MonthWindow};
use crate::db::{with_store, Entity, Listing, Store};
use crate::entities::EntryType;
use crate::error::{ReportError, Result};

/// One entry of the report menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Clients,
    Payables,
    TopClients,
    Receivables,
    LedgerEntries,
    CashFlow,
    StatusComparison,
    RevenueVsExpense,
}

impl ReportKind {
    pub const ALL: [ReportKind; 8] = [
        ReportKind::Clients,
        ReportKind::Payables,
        ReportKind::TopClients,
        ReportKind::Receivables,
        ReportKind::LedgerEntries,
        ReportKind::CashFlow,
        ReportKind::StatusComparison,
        ReportKind::RevenueVsExpense,
    ];

    /// Menu label.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Clients => "Clientes",
            ReportKind::Payables => "Contas a Pagar",
            ReportKind::TopClients => "Clientes com maior receita",
            ReportKind::Receivables => "Contas a Receber",
            ReportKind::LedgerEntries => "Lançamentos",
            ReportKind::CashFlow => "Relatórios",
            ReportKind::StatusComparison => "Status das Contas a Pagar e Receber",
            ReportKind::RevenueVsExpense => "Comparação Receita vs Despesa",
        }
    }

    /// Page heading shown above the report.
    pub fn heading(&self) -> &'static str {
        match self {
            ReportKind::Clients => "Cadastro de Clientes",
            ReportKind::Payables => "Contas a Pagar",
            ReportKind::TopClients => "Top Clientes com Maior Receita",
            ReportKind::Receivables => "Contas a Receber",
            ReportKind::LedgerEntries => "Lançamentos Financeiros",
            ReportKind::CashFlow => "Relatório de Fluxo de Caixa",
            ReportKind::StatusComparison => "Status das Contas a Pagar e Receber",
            ReportKind::RevenueVsExpense => "Comparação Receita vs Despesa (Mês Atual)",
        }
    }

    /// Identifier used on the command line and in URLs.
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Clients => "clients",
            ReportKind::Payables => "payables",
            ReportKind::TopClients => "top-clients",
            ReportKind::Receivables => "receivables",
            ReportKind::LedgerEntries => "ledger-entries",
            ReportKind::CashFlow => "cash-flow",
            ReportKind::StatusComparison => "status-comparison",
            ReportKind::RevenueVsExpense => "revenue-vs-expense",
        }
    }

    /// The entity a plain listing shows, if this is one.
    pub fn entity(&self) -> Option<Entity> {
        match self {
            ReportKind::Clients => Some(Entity::Clients),
            ReportKind::Payables => Some(Entity::Payables),
            ReportKind::Receivables => Some(Entity::Receivables),
            ReportKind::LedgerEntries => Some(Entity::LedgerEntries),
            _ => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Accepts the slug or the menu label.
impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s || kind.title() == s)
            .ok_or_else(|| ReportError::UnknownReport(s.to_string()))
    }
}

/// Which side of the books a status row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillSource {
    Payables,
    Receivables,
}

impl BillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillSource::Payables => "Contas a Pagar",
            BillSource::Receivables => "Contas a Receber",
        }
    }
}

impl Serialize for BillSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A labelled value for bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopClientsReport {
    pub ranking: Vec<ClientRevenue>,
    /// Client name to total, in ranking order.
    pub series: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusComparisonRow {
    pub status: String,
    pub total: f64,
    pub source: BillSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueExpense {
    pub window: MonthWindow,
    pub revenue: f64,
    pub expense: f64,
}

impl RevenueExpense {
    pub fn series(&self) -> Vec<ChartPoint> {
        vec![
            ChartPoint { label: "Receitas".to_string(), value: self.revenue },
            ChartPoint { label: "Despesas".to_string(), value: self.expense },
        ]
    }
}

/// What a report hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportOutput {
    Listing(Listing),
    CashFlow { totals: Vec<TypeTotal> },
    TopClients(TopClientsReport),
    StatusComparison { rows: Vec<StatusComparisonRow> },
    RevenueVsExpense(RevenueExpense),
}

impl ReportOutput {
    /// Bar chart series for the reports that have one.
    pub fn chart(&self) -> Option<Vec<ChartPoint>> {
        match self {
            ReportOutput::TopClients(report) => Some(report.series.clone()),
            ReportOutput::StatusComparison { rows } => Some(
                rows.iter()
                    .map(|row| ChartPoint {
                        label: format!("{} ({})", row.status, row.source.as_str()),
                        value: row.total,
                    })
                    .collect(),
            ),
            ReportOutput::RevenueVsExpense(comparison) => Some(comparison.series()),
            ReportOutput::Listing(_) | ReportOutput::CashFlow { .. } => None,
        }
    }
}

#[instrument(level = "debug", skip(store))]
pub fn listing(store: &Store, entity: Entity) -> Result<Listing> {
    store.fetch_all(entity)
}

#[instrument(level = "debug", skip(store))]
pub fn cash_flow_summary(store: &Store) -> Result<Vec<TypeTotal>> {
    aggregation::sum_by_entry_type(store)
}

#[instrument(level = "debug", skip(store))]
pub fn top_clients(store: &Store) -> Result<TopClientsReport> {
    let ranking = aggregation::top_clients_by_revenue(store, TOP_CLIENTS_LIMIT)?;
    let series = ranking
        .iter()
        .map(|row| ChartPoint {
            label: row.name.clone(),
            value: row.total,
        })
        .collect();

    Ok(TopClientsReport { ranking, series })
}

/// Payable status totals followed by receivable status totals.
#[instrument(level = "debug", skip(store))]
pub fn status_comparison(store: &Store) -> Result<Vec<StatusComparisonRow>> {
    let payables = aggregation::sum_payables_by_status(store)?;
    let receivables = aggregation::sum_receivables_by_status(store)?;

    let rows = payables
        .into_iter()
        .map(|row| StatusComparisonRow {
            status: row.status.to_string(),
            total: row.total,
            source: BillSource::Payables,
        })
        .chain(receivables.into_iter().map(|row| StatusComparisonRow {
            status: row.status.to_string(),
            total: row.total,
            source: BillSource::Receivables,
        }))
        .collect();

    Ok(rows)
}

/// Revenue and expense totals for the calendar month containing `today`.
#[instrument(level = "debug", skip(store))]
pub fn revenue_vs_expense(store: &Store, today: NaiveDate) -> Result<RevenueExpense> {
    let window = month_window(today).ok_or(ReportError::DateOutOfRange(today))?;
    let revenue = aggregation::windowed_type_sum(store, &window, EntryType::Revenue)?;
    let expense = aggregation::windowed_type_sum(store, &window, EntryType::Expense)?;

    Ok(RevenueExpense {
        window,
        revenue,
        expense,
    })
}

/// Compute one menu choice against an open store.
pub fn run(store: &Store, kind: ReportKind, today: NaiveDate) -> Result<ReportOutput> {
    let output = match kind {
        ReportKind::Clients => ReportOutput::Listing(listing(store, Entity::Clients)?),
        ReportKind::Payables => ReportOutput::Listing(listing(store, Entity::Payables)?),
        ReportKind::Receivables => ReportOutput::Listing(listing(store, Entity::Receivables)?),
        ReportKind::LedgerEntries => ReportOutput::Listing(listing(store, Entity::LedgerEntries)?),
        ReportKind::CashFlow => ReportOutput::CashFlow {
            totals: cash_flow_summary(store)?,
        },
        ReportKind::TopClients => ReportOutput::TopClients(top_clients(store)?),
        ReportKind::StatusComparison => ReportOutput::StatusComparison {
            rows: status_comparison(store)?,
        },
        ReportKind::RevenueVsExpense => ReportOutput::RevenueVsExpense(revenue_vs_expense(store, today)?),
    };
    Ok(output)
}

/// Open the database, compute one report and release the database again.
pub fn render(path: &Path, kind: ReportKind, today: NaiveDate) -> Result<ReportOutput> {
    tracing::info!(report = kind.slug(), %today, "rendering report");
    let result = with_store(path, |store| run(store, kind, today));
    if let Err(err) = &result {
        tracing::warn!(report = kind.slug(), error = %err, "report failed");
    }
    result
}
