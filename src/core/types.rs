use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentKind {
    CdbNominal,
    CdbPctOfCdi,
    LciLca,
    TesouroSelic,
    Poupanca,
    TesouroIpca,
}

impl InstrumentKind {
    /// Fixed presentation order; the comparison table and chart rely on it.
    pub const ALL: [InstrumentKind; 6] = [
        InstrumentKind::CdbNominal,
        InstrumentKind::CdbPctOfCdi,
        InstrumentKind::LciLca,
        InstrumentKind::TesouroSelic,
        InstrumentKind::Poupanca,
        InstrumentKind::TesouroIpca,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InstrumentKind::CdbNominal => "CDB (nominal)",
            InstrumentKind::CdbPctOfCdi => "CDB (% do CDI)",
            InstrumentKind::LciLca => "LCI/LCA (isento)",
            InstrumentKind::TesouroSelic => "Tesouro Selic",
            InstrumentKind::Poupanca => "Poupança",
            InstrumentKind::TesouroIpca => "Tesouro IPCA+",
        }
    }

    /// Whether the regressive IR schedule applies. IOF is independent of
    /// this flag and hits every instrument inside the 30-day window.
    pub fn is_taxable(self) -> bool {
        !matches!(self, InstrumentKind::LciLca | InstrumentKind::Poupanca)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub principal: f64,
    pub monthly_contribution: f64,
    pub horizon_months: u32,
    pub annual_inflation_pct: f64,
    pub cdi_pct: f64,
    pub cdb_nominal_pct: f64,
    pub cdb_pct_of_cdi: f64,
    pub lci_pct: f64,
    pub selic_pct: f64,
    pub poupanca_pct: f64,
    pub ipca_real_pct: f64,
    pub ipca_pct: f64,
}

#[derive(Debug, Clone)]
pub struct Instrument {
    pub kind: InstrumentKind,
    pub annual_rate_pct: f64,
    pub taxable: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub instrument: InstrumentKind,
    pub label: &'static str,
    pub note: Option<String>,
    pub annual_rate_pct: f64,
    pub future_value: f64,
    pub total_contributed: f64,
    pub gross_return: f64,
    pub iof_amount: f64,
    pub ir_pct: f64,
    pub ir_amount: f64,
    pub net_return: f64,
    pub real_net_return: f64,
}

#[derive(Debug, Clone)]
pub struct ProjectionResult {
    pub rows: Vec<ResultRow>,
    /// Maximum net return across rows, floored at zero; the chart layer
    /// scales bar heights against it.
    pub max_net_return: f64,
}
