use super::types::{Instrument, InstrumentKind, ProjectionInput, ProjectionResult, ResultRow};

// Common market IOF table: percent of gains withheld when redeeming on
// days 1..30. Day 30 is already zero.
const IOF_TABLE: [f64; 30] = [
    96.0, 93.0, 90.0, 86.0, 83.0, 80.0, 76.0, 73.0, 70.0, 66.0, 63.0, 60.0, 56.0, 53.0, 50.0,
    46.0, 43.0, 40.0, 36.0, 33.0, 30.0, 26.0, 23.0, 20.0, 16.0, 13.0, 10.0, 6.0, 3.0, 0.0,
];

pub fn annual_to_monthly_rate(annual_pct: f64) -> f64 {
    (1.0 + annual_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

// Contributions land at the end of each month; the zero-rate branch avoids
// the annuity division.
pub fn future_value_with_contributions(
    principal: f64,
    monthly_contribution: f64,
    months: u32,
    monthly_rate: f64,
) -> f64 {
    if monthly_rate == 0.0 {
        return principal + monthly_contribution * months as f64;
    }
    let growth = (1.0 + monthly_rate).powf(months as f64);
    principal * growth + monthly_contribution * (growth - 1.0) / monthly_rate
}

/// Regressive IR schedule by holding period in months.
pub fn ir_percent_by_months(months: u32) -> f64 {
    if months <= 180 {
        22.5
    } else if months <= 360 {
        20.0
    } else if months <= 720 {
        17.5
    } else {
        15.0
    }
}

/// Regressive IOF on gains: zero outside days 1..29, table lookup inside.
pub fn iof_percent_by_days(days: u32) -> f64 {
    if days == 0 || days >= 30 {
        return 0.0;
    }
    IOF_TABLE[days as usize - 1]
}

fn annual_rate_pct(kind: InstrumentKind, input: &ProjectionInput) -> f64 {
    match kind {
        // The nominal row switches to the CDI-indexed rate as soon as a
        // %-of-CDI figure is supplied; the %-of-CDI row is shown either way.
        InstrumentKind::CdbNominal => {
            if input.cdb_pct_of_cdi > 0.0 {
                input.cdi_pct * input.cdb_pct_of_cdi / 100.0
            } else {
                input.cdb_nominal_pct
            }
        }
        InstrumentKind::CdbPctOfCdi => input.cdi_pct * input.cdb_pct_of_cdi / 100.0,
        InstrumentKind::LciLca => input.lci_pct,
        InstrumentKind::TesouroSelic => input.selic_pct,
        InstrumentKind::Poupanca => input.poupanca_pct,
        InstrumentKind::TesouroIpca => {
            ((1.0 + input.ipca_real_pct / 100.0) * (1.0 + input.ipca_pct / 100.0) - 1.0) * 100.0
        }
    }
}

fn instrument_note(kind: InstrumentKind, input: &ProjectionInput) -> Option<String> {
    match kind {
        InstrumentKind::TesouroIpca => Some(format!(
            "real:{}% ipca:{}%",
            input.ipca_real_pct, input.ipca_pct
        )),
        _ => None,
    }
}

pub fn resolve_instruments(input: &ProjectionInput) -> Vec<Instrument> {
    InstrumentKind::ALL
        .iter()
        .map(|&kind| Instrument {
            kind,
            annual_rate_pct: annual_rate_pct(kind, input),
            taxable: kind.is_taxable(),
            note: instrument_note(kind, input),
        })
        .collect()
}

pub fn project(input: &ProjectionInput) -> ProjectionResult {
    let months = input.horizon_months;
    // Day count for IOF uses 30-day months; a one-month horizon lands
    // exactly on the 30-day boundary, where the table no longer applies.
    let approx_days = months.saturating_mul(30);
    let total_contributed = input.principal + input.monthly_contribution * months as f64;
    let inflation_factor =
        (1.0 + annual_to_monthly_rate(input.annual_inflation_pct)).powf(months as f64);

    let mut rows = Vec::with_capacity(InstrumentKind::ALL.len());
    let mut max_net_return = 0.0_f64;

    for instrument in resolve_instruments(input) {
        let monthly_rate = annual_to_monthly_rate(instrument.annual_rate_pct);
        let future_value = future_value_with_contributions(
            input.principal,
            input.monthly_contribution,
            months,
            monthly_rate,
        );
        let gross_return = future_value - total_contributed;

        let iof_pct = if approx_days < 30 {
            iof_percent_by_days(approx_days)
        } else {
            0.0
        };
        let iof_amount = (gross_return * iof_pct / 100.0).max(0.0);

        let ir_pct = if instrument.taxable {
            ir_percent_by_months(months)
        } else {
            0.0
        };
        let ir_amount = ((gross_return - iof_amount) * ir_pct / 100.0).max(0.0);

        let net_return = gross_return - iof_amount - ir_amount;
        let real_net_return = net_return / inflation_factor;

        if net_return > max_net_return {
            max_net_return = net_return;
        }

        rows.push(ResultRow {
            instrument: instrument.kind,
            label: instrument.kind.label(),
            note: instrument.note,
            annual_rate_pct: instrument.annual_rate_pct,
            future_value,
            total_contributed,
            gross_return,
            iof_amount,
            ir_pct,
            ir_amount,
            net_return,
            real_net_return,
        });
    }

    ProjectionResult {
        rows,
        max_net_return,
    }
}
