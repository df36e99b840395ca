mod engine;
mod types;

pub use engine::{
    annual_to_monthly_rate, future_value_with_contributions, iof_percent_by_days,
    ir_percent_by_months, project, resolve_instruments,
};
pub use types::{Instrument, InstrumentKind, ProjectionInput, ProjectionResult, ResultRow};
