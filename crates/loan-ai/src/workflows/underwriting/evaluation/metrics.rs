use serde::{Deserialize, Serialize};

use super::config::{DepreciationSchedule, PolicyConfig};
use crate::workflows::underwriting::domain::{LoanApplication, VehicleType};

/// Standardized risk metrics, computed once per evaluation and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub dti: f64,
    pub ltv: f64,
    pub proposed_payment: f64,
    pub projected_value_at_maturity: f64,
}

/// Malformed or out-of-domain applicant data. The engine fails before any
/// metric is computed; it never substitutes defaults for financial fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInputError {
    #[error("{field} must be positive (received {received})")]
    NonPositive { field: &'static str, received: f64 },
    #[error("{field} must not be negative (received {received})")]
    Negative { field: &'static str, received: f64 },
    #[error("loan term must cover at least one month")]
    EmptyTerm,
}

/// Reject anything the risk formulas cannot safely consume.
pub(crate) fn validate(application: &LoanApplication) -> Result<(), InvalidInputError> {
    let positive = [
        (
            "monthly_gross_income",
            application.income.monthly_gross_income,
        ),
        ("vehicle_value", application.vehicle.vehicle_value),
        ("purchase_price", application.vehicle.purchase_price),
        ("loan_amount", application.loan.amount),
    ];
    for (field, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(InvalidInputError::NonPositive {
                field,
                received: value,
            });
        }
    }

    let non_negative = [
        ("monthly_debts", application.credit.monthly_debts),
        ("years_employed", application.income.years_employed),
        ("down_payment", application.loan.down_payment),
        ("negative_equity", application.vehicle.negative_equity),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidInputError::Negative {
                field,
                received: value,
            });
        }
    }

    if let Some(amount) = application.credit.collections_amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InvalidInputError::Negative {
                field: "collections_amount",
                received: amount,
            });
        }
    }

    if let Some(payment) = application.loan.proposed_monthly_payment {
        if !payment.is_finite() || payment <= 0.0 {
            return Err(InvalidInputError::NonPositive {
                field: "proposed_monthly_payment",
                received: payment,
            });
        }
    }

    if application.loan.term_months == 0 {
        return Err(InvalidInputError::EmptyTerm);
    }

    Ok(())
}

pub(crate) fn compute(
    application: &LoanApplication,
    config: &PolicyConfig,
    vehicle_age: u32,
) -> Result<RiskMetrics, InvalidInputError> {
    validate(application)?;

    let proposed_payment = match application.loan.proposed_monthly_payment {
        Some(payment) => payment,
        None => amortized_payment(
            application.loan.amount,
            application.loan.term_months,
            config.amortization_annual_rate,
        ),
    };

    let dti = (application.credit.monthly_debts + proposed_payment)
        / application.income.monthly_gross_income;
    let ltv = application.loan.amount / application.vehicle.vehicle_value;

    let maturity_years = application.loan.term_months / 12;
    let projected_value_at_maturity = project_value(
        application.vehicle.vehicle_value,
        application.vehicle.vehicle_type,
        vehicle_age,
        maturity_years,
        &config.depreciation_schedule,
    );

    Ok(RiskMetrics {
        dti,
        ltv,
        proposed_payment,
        projected_value_at_maturity,
    })
}

/// Standard fixed-rate amortization over `term_months` at the nominal annual
/// rate. A zero rate degenerates to straight-line repayment.
pub(crate) fn amortized_payment(amount: f64, term_months: u32, annual_rate: f64) -> f64 {
    let n = f64::from(term_months);
    if annual_rate == 0.0 {
        return amount / n;
    }
    let monthly_rate = annual_rate / 12.0;
    let growth = (1.0 + monthly_rate).powf(n);
    amount * monthly_rate * growth / (growth - 1.0)
}

/// Compound the scheduled annual depreciation over the remaining loan term.
/// Rates are keyed by the vehicle's ownership year, so an already-aged
/// vehicle starts partway down the curve.
pub(crate) fn project_value(
    current_value: f64,
    vehicle_type: VehicleType,
    vehicle_age: u32,
    maturity_years: u32,
    schedule: &DepreciationSchedule,
) -> f64 {
    let mut value = current_value;
    for offset in 1..=maturity_years {
        let rate = schedule.rate_for(vehicle_type, vehicle_age + offset);
        value *= 1.0 - rate;
    }
    value
}
