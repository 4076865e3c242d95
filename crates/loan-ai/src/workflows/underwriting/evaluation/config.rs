use serde::{Deserialize, Serialize};

use super::rules::Severity;
use crate::workflows::underwriting::domain::VehicleType;

/// One DTI severity band. `upper_bound` is inclusive; `None` marks the open
/// top band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub upper_bound: Option<f64>,
    pub severity: Severity,
}

/// Credit band keyed by inclusive score floor. Bands are ordered from the
/// highest floor down and the final band must reach a floor of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditBand {
    pub floor: u16,
    pub severity: Severity,
    pub label: String,
}

/// Maximum permitted LTV for vehicles at or above `min_age_years`, until the
/// next bracket takes over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvAgeBracket {
    pub min_age_years: u32,
    pub max_ratio: f64,
}

/// Annual depreciation rates by ownership year, one table per vehicle type.
/// Projection continues at the final rate once the table is exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub new_vehicle: Vec<f64>,
    pub used_vehicle: Vec<f64>,
}

impl DepreciationSchedule {
    pub fn rate_for(&self, vehicle_type: VehicleType, ownership_year: u32) -> f64 {
        let rates = match vehicle_type {
            VehicleType::New => &self.new_vehicle,
            VehicleType::Used => &self.used_vehicle,
        };
        let index = ownership_year.saturating_sub(1) as usize;
        rates
            .get(index)
            .copied()
            .unwrap_or_else(|| rates.last().copied().unwrap_or(0.0))
    }
}

/// Versioned underwriting policy. Every threshold the engine consults lives
/// here so a policy revision ships as data, not as a code change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub policy_version: String,
    /// DTI at or below this ratio needs no attention at all.
    pub dti_target_max: f64,
    /// Upper edge of the warning band; true violations begin above it.
    pub dti_warning_max: f64,
    pub dti_violation_bands: Vec<SeverityBand>,
    pub credit_bands: Vec<CreditBand>,
    /// Scores below this floor are an automatic denial.
    pub credit_deny_floor: u16,
    /// Inclusive top of the escalation band that starts at `credit_deny_floor`.
    pub credit_escalation_max: u16,
    /// Inclusive top of the human-review band above the escalation band.
    pub credit_review_max: u16,
    pub ltv_max_by_age: Vec<LtvAgeBracket>,
    /// Percentage points over the age-based limit tolerated as a minor breach.
    pub ltv_minor_margin: f64,
    /// Percentage points over the limit tolerated as a moderate breach.
    pub ltv_moderate_margin: f64,
    pub depreciation_schedule: DepreciationSchedule,
    pub employment_min_years: f64,
    /// Aggregate collections balance cap in currency units.
    pub collections_cap: f64,
    pub max_total_violations_before_deny: usize,
    /// Nominal annual rate used to amortize a proposed payment when the
    /// application does not supply one.
    pub amortization_annual_rate: f64,
}

impl PolicyConfig {
    /// The published standard underwriting policy.
    pub fn standard() -> Self {
        Self {
            policy_version: "2025.2".to_string(),
            dti_target_max: 0.40,
            dti_warning_max: 0.43,
            dti_violation_bands: vec![
                SeverityBand {
                    upper_bound: Some(0.45),
                    severity: Severity::Minor,
                },
                SeverityBand {
                    upper_bound: Some(0.48),
                    severity: Severity::Moderate,
                },
                SeverityBand {
                    upper_bound: None,
                    severity: Severity::Major,
                },
            ],
            credit_bands: vec![
                CreditBand {
                    floor: 700,
                    severity: Severity::None,
                    label: "excellent".to_string(),
                },
                CreditBand {
                    floor: 660,
                    severity: Severity::None,
                    label: "good".to_string(),
                },
                CreditBand {
                    floor: 620,
                    severity: Severity::None,
                    label: "fair".to_string(),
                },
                CreditBand {
                    floor: 610,
                    severity: Severity::Minor,
                    label: "marginal".to_string(),
                },
                CreditBand {
                    floor: 600,
                    severity: Severity::Moderate,
                    label: "weak".to_string(),
                },
                CreditBand {
                    floor: 0,
                    severity: Severity::Major,
                    label: "critical".to_string(),
                },
            ],
            credit_deny_floor: 620,
            credit_escalation_max: 659,
            credit_review_max: 699,
            ltv_max_by_age: vec![
                LtvAgeBracket {
                    min_age_years: 0,
                    max_ratio: 1.20,
                },
                LtvAgeBracket {
                    min_age_years: 1,
                    max_ratio: 1.10,
                },
                LtvAgeBracket {
                    min_age_years: 4,
                    max_ratio: 1.00,
                },
                LtvAgeBracket {
                    min_age_years: 7,
                    max_ratio: 0.90,
                },
            ],
            ltv_minor_margin: 0.05,
            ltv_moderate_margin: 0.10,
            depreciation_schedule: DepreciationSchedule {
                new_vehicle: vec![0.20, 0.15, 0.10, 0.10, 0.10],
                used_vehicle: vec![0.15, 0.15, 0.10, 0.10, 0.10],
            },
            employment_min_years: 2.0,
            collections_cap: 5_000.0,
            max_total_violations_before_deny: 3,
            amortization_annual_rate: 0.07,
        }
    }

    /// Ensure every lookup the engine performs is total. Called once at
    /// engine construction.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.dti_target_max > 0.0 && self.dti_target_max < self.dti_warning_max) {
            return Err(ConfigurationError::DtiTargets {
                target: self.dti_target_max,
                warning: self.dti_warning_max,
            });
        }

        let bounded_ascending = self
            .dti_violation_bands
            .iter()
            .filter_map(|band| band.upper_bound)
            .collect::<Vec<_>>();
        let open_top = matches!(
            self.dti_violation_bands.last(),
            Some(SeverityBand {
                upper_bound: None,
                ..
            })
        );
        if self.dti_violation_bands.is_empty()
            || !open_top
            || bounded_ascending.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return Err(ConfigurationError::DtiBands);
        }

        if self.credit_bands.is_empty() || self.credit_bands.last().map(|band| band.floor) != Some(0)
        {
            return Err(ConfigurationError::CreditBands);
        }
        if self
            .credit_bands
            .windows(2)
            .any(|pair| pair[0].floor <= pair[1].floor)
        {
            return Err(ConfigurationError::CreditBands);
        }

        if !(self.credit_deny_floor <= self.credit_escalation_max
            && self.credit_escalation_max <= self.credit_review_max)
        {
            return Err(ConfigurationError::CreditCutLines {
                deny: self.credit_deny_floor,
                escalation: self.credit_escalation_max,
                review: self.credit_review_max,
            });
        }

        if self.ltv_max_by_age.is_empty()
            || self.ltv_max_by_age.first().map(|bracket| bracket.min_age_years) != Some(0)
        {
            return Err(ConfigurationError::LtvTable);
        }
        if self
            .ltv_max_by_age
            .windows(2)
            .any(|pair| pair[0].min_age_years >= pair[1].min_age_years)
        {
            return Err(ConfigurationError::LtvTable);
        }

        if self.depreciation_schedule.new_vehicle.is_empty()
            || self.depreciation_schedule.used_vehicle.is_empty()
        {
            return Err(ConfigurationError::DepreciationSchedule);
        }

        for (field, value) in [
            ("ltv_minor_margin", self.ltv_minor_margin),
            ("ltv_moderate_margin", self.ltv_moderate_margin),
            ("employment_min_years", self.employment_min_years),
            ("collections_cap", self.collections_cap),
            ("amortization_annual_rate", self.amortization_annual_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidRate {
                    field,
                    received: value,
                });
            }
        }

        if self.max_total_violations_before_deny == 0 {
            return Err(ConfigurationError::ViolationCap);
        }

        Ok(())
    }

    pub fn dti_severity(&self, dti: f64) -> Severity {
        if dti <= self.dti_warning_max {
            return Severity::None;
        }
        for band in &self.dti_violation_bands {
            match band.upper_bound {
                Some(upper) if dti <= upper => return band.severity,
                None => return band.severity,
                _ => continue,
            }
        }
        Severity::Major
    }

    /// Largest bounded DTI band edge; above it no exception authority exists.
    pub fn dti_exception_max(&self) -> f64 {
        self.dti_violation_bands
            .iter()
            .filter_map(|band| band.upper_bound)
            .fold(self.dti_warning_max, f64::max)
    }

    pub fn credit_band(&self, score: u16) -> &CreditBand {
        self.credit_bands
            .iter()
            .find(|band| band.floor <= score)
            .unwrap_or_else(|| &self.credit_bands[self.credit_bands.len() - 1])
    }

    pub fn ltv_max_for_age(&self, age_years: u32) -> f64 {
        self.ltv_max_by_age
            .iter()
            .rev()
            .find(|bracket| bracket.min_age_years <= age_years)
            .map(|bracket| bracket.max_ratio)
            .unwrap_or_else(|| self.ltv_max_by_age[0].max_ratio)
    }
}

/// Raised when a policy file is structurally unusable. Detected at engine
/// construction, never during an evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("dti_target_max must be positive and below dti_warning_max (target {target}, warning {warning})")]
    DtiTargets { target: f64, warning: f64 },
    #[error("dti_violation_bands must ascend and terminate in an open top band")]
    DtiBands,
    #[error("credit_bands must descend by floor and terminate at floor zero")]
    CreditBands,
    #[error("credit cut lines must be ordered (deny {deny}, escalation {escalation}, review {review})")]
    CreditCutLines {
        deny: u16,
        escalation: u16,
        review: u16,
    },
    #[error("ltv_max_by_age must start at age zero and ascend")]
    LtvTable,
    #[error("depreciation_schedule requires at least one annual rate per vehicle type")]
    DepreciationSchedule,
    #[error("{field} must be a finite, non-negative value (received {received})")]
    InvalidRate { field: &'static str, received: f64 },
    #[error("max_total_violations_before_deny must be at least 1")]
    ViolationCap,
}
