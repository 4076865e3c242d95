//! Flat-file intake for roster-style underwriting runs: one applicant per
//! CSV row, expanded into the typed application contract.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApplicantIdentity, CreditRecord, EmploymentStability, IncomeRecord, LoanApplication,
    LoanRequest, VehicleRecord, VehicleType,
};

#[derive(Debug)]
pub enum BatchImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchImportError::Io(err) => write!(f, "failed to read applicant roster: {}", err),
            BatchImportError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchImportError::Io(err) => Some(err),
            BatchImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct BatchImporter;

impl BatchImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LoanApplication>, BatchImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LoanApplication>, BatchImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut applications = Vec::new();

        for record in csv_reader.deserialize::<ApplicantRow>() {
            applications.push(record?.into_application());
        }

        Ok(applications)
    }
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    applicant_name: String,
    address: String,
    date_of_birth: NaiveDate,
    monthly_gross_income: f64,
    employer: String,
    years_employed: f64,
    employment_stability: EmploymentStability,
    credit_score: u16,
    monthly_debts: f64,
    collections_count: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    collections_amount: Option<f64>,
    recent_repossession: bool,
    bankruptcy: bool,
    vehicle_year: i32,
    vehicle_make: String,
    vehicle_model: String,
    vehicle_type: VehicleType,
    purchase_price: f64,
    vehicle_value: f64,
    #[serde(default)]
    negative_equity: f64,
    loan_amount: f64,
    term_months: u32,
    down_payment: f64,
    #[serde(default, deserialize_with = "empty_as_none")]
    proposed_monthly_payment: Option<f64>,
}

impl ApplicantRow {
    fn into_application(self) -> LoanApplication {
        LoanApplication {
            applicant: ApplicantIdentity {
                name: self.applicant_name,
                address: self.address,
                date_of_birth: self.date_of_birth,
            },
            income: IncomeRecord {
                monthly_gross_income: self.monthly_gross_income,
                employer: self.employer,
                years_employed: self.years_employed,
                employment_stability: self.employment_stability,
            },
            credit: CreditRecord {
                score: self.credit_score,
                monthly_debts: self.monthly_debts,
                collections_count: self.collections_count,
                collections_amount: self.collections_amount,
                recent_repossession: self.recent_repossession,
                bankruptcy: self.bankruptcy,
            },
            vehicle: VehicleRecord {
                year: self.vehicle_year,
                make: self.vehicle_make,
                model: self.vehicle_model,
                purchase_price: self.purchase_price,
                vehicle_value: self.vehicle_value,
                vehicle_type: self.vehicle_type,
                negative_equity: self.negative_equity,
            },
            loan: LoanRequest {
                amount: self.loan_amount,
                term_months: self.term_months,
                down_payment: self.down_payment,
                proposed_monthly_payment: self.proposed_monthly_payment,
            },
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().parse::<f64>().map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "applicant_name,address,date_of_birth,monthly_gross_income,employer,years_employed,employment_stability,credit_score,monthly_debts,collections_count,collections_amount,recent_repossession,bankruptcy,vehicle_year,vehicle_make,vehicle_model,vehicle_type,purchase_price,vehicle_value,negative_equity,loan_amount,term_months,down_payment,proposed_monthly_payment";

    #[test]
    fn importer_parses_a_full_row() {
        let csv = format!(
            "{HEADER}\nSarah Chen,12 Bridge St,1991-04-02,7200,Meridian Labs,5.5,stable,742,850,0,,false,false,2024,Honda,Accord,new,34000,32000,0,24000,60,10000,\n"
        );
        let applications =
            BatchImporter::from_reader(Cursor::new(csv)).expect("roster parses");

        assert_eq!(applications.len(), 1);
        let application = &applications[0];
        assert_eq!(application.applicant.name, "Sarah Chen");
        assert_eq!(
            application.income.employment_stability,
            EmploymentStability::Stable
        );
        assert_eq!(application.credit.collections_amount, None);
        assert_eq!(application.vehicle.vehicle_type, VehicleType::New);
        assert_eq!(application.loan.term_months, 60);
        assert_eq!(application.loan.proposed_monthly_payment, None);
    }

    #[test]
    fn importer_reads_optional_amounts() {
        let csv = format!(
            "{HEADER}\nJennifer Lopez,9 Ash Ct,1988-11-19,3900,Harbor Cafe,0.8,unstable,590,1450,3,6200,true,false,2018,Ford,Escape,used,16500,14000,2500,15500,72,500,395\n"
        );
        let applications =
            BatchImporter::from_reader(Cursor::new(csv)).expect("roster parses");

        let application = &applications[0];
        assert_eq!(application.credit.collections_amount, Some(6200.0));
        assert_eq!(application.loan.proposed_monthly_payment, Some(395.0));
        assert!(application.credit.recent_repossession);
        assert_eq!(application.vehicle.negative_equity, 2500.0);
    }

    #[test]
    fn importer_rejects_malformed_rows() {
        let csv = format!(
            "{HEADER}\nBroken Row,1 Elm St,1990-01-01,not-a-number,Acme,2,stable,700,0,0,,false,false,2020,Kia,Soul,used,15000,14000,0,12000,48,1000,\n"
        );
        let error =
            BatchImporter::from_reader(Cursor::new(csv)).expect_err("expected csv error");

        match error {
            BatchImportError::Csv(_) => {}
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = BatchImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            BatchImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
