use crate::infra::parse_date;
use chrono::{Local, NaiveDate};
use clap::Args;
use loan_ai::error::AppError;
use loan_ai::workflows::underwriting::{
    render_markdown, ApplicantIdentity, ApplicationId, BatchImporter, CreditRecord,
    EmploymentStability, IncomeRecord, LoanApplication, LoanRequest, PolicyConfig,
    UnderwritingEngine, UnderwritingResult, VehicleRecord, VehicleType,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Application JSON file matching the intake contract
    #[arg(long)]
    pub(crate) application: PathBuf,
    /// Decision date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the full underwriting report instead of the one-line summary
    #[arg(long)]
    pub(crate) full_report: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Applicant roster CSV, one application per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Decision date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Decision date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the full underwriting report for every demo applicant
    #[arg(long)]
    pub(crate) full_report: bool,
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let DecideArgs {
        application,
        as_of,
        full_report,
    } = args;

    let file = std::fs::File::open(application)?;
    let application: LoanApplication = serde_json::from_reader(file)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let engine = UnderwritingEngine::new(PolicyConfig::standard())?;
    let result = engine.evaluate(
        &ApplicationId("cli-000001".to_string()),
        &application,
        as_of,
    )?;

    if full_report {
        println!("{}", render_markdown(&result, &application));
    } else {
        render_summary_line(&result);
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs { csv, as_of } = args;

    let applications = BatchImporter::from_path(csv)?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = UnderwritingEngine::new(PolicyConfig::standard())?;

    println!("Underwriting roster ({} applicants, as of {as_of})", applications.len());
    for (index, application) in applications.iter().enumerate() {
        let application_id = ApplicationId(format!("batch-{:04}", index + 1));
        let result = engine.evaluate(&application_id, application, as_of)?;
        render_summary_line(&result);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { as_of, full_report } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = UnderwritingEngine::new(PolicyConfig::standard())?;

    println!("Auto-loan underwriting demo (as of {as_of})");
    println!("Policy version: {}", engine.config().policy_version);

    for (index, application) in demo_applications().iter().enumerate() {
        let application_id = ApplicationId(format!("demo-{:04}", index + 1));
        let result = engine.evaluate(&application_id, application, as_of)?;

        println!("\n--- {} ---", application.applicant.name);
        if full_report {
            println!("{}", render_markdown(&result, application));
        } else {
            println!(
                "DTI {:.1}% | LTV {:.1}% | projected collateral ${:.0} at maturity",
                result.metrics.dti * 100.0,
                result.metrics.ltv * 100.0,
                result.metrics.projected_value_at_maturity
            );
            for violation in &result.violations {
                if violation.severity.is_violation() {
                    println!(
                        "violation [{}] {}: {}",
                        violation.severity.label(),
                        violation.rule.label(),
                        violation.description
                    );
                }
            }
            render_summary_line(&result);
        }
    }

    Ok(())
}

fn render_summary_line(result: &UnderwritingResult) {
    println!(
        "{} -> {} ({}) | {}",
        result.applicant.name,
        result.decision.label(),
        result.approval_authority.label(),
        result.rationale
    );
}

/// Four applicants spanning the decision spectrum, from prime borrower to
/// automatic denial.
pub(crate) fn demo_applications() -> Vec<LoanApplication> {
    vec![
        // Prime borrower: clears every check.
        LoanApplication {
            applicant: ApplicantIdentity {
                name: "Sarah Chen".to_string(),
                address: "12 Bridge St, Des Moines, IA".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1991, 4, 2).expect("valid date"),
            },
            income: IncomeRecord {
                monthly_gross_income: 7_200.0,
                employer: "Meridian Labs".to_string(),
                years_employed: 5.5,
                employment_stability: EmploymentStability::Stable,
            },
            credit: CreditRecord {
                score: 742,
                monthly_debts: 850.0,
                collections_count: 0,
                collections_amount: None,
                recent_repossession: false,
                bankruptcy: false,
            },
            vehicle: VehicleRecord {
                year: 2024,
                make: "Honda".to_string(),
                model: "Accord".to_string(),
                purchase_price: 34_000.0,
                vehicle_value: 32_000.0,
                vehicle_type: VehicleType::New,
                negative_equity: 0.0,
            },
            loan: LoanRequest {
                amount: 24_000.0,
                term_months: 60,
                down_payment: 10_000.0,
                proposed_monthly_payment: None,
            },
        },
        // Warning-band DTI and sub-700 credit: a senior underwriter decides.
        LoanApplication {
            applicant: ApplicantIdentity {
                name: "Marcus Johnson".to_string(),
                address: "44 Linden Ave, Cedar Rapids, IA".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 9, 14).expect("valid date"),
            },
            income: IncomeRecord {
                monthly_gross_income: 5_200.0,
                employer: "Prairie Logistics".to_string(),
                years_employed: 3.2,
                employment_stability: EmploymentStability::Stable,
            },
            credit: CreditRecord {
                score: 675,
                monthly_debts: 1_780.0,
                collections_count: 0,
                collections_amount: None,
                recent_repossession: false,
                bankruptcy: false,
            },
            vehicle: VehicleRecord {
                year: 2023,
                make: "Toyota".to_string(),
                model: "RAV4".to_string(),
                purchase_price: 23_500.0,
                vehicle_value: 21_000.0,
                vehicle_type: VehicleType::Used,
                negative_equity: 0.0,
            },
            loan: LoanRequest {
                amount: 18_000.0,
                term_months: 60,
                down_payment: 3_500.0,
                proposed_monthly_payment: Some(380.0),
            },
        },
        // Fair credit with an over-limit DTI: regional director territory.
        LoanApplication {
            applicant: ApplicantIdentity {
                name: "David Martinez".to_string(),
                address: "7 Quarry Rd, Ames, IA".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1993, 1, 27).expect("valid date"),
            },
            income: IncomeRecord {
                monthly_gross_income: 4_800.0,
                employer: "Heartland Builders".to_string(),
                years_employed: 2.4,
                employment_stability: EmploymentStability::Stable,
            },
            credit: CreditRecord {
                score: 635,
                monthly_debts: 1_650.0,
                collections_count: 0,
                collections_amount: None,
                recent_repossession: false,
                bankruptcy: false,
            },
            vehicle: VehicleRecord {
                year: 2022,
                make: "Chevrolet".to_string(),
                model: "Equinox".to_string(),
                purchase_price: 17_000.0,
                vehicle_value: 15_000.0,
                vehicle_type: VehicleType::Used,
                negative_equity: 0.0,
            },
            loan: LoanRequest {
                amount: 13_000.0,
                term_months: 60,
                down_payment: 1_500.0,
                proposed_monthly_payment: Some(558.0),
            },
        },
        // Deep subprime with a repossession and open collections: automatic denial.
        LoanApplication {
            applicant: ApplicantIdentity {
                name: "Jennifer Lopez".to_string(),
                address: "9 Ash Ct, Davenport, IA".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 19).expect("valid date"),
            },
            income: IncomeRecord {
                monthly_gross_income: 3_900.0,
                employer: "Harbor Cafe".to_string(),
                years_employed: 0.8,
                employment_stability: EmploymentStability::Unstable,
            },
            credit: CreditRecord {
                score: 590,
                monthly_debts: 1_450.0,
                collections_count: 3,
                collections_amount: Some(6_200.0),
                recent_repossession: true,
                bankruptcy: false,
            },
            vehicle: VehicleRecord {
                year: 2018,
                make: "Ford".to_string(),
                model: "Escape".to_string(),
                purchase_price: 16_500.0,
                vehicle_value: 14_000.0,
                vehicle_type: VehicleType::Used,
                negative_equity: 2_500.0,
            },
            loan: LoanRequest {
                amount: 15_500.0,
                term_months: 72,
                down_payment: 500.0,
                proposed_monthly_payment: Some(395.0),
            },
        },
    ]
}
