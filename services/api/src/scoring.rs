use clap::Args;
use mortgage_rating::error::AppError;
use mortgage_rating::mortgages::{
    assess, risk::resolve_average, LoanType, MortgageBatchScorer, MortgageFields, PropertyType,
    RiskAssessment,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RateArgs {
    /// Applicant credit score
    #[arg(long, default_value_t = 0)]
    pub(crate) credit_score: i64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) loan_amount: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) property_value: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) annual_income: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) debt_amount: f64,
    /// `fixed` or `adjustable`; anything else is rated as adjustable
    #[arg(long, default_value = "fixed")]
    pub(crate) loan_type: String,
    /// `single_family` or `condo`; anything else is rated as a condo
    #[arg(long, default_value = "single_family")]
    pub(crate) property_type: String,
    /// Population average credit score (defaults to the applicant's own score)
    #[arg(long)]
    pub(crate) average: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with camelCase field headers
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

impl RateArgs {
    fn fields(&self) -> MortgageFields {
        MortgageFields {
            credit_score: self.credit_score,
            loan_amount: self.loan_amount,
            property_value: self.property_value,
            annual_income: self.annual_income,
            debt_amount: self.debt_amount,
            loan_type: LoanType::from(self.loan_type.as_str()),
            property_type: PropertyType::from(self.property_type.as_str()),
        }
    }
}

pub(crate) fn run_rate(args: RateArgs) {
    let fields = args.fields();
    let average = resolve_average(args.average, &fields);
    let assessment = assess(&fields, average);

    println!("Mortgage credit rating");
    for line in render_assessment(&assessment) {
        println!("{line}");
    }
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let outcomes = MortgageBatchScorer::from_path(&args.csv)?;
    let rated = outcomes.iter().filter(|outcome| outcome.result.is_ok()).count();

    println!(
        "Rated {rated} of {} application(s) from {}",
        outcomes.len(),
        args.csv.display()
    );
    for outcome in &outcomes {
        match &outcome.result {
            Ok((fields, assessment)) => println!(
                "  line {:>4}: {:<3} risk {:>3} (credit {}, average {:.1})",
                outcome.line,
                assessment.credit_rating.label(),
                assessment.risk_score,
                fields.credit_score,
                assessment.average_credit_score
            ),
            Err(err) => println!("  line {:>4}: skipped, {err}", outcome.line),
        }
    }

    Ok(())
}

fn render_assessment(assessment: &RiskAssessment) -> Vec<String> {
    let components = &assessment.components;
    vec![
        format!("  Rating: {}", assessment.credit_rating),
        format!("  Risk score: {}", assessment.risk_score),
        format!(
            "  Population average credit score: {:.1}",
            assessment.average_credit_score
        ),
        format!("  - loan-to-value: {:+}", components.loan_to_value),
        format!("  - debt-to-income: {:+}", components.debt_to_income),
        format!("  - credit score: {:+}", components.credit_score),
        format!("  - loan type: {:+}", components.loan_type),
        format!("  - property type: {:+}", components.property_type),
        format!("  - average credit score: {:+}", components.avg_credit_score),
    ]
}
