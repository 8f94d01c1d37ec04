use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::scoring::{ModelBundle, PredictionResult, PredictionService};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Model bundle to score with (defaults to the configured bundle path)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// JSON file holding one applicant record
    #[arg(long)]
    pub(crate) input: PathBuf,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let model = match args.model {
        Some(path) => path,
        None => AppConfig::load()?.model.bundle_path,
    };

    let result = score_file(&model, &args.input)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Unlike the server, a broken bundle is a hard error here.
pub(crate) fn score_file(model: &Path, input: &Path) -> Result<PredictionResult, AppError> {
    let bundle = ModelBundle::load(model)?;
    let service = PredictionService::new(bundle);

    let raw = fs::read_to_string(input)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(service.predict_json(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::scoring::Decision;
    use serde_json::json;

    fn write_temp(name: &str, contents: &serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents.to_string()).expect("writes temp file");
        path
    }

    fn bundle() -> serde_json::Value {
        json!({
            "schema_version": "v1",
            "best_threshold": 0.5,
            "features": ["Credit_Score", "Emp_Credit_Stability"],
            "classifier": {
                "kind": "logistic_regression",
                "coefficients": [0.0, 0.01],
                "intercept": -1.0
            }
        })
    }

    #[test]
    fn scores_applicant_file() {
        let model = write_temp("loan-approval-score-bundle.json", &bundle());
        let input = write_temp(
            "loan-approval-score-input.json",
            &json!({ "Age": 30, "Income": 50000, "Credit_Score": 700, "Loan_Amount": 200000 }),
        );

        let result = score_file(&model, &input).expect("scores");

        // sigmoid(-1 + 1.75) = sigmoid(0.75)
        assert_eq!(result.decision, Decision::Approved);
        assert_eq!(result.probability, 0.6792);
    }

    #[test]
    fn missing_bundle_is_a_hard_error() {
        let input = write_temp(
            "loan-approval-score-orphan-input.json",
            &json!({ "Age": 30, "Income": 50000, "Credit_Score": 700, "Loan_Amount": 200000 }),
        );
        let missing = std::env::temp_dir().join("loan-approval-score-missing.json");

        let err = score_file(&missing, &input).expect_err("no bundle");
        assert!(matches!(err, AppError::Bundle(_)));
    }
}
