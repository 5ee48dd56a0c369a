use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Three-valued creditworthiness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditRating {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "C")]
    C,
}

impl CreditRating {
    pub const fn label(self) -> &'static str {
        match self {
            CreditRating::Aaa => "AAA",
            CreditRating::Bbb => "BBB",
            CreditRating::C => "C",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a total risk score to its rating. Bounds are inclusive: 2 is `AAA`, 5 is `BBB`.
pub fn calculate_credit_rating(risk_score: i32) -> CreditRating {
    let rating = match risk_score {
        i32::MIN..=2 => CreditRating::Aaa,
        3..=5 => CreditRating::Bbb,
        _ => CreditRating::C,
    };
    debug!(risk_score, rating = rating.label(), "credit rating assigned");
    rating
}
