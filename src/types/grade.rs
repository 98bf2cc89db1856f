//! Final grade shown when time runs out

use serde::{Deserialize, Serialize};

/// Verdict on a FINISHED session's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    /// score > 90
    Master,
    /// score > 60
    Pass,
    Fail,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score > 90.0 {
            Grade::Master
        } else if score > 60.0 {
            Grade::Pass
        } else {
            Grade::Fail
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            Grade::Master => "Master of the crib sheet. Top schools, here you come.",
            Grade::Pass => "Scraped a pass. Be more careful next time.",
            Grade::Fail => "Hardly worth the risk...",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Grade::Master => "MASTER",
            Grade::Pass => "PASS",
            Grade::Fail => "FAIL",
        };
        write!(f, "{}", name)
    }
}
