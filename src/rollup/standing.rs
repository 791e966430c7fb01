use serde::Serialize;
use std::fmt;

/// Averages at or above this pass.
pub const PASS_THRESHOLD: f64 = 10.0;
/// Averages at or above this, but below [`PASS_THRESHOLD`], need attention.
pub const ALERT_THRESHOLD: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Pass,
    Alert,
    Fail,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Standing::Pass => "pass",
            Standing::Alert => "alert",
            Standing::Fail => "fail",
        };
        f.write_str(s)
    }
}

/// Classifies a unit average on the 0–20 scale.
///
/// | Range   | Standing |
/// |---------|----------|
/// | >= 10   | Pass     |
/// | >= 8    | Alert    |
/// | < 8     | Fail     |
pub fn standing(average: f64) -> Standing {
    match average {
        a if a >= PASS_THRESHOLD => Standing::Pass,
        a if a >= ALERT_THRESHOLD => Standing::Alert,
        _ => Standing::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standing_boundaries() {
        assert_eq!(standing(20.0), Standing::Pass);
        assert_eq!(standing(10.0), Standing::Pass);
        assert_eq!(standing(9.99), Standing::Alert);
        assert_eq!(standing(8.0), Standing::Alert);
        assert_eq!(standing(7.99), Standing::Fail);
        assert_eq!(standing(0.0), Standing::Fail);
    }

    #[test]
    fn test_standing_display() {
        assert_eq!(Standing::Alert.to_string(), "alert");
    }
}
