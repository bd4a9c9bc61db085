use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven remote operations a pipeline run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Series,
    History,
    Season,
    Historical,
    Growth,
    Nutrient,
    Ecological,
}

impl Stage {
    /// Derived-analysis stages in the order a run issues them.
    /// `Ecological` is last: it consumes the other four.
    pub const DERIVED: [Stage; 5] = [
        Stage::Season,
        Stage::Historical,
        Stage::Growth,
        Stage::Nutrient,
        Stage::Ecological,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Series => "series",
            Stage::History => "history",
            Stage::Season => "season",
            Stage::Historical => "historical",
            Stage::Growth => "growth",
            Stage::Nutrient => "nutrient",
            Stage::Ecological => "ecological",
        }
    }

    /// Failure of a derived stage never aborts the run.
    pub fn is_isolated(&self) -> bool {
        !matches!(self, Stage::Series | Stage::History)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Stage;

    #[test]
    fn test_ecological_is_last_derived_stage() {
        assert_eq!(Stage::DERIVED.last(), Some(&Stage::Ecological));
        assert!(Stage::DERIVED.iter().all(Stage::is_isolated));
        assert!(!Stage::Series.is_isolated());
        assert!(!Stage::History.is_isolated());
    }

    #[test]
    fn test_stage_serializes_as_name() {
        let json = serde_json::to_string(&Stage::Nutrient).unwrap();
        assert_eq!(json, "\"nutrient\"");
        assert_eq!(Stage::Historical.to_string(), "historical");
    }
}
