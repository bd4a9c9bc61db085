use crate::payload::{
    EcologicalAssessment, GrowthEstimate, HistoricalAnalysis, HistoryRecord, NutrientProfile,
    SeasonAnalysis,
};
use crate::selection::Selection;
use crate::series::RawSeriesRow;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate result of one pipeline run.
///
/// Every optional field starts absent. An absent field is a displayable
/// state ("no data available yet"), whether the stage failed or was never reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub selection: Selection,
    pub generation: u64,
    pub series: Vec<RawSeriesRow>,
    pub history: Option<HistoryRecord>,
    pub season: Option<SeasonAnalysis>,
    pub historical: Option<HistoricalAnalysis>,
    pub growth: Option<GrowthEstimate>,
    pub nutrient: Option<NutrientProfile>,
    pub ecological: Option<EcologicalAssessment>,
    /// Error description per failed stage
    pub stage_errors: BTreeMap<Stage, String>,
}

impl AnalysisSnapshot {
    pub fn new(selection: Selection, generation: u64) -> Self {
        AnalysisSnapshot {
            selection,
            generation,
            series: Vec::new(),
            history: None,
            season: None,
            historical: None,
            growth: None,
            nutrient: None,
            ecological: None,
            stage_errors: BTreeMap::new(),
        }
    }

    pub fn stage_error(&self, stage: Stage) -> Option<&str> {
        self.stage_errors.get(&stage).map(String::as_str)
    }

    /// Whether the field a stage fills is present.
    pub fn has(&self, stage: Stage) -> bool {
        match stage {
            Stage::Series => !self.series.is_empty(),
            Stage::History => self.history.is_some(),
            Stage::Season => self.season.is_some(),
            Stage::Historical => self.historical.is_some(),
            Stage::Growth => self.growth.is_some(),
            Stage::Nutrient => self.nutrient.is_some(),
            Stage::Ecological => self.ecological.is_some(),
        }
    }

    /// True when no derived-analysis field is populated.
    pub fn has_no_derived(&self) -> bool {
        Stage::DERIVED.iter().all(|s| !self.has(*s))
    }
}
