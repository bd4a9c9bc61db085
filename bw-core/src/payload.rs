//! Result payloads of the history and derived-analysis stages.
//!
//! The analytics service shapes each of these independently and only the
//! matching view reads their fields, so the pipeline carries them as opaque
//! JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! opaque_payload {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Value);

        impl $name {
            pub fn as_value(&self) -> &Value {
                &self.0
            }

            /// Field lookup for renderers binding to a single entry.
            pub fn field(&self, key: &str) -> Option<&Value> {
                self.0.get(key)
            }
        }

        impl From<Value> for $name {
            fn from(value: Value) -> Self {
                $name(value)
            }
        }
    };
}

opaque_payload!(
    /// Long-run averages for a region: season dates, bloom length, fertility,
    /// yield, invasive-species probability and non-blooming years.
    HistoryRecord
);
opaque_payload!(
    /// Season phenology of the selected year (SOS/MOS/EOS, bloom window, amplitude).
    SeasonAnalysis
);
opaque_payload!(
    /// Current year compared against the region's history.
    HistoricalAnalysis
);
opaque_payload!(
    /// Growth, bloom date, pollen and yield estimate.
    GrowthEstimate
);
opaque_payload!(NutrientProfile);
opaque_payload!(EcologicalAssessment);
opaque_payload!(
    /// Current conditions, a seven-day outlook and six monthly summaries for a region.
    WeatherForecast
);

impl HistoryRecord {
    /// Serialized form forwarded into downstream requests (2-space indented JSON).
    pub fn serialized(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
