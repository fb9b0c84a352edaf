use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::super::domain::RecordedScore;
use super::super::instruments::InstrumentCatalog;

/// Extract configured instrument scores from a pre-assessment answers document.
///
/// Instrument `k` is read from `scores.{k}Score`. Missing, null, and non-numeric
/// values are left out.
pub fn scores_from_pre_assessment(
    document: &Value,
    catalog: &InstrumentCatalog,
    recorded_at: DateTime<Utc>,
) -> BTreeMap<String, RecordedScore> {
    let Some(scores) = document.get("scores").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    catalog
        .keys()
        .filter_map(|key| {
            let score = scores.get(&format!("{key}Score"))?.as_f64()?;
            Some((key.to_string(), RecordedScore { score, recorded_at }))
        })
        .collect()
}
