use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::config::MatchingConfigError;

/// Inclusive raw-score range of a screening instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Severity band covering raw scores up to and including `up_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub up_to: f64,
    pub label: String,
    pub multiplier: f64,
}

/// Screening instrument definition: range, ascending severity bands, and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub key: String,
    pub name: String,
    pub range: ScoreRange,
    pub bands: Vec<SeverityBand>,
    pub weight: f64,
}

impl Instrument {
    /// Severity band for a raw score, or `None` when the score is unusable.
    pub fn classify(&self, raw: f64) -> Option<&SeverityBand> {
        if !raw.is_finite() || !self.range.contains(raw) {
            return None;
        }

        self.bands
            .iter()
            .find(|band| raw <= band.up_to)
            .or_else(|| self.bands.last())
    }

    /// Label used in `matching_factors`, e.g. `PHQ9 (moderate)`.
    pub fn factor_label(&self, severity: &str) -> String {
        format!("{} ({})", self.key.to_uppercase(), severity)
    }

    pub(crate) fn validate(&self) -> Result<(), MatchingConfigError> {
        let invalid = |detail: String| MatchingConfigError::Invalid(format!("{}: {detail}", self.key));

        if self.key.trim().is_empty() {
            return Err(MatchingConfigError::Invalid(
                "instrument key must not be empty".to_string(),
            ));
        }
        if !(self.range.min.is_finite() && self.range.max.is_finite())
            || self.range.min > self.range.max
        {
            return Err(invalid(format!(
                "range [{}, {}] is not a valid interval",
                self.range.min, self.range.max
            )));
        }
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(invalid(format!("weight {} must be in (0, 1]", self.weight)));
        }

        let Some(last) = self.bands.last() else {
            return Err(invalid("at least one severity band is required".to_string()));
        };

        let mut previous: Option<f64> = None;
        for band in &self.bands {
            if let Some(prev) = previous {
                if band.up_to <= prev {
                    return Err(invalid(format!(
                        "band '{}' threshold {} must be above {}",
                        band.label, band.up_to, prev
                    )));
                }
            }
            if !(band.multiplier > 0.0 && band.multiplier <= 1.0) {
                return Err(invalid(format!(
                    "band '{}' multiplier {} must be in (0, 1]",
                    band.label, band.multiplier
                )));
            }
            previous = Some(band.up_to);
        }

        if (last.up_to - self.range.max).abs() > f64::EPSILON {
            return Err(invalid(format!(
                "last band must end at range max {} (found {})",
                self.range.max, last.up_to
            )));
        }

        Ok(())
    }
}

fn band(up_to: f64, label: &str, multiplier: f64) -> SeverityBand {
    SeverityBand {
        up_to,
        label: label.to_string(),
        multiplier,
    }
}

/// PHQ-9 depression scale (0-27).
pub fn phq9() -> Instrument {
    Instrument {
        key: "phq9".to_string(),
        name: "PHQ-9".to_string(),
        range: ScoreRange { min: 0.0, max: 27.0 },
        bands: vec![
            band(4.0, "minimal", 0.3),
            band(9.0, "mild", 0.6),
            band(14.0, "moderate", 0.9),
            band(19.0, "moderately severe", 1.0),
            band(27.0, "severe", 1.0),
        ],
        weight: 0.8,
    }
}

/// GAD-7 anxiety scale (0-21).
pub fn gad7() -> Instrument {
    Instrument {
        key: "gad7".to_string(),
        name: "GAD-7".to_string(),
        range: ScoreRange { min: 0.0, max: 21.0 },
        bands: vec![
            band(4.0, "minimal", 0.3),
            band(9.0, "mild", 0.6),
            band(14.0, "moderate", 0.9),
            band(21.0, "severe", 1.0),
        ],
        weight: 0.7,
    }
}

/// PTSD-5 screen (0-20).
pub fn ptsd5() -> Instrument {
    Instrument {
        key: "ptsd5".to_string(),
        name: "PTSD-5".to_string(),
        range: ScoreRange { min: 0.0, max: 20.0 },
        bands: vec![
            band(2.0, "minimal", 0.3),
            band(7.0, "mild", 0.6),
            band(14.0, "moderate", 0.9),
            band(20.0, "severe", 1.0),
        ],
        weight: 0.9,
    }
}

/// Ordered set of configured instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentCatalog(Vec<Instrument>);

impl InstrumentCatalog {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self(instruments)
    }

    pub fn standard() -> Self {
        Self(vec![phq9(), gad7(), ptsd5()])
    }

    pub fn get(&self, key: &str) -> Option<&Instrument> {
        self.0.iter().find(|instrument| instrument.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|instrument| instrument.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Classify a raw score for the named instrument.
    pub fn classify(&self, key: &str, raw: f64) -> Option<&SeverityBand> {
        self.get(key).and_then(|instrument| instrument.classify(raw))
    }

    pub(crate) fn validate(&self) -> Result<(), MatchingConfigError> {
        let mut seen = BTreeSet::new();
        for instrument in &self.0 {
            instrument.validate()?;
            if !seen.insert(instrument.key.as_str()) {
                return Err(MatchingConfigError::Invalid(format!(
                    "duplicate instrument key '{}'",
                    instrument.key
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phq9_bands_follow_published_cutoffs() {
        let phq9 = phq9();
        let labels: Vec<_> = [0.0, 4.0, 5.0, 9.0, 10.0, 14.0, 15.0, 19.0, 20.0, 27.0]
            .iter()
            .map(|score| phq9.classify(*score).expect("in range").label.as_str())
            .collect();

        assert_eq!(
            labels,
            vec![
                "minimal",
                "minimal",
                "mild",
                "mild",
                "moderate",
                "moderate",
                "moderately severe",
                "moderately severe",
                "severe",
                "severe",
            ]
        );
    }

    #[test]
    fn gad7_and_ptsd5_use_their_own_thresholds() {
        let catalog = InstrumentCatalog::standard();

        assert_eq!(catalog.classify("gad7", 15.0).expect("band").label, "severe");
        assert_eq!(catalog.classify("gad7", 14.0).expect("band").label, "moderate");
        assert_eq!(catalog.classify("ptsd5", 2.0).expect("band").label, "minimal");
        assert_eq!(catalog.classify("ptsd5", 3.0).expect("band").label, "mild");
        assert_eq!(catalog.classify("ptsd5", 8.0).expect("band").multiplier, 0.9);
    }

    #[test]
    fn multipliers_share_one_band_structure() {
        for instrument in InstrumentCatalog::standard().iter() {
            let multipliers: BTreeSet<u32> = instrument
                .bands
                .iter()
                .map(|band| (band.multiplier * 10.0).round() as u32)
                .collect();
            assert_eq!(multipliers, BTreeSet::from([3, 6, 9, 10]), "{}", instrument.key);
        }
    }

    #[test]
    fn classify_rejects_unusable_scores() {
        let phq9 = phq9();
        assert!(phq9.classify(-1.0).is_none());
        assert!(phq9.classify(28.0).is_none());
        assert!(phq9.classify(f64::NAN).is_none());
        assert!(InstrumentCatalog::standard().classify("bdi2", 10.0).is_none());
    }

    #[test]
    fn factor_label_upper_cases_key() {
        assert_eq!(phq9().factor_label("moderately severe"), "PHQ9 (moderately severe)");
    }

    #[test]
    fn validate_rejects_non_ascending_bands() {
        let mut instrument = gad7();
        instrument.bands.swap(1, 2);

        let error = instrument.validate().expect_err("bands out of order");
        assert!(error.to_string().contains("gad7"));
    }

    #[test]
    fn validate_rejects_bands_that_stop_short_of_range() {
        let mut instrument = ptsd5();
        instrument.bands.pop();

        assert!(instrument.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_weight() {
        let mut instrument = phq9();
        instrument.weight = 1.5;
        assert!(instrument.validate().is_err());

        instrument.weight = 0.0;
        assert!(instrument.validate().is_err());
    }

    #[test]
    fn catalog_rejects_duplicate_keys() {
        let catalog = InstrumentCatalog::new(vec![phq9(), phq9()]);
        assert!(catalog.validate().is_err());
        assert!(InstrumentCatalog::standard().validate().is_ok());
    }
}
