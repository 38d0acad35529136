//! Submission → predicted crime category.

use crimecast_core::Submission;
use serde::Serialize;
use tracing::{debug, info};

use crate::booster::argmax;
use crate::{ArtifactPaths, Booster, CategoryMap, ColumnList, FeatureEncoder, ModelError};

/// Top category for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub class_index: usize,
    /// Probability of `label`, in [0, 1].
    pub probability: f64,
}

impl Prediction {
    /// Probability as a percentage rounded to two decimals.
    pub fn percent(&self) -> f64 {
        (self.probability * 100.0 * 100.0).round() / 100.0
    }
}

/// Encoder, ensemble and category names, loaded together and checked for
/// compatibility.
#[derive(Debug, Clone)]
pub struct Predictor {
    encoder: FeatureEncoder,
    booster: Booster,
    categories: CategoryMap,
}

impl Predictor {
    pub fn new(
        encoder: FeatureEncoder,
        booster: Booster,
        categories: CategoryMap,
    ) -> Result<Self, ModelError> {
        if let Some(missing) = (0..booster.num_class()).find(|&c| categories.get(c).is_none()) {
            return Err(ModelError::Artifact(format!(
                "model emits {} classes but category map has no name for class {missing}",
                booster.num_class()
            )));
        }
        Ok(Self {
            encoder,
            booster,
            categories,
        })
    }

    /// Load and cross-check all three artifacts.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ModelError> {
        let columns = ColumnList::load(&paths.columns)?;
        let booster = Booster::load(&paths.model, &columns)?;
        let categories = CategoryMap::load(&paths.categories)?;
        let encoder = FeatureEncoder::new(columns)?;
        let predictor = Self::new(encoder, booster, categories)?;
        info!(
            features = predictor.encoder.width(),
            classes = predictor.booster.num_class(),
            "predictor ready"
        );
        Ok(predictor)
    }

    /// Build from in-memory artifact documents.
    pub fn from_json(model: &str, columns: &str, categories: &str) -> Result<Self, ModelError> {
        let columns = ColumnList::from_json(columns)?;
        let booster = Booster::from_json(model, &columns)?;
        let categories = CategoryMap::from_json(categories)?;
        Self::new(FeatureEncoder::new(columns)?, booster, categories)
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    /// Most probable category for a submission.
    pub fn classify(&self, submission: &Submission) -> Result<Prediction, ModelError> {
        let features = self.encoder.encode(submission);
        let batch = self.encoder.to_record_batch(&[features])?;
        let proba = self
            .booster
            .predict_batch(&batch)?
            .pop()
            .ok_or_else(|| ModelError::Artifact("model returned no rows".into()))?;

        let class_index = argmax(&proba);
        let label = self
            .categories
            .get(class_index)
            .ok_or(ModelError::UnknownClass(class_index))?
            .to_string();

        let prediction = Prediction {
            label,
            class_index,
            probability: proba[class_index],
        };
        debug!(
            label = %prediction.label,
            probability = prediction.probability,
            "classified submission"
        );
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crimecast_core::{Hour, Month, Neighborhood};

    const COLUMNS: &str = r#"["Jan", "July", "MISSION", "SOUTHERN", "X", "Y", "Hour"]"#;
    const CATEGORIES: &str = r#"["LARCENY/THEFT", "ASSAULT"]"#;
    const MODEL: &str = r#"{
        "objective": "multi:softprob",
        "num_class": 2,
        "trees": [
            {"nodeid": 0, "split": "SOUTHERN", "split_condition": 0.5,
             "yes": 1, "no": 2, "missing": 1, "children": [
                {"nodeid": 1, "leaf": 0.0}, {"nodeid": 2, "leaf": 1.0}
            ]},
            {"nodeid": 0, "split": "Hour", "split_condition": 20.5,
             "yes": 1, "no": 2, "missing": 1, "children": [
                {"nodeid": 1, "leaf": 0.0}, {"nodeid": 2, "leaf": 2.0}
            ]}
        ]
    }"#;

    fn submission(neighborhood: Neighborhood, hour: u8) -> Submission {
        Submission {
            latitude: 37.78,
            longitude: -122.41,
            month: Month::July,
            neighborhood,
            hour: Hour::new(hour).unwrap(),
        }
    }

    #[test]
    fn classify_southern_afternoon_is_larceny() {
        let p = Predictor::from_json(MODEL, COLUMNS, CATEGORIES).unwrap();
        let pred = p.classify(&submission(Neighborhood::Southern, 14)).unwrap();
        assert_eq!(pred.label, "LARCENY/THEFT");
        assert_eq!(pred.class_index, 0);
        let expected = 1.0 / (1.0 + (-1.0f64).exp());
        assert!((pred.probability - expected).abs() < 1e-12);
    }

    #[test]
    fn classify_late_night_is_assault() {
        let p = Predictor::from_json(MODEL, COLUMNS, CATEGORIES).unwrap();
        let pred = p.classify(&submission(Neighborhood::Mission, 23)).unwrap();
        assert_eq!(pred.label, "ASSAULT");
        assert!(pred.probability > 0.5 && pred.probability <= 1.0);
    }

    #[test]
    fn percent_rounds_to_two_decimals() {
        let pred = Prediction {
            label: "ASSAULT".into(),
            class_index: 1,
            probability: 0.731_058_578,
        };
        assert_eq!(pred.percent(), 73.11);
    }

    #[test]
    fn category_map_must_cover_every_class() {
        let err = Predictor::from_json(MODEL, COLUMNS, r#"["LARCENY/THEFT"]"#).unwrap_err();
        assert!(matches!(err, ModelError::Artifact(msg) if msg.contains("class 1")));
    }

    #[test]
    fn load_from_artifact_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(&paths.model, MODEL).unwrap();
        std::fs::write(&paths.columns, COLUMNS).unwrap();
        std::fs::write(&paths.categories, CATEGORIES).unwrap();

        let p = Predictor::load(&paths).unwrap();
        assert_eq!(p.categories().len(), 2);
        let pred = p.classify(&submission(Neighborhood::Southern, 9)).unwrap();
        assert_eq!(pred.label, "LARCENY/THEFT");
    }

    #[test]
    fn load_fails_without_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        std::fs::write(&paths.columns, COLUMNS).unwrap();
        std::fs::write(&paths.categories, CATEGORIES).unwrap();
        assert!(matches!(
            Predictor::load(&paths),
            Err(ModelError::Io { .. })
        ));
    }
}
