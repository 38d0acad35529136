//! Prediction form: the untyped submission body and its validated form.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vocab::{Hour, Month, Neighborhood};

const REQUIRED: &str = "This field is required.";
const NOT_A_FLOAT: &str = "Not a valid float value.";
const NOT_A_CHOICE: &str = "Not a valid choice.";

/// A validation message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Form body exactly as posted. Every field is optional so that a
/// missing value becomes a field error rather than an extraction failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForm {
    #[serde(default, alias = "Y_coord")]
    pub latitude: Option<String>,
    #[serde(default, alias = "X_coord")]
    pub longitude: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub hour: Option<String>,
}

/// A fully validated prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub latitude: f64,
    pub longitude: f64,
    pub month: Month,
    pub neighborhood: Neighborhood,
    pub hour: Hour,
}

impl RawForm {
    /// Validate every field, collecting all errors rather than stopping at the first.
    pub fn validate(&self) -> Result<Submission, Vec<FieldError>> {
        let mut errors = Vec::new();

        let latitude = float_field("latitude", self.latitude.as_deref(), &mut errors);
        let longitude = float_field("longitude", self.longitude.as_deref(), &mut errors);
        let month = choice_field::<Month>("month", self.month.as_deref(), &mut errors);
        let neighborhood =
            choice_field::<Neighborhood>("neighborhood", self.neighborhood.as_deref(), &mut errors);
        let hour = choice_field::<Hour>("hour", self.hour.as_deref(), &mut errors);

        match (latitude, longitude, month, neighborhood, hour) {
            (Some(latitude), Some(longitude), Some(month), Some(neighborhood), Some(hour)) => {
                Ok(Submission {
                    latitude,
                    longitude,
                    month,
                    neighborhood,
                    hour,
                })
            }
            _ => {
                debug!(errors = errors.len(), "form submission rejected");
                Err(errors)
            }
        }
    }

    /// Errors for a single field, for rendering next to its input.
    pub fn errors_for<'a>(errors: &'a [FieldError], field: &str) -> Vec<&'a str> {
        errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message)
            .collect()
    }
}

impl Submission {
    /// The collected fields in echo order: month, neighborhood, longitude, latitude, hour.
    ///
    /// Coordinates always carry a decimal point, so `37` echoes as `37.0`.
    pub fn data(&self) -> [String; 5] {
        [
            self.month.to_string(),
            self.neighborhood.to_string(),
            format!("{:?}", self.longitude),
            format!("{:?}", self.latitude),
            self.hour.to_string(),
        ]
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn float_field(field: &'static str, value: Option<&str>, errors: &mut Vec<FieldError>) -> Option<f64> {
    let Some(raw) = present(value) else {
        errors.push(FieldError {
            field,
            message: REQUIRED,
        });
        return None;
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(FieldError {
                field,
                message: NOT_A_FLOAT,
            });
            None
        }
    }
}

fn choice_field<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let Some(raw) = present(value) else {
        errors.push(FieldError {
            field,
            message: REQUIRED,
        });
        return None;
    };
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(FieldError {
                field,
                message: NOT_A_CHOICE,
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lat: &str, lon: &str, month: &str, hood: &str, hour: &str) -> RawForm {
        RawForm {
            latitude: Some(lat.into()),
            longitude: Some(lon.into()),
            month: Some(month.into()),
            neighborhood: Some(hood.into()),
            hour: Some(hour.into()),
        }
    }

    #[test]
    fn valid_form_produces_submission() {
        let sub = raw("37.733", "-122.394", "May", "MISSION", "17")
            .validate()
            .unwrap();
        assert_eq!(sub.latitude, 37.733);
        assert_eq!(sub.longitude, -122.394);
        assert_eq!(sub.month, Month::May);
        assert_eq!(sub.neighborhood, Neighborhood::Mission);
        assert_eq!(sub.hour.get(), 17);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = RawForm::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["latitude", "longitude", "month", "neighborhood", "hour"]
        );
        assert!(errors.iter().all(|e| e.message == REQUIRED));
    }

    #[test]
    fn blank_latitude_is_required_error() {
        let errors = raw("  ", "-122.4", "Jan", "PARK", "1").validate().unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError {
                field: "latitude",
                message: REQUIRED
            }]
        );
    }

    #[test]
    fn non_numeric_coordinates_rejected() {
        let errors = raw("north", "NaN", "Jan", "PARK", "1").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message == NOT_A_FLOAT));
    }

    #[test]
    fn out_of_range_hour_rejected() {
        for hour in ["0", "25", "-3", "9.5"] {
            let errors = raw("37.7", "-122.4", "Jan", "PARK", hour)
                .validate()
                .unwrap_err();
            assert_eq!(RawForm::errors_for(&errors, "hour"), vec![NOT_A_CHOICE]);
        }
    }

    #[test]
    fn unknown_month_and_neighborhood_rejected() {
        let errors = raw("37.7", "-122.4", "Mar", "SUNSET", "3")
            .validate()
            .unwrap_err();
        assert_eq!(RawForm::errors_for(&errors, "month"), vec![NOT_A_CHOICE]);
        assert_eq!(
            RawForm::errors_for(&errors, "neighborhood"),
            vec![NOT_A_CHOICE]
        );
    }

    #[test]
    fn legacy_coordinate_names_accepted() {
        let json = r#"{"Y_coord":"37.75","X_coord":"-122.41","month":"Dec","neighborhood":"CENTRAL","hour":"24"}"#;
        let form: RawForm = serde_json::from_str(json).unwrap();
        let sub = form.validate().unwrap();
        assert_eq!(sub.latitude, 37.75);
        assert_eq!(sub.longitude, -122.41);
    }

    #[test]
    fn data_orders_longitude_before_latitude() {
        let sub = raw("37.733", "-122.394", "Feb", "TARAVAL", "8")
            .validate()
            .unwrap();
        assert_eq!(
            sub.data(),
            ["Feb", "TARAVAL", "-122.394", "37.733", "8"].map(String::from)
        );
    }

    #[test]
    fn data_keeps_decimal_point_on_whole_coordinates() {
        let sub = raw("37", "-122", "Oct", "MISSION", "12").validate().unwrap();
        assert_eq!(sub.data()[2], "-122.0");
        assert_eq!(sub.data()[3], "37.0");
    }
}
