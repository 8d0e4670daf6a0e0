//! Schema validation for cycle records and phase assessments.
//!
//! Bounded and non-empty fields are modelled as newtypes ([`Score`],
//! [`Rationale`]) whose constructors and `Deserialize` impls share one check,
//! so an assessment holding an out-of-range score cannot be built by either
//! route. Cross-field rules live in [`Validate`] impls and run in
//! [`from_document`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Post-deserialization checks a schema type applies to itself.
pub trait Validate {
    /// # Errors
    ///
    /// Returns the first rule the value violates.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Build a schema type from raw key-value data.
///
/// Shape problems (missing field, wrong type, out-of-range score, blank
/// rationale) surface as [`ValidationError::Document`]; the type's own
/// [`Validate`] rules run afterwards.
pub fn from_document<T>(document: serde_json::Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(document)?;
    value.validate()?;
    Ok(value)
}

/// Reject strings that are empty or whitespace only.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// A judgment score in `[0.0, 1.0]`, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const MIN: Score = Score(0.0);
    pub const MAX: Score = Score(1.0);

    /// # Errors
    ///
    /// `ValidationError::ScoreOutOfRange` for NaN, infinities and values
    /// outside the unit interval.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ScoreOutOfRange { value });
        }
        Ok(Score(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Free-text justification attached to an assessment. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rationale(String);

impl Rationale {
    /// # Errors
    ///
    /// `ValidationError::EmptyRationale` when the text is blank.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyRationale);
        }
        Ok(Rationale(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Rationale {
    type Error = ValidationError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Rationale::new(text)
    }
}

impl From<Rationale> for String {
    fn from(rationale: Rationale) -> Self {
        rationale.0
    }
}

impl std::fmt::Display for Rationale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
