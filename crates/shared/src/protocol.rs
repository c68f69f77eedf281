use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{FeatureContributions, ScoreResult},
    error::{ResponseShapeError, ServerRejection, UNKNOWN_REJECTION_MESSAGE},
};

/// Multipart field carrying the audio bytes.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the anti-forgery token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// JSON body returned by the scoring endpoint for both outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureContributions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadVerdict {
    Accepted(ScoreResult),
    Rejected(ServerRejection),
}

impl UploadResponse {
    pub fn accepted(result: ScoreResult) -> Self {
        Self {
            success: true,
            score: Some(result.score),
            features: Some(result.features),
            ..Self::default()
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn into_verdict(self) -> Result<UploadVerdict, ResponseShapeError> {
        if !self.success {
            return Ok(UploadVerdict::Rejected(self.rejection()));
        }
        let score = self.score.ok_or(ResponseShapeError::MissingField("score"))?;
        let features = self
            .features
            .ok_or(ResponseShapeError::MissingField("features"))?;
        Ok(UploadVerdict::Accepted(ScoreResult { score, features }))
    }

    /// Structured `errors` win over the plain `error` string.
    fn rejection(&self) -> ServerRejection {
        let message = self
            .errors
            .as_ref()
            .and_then(flatten_errors)
            .or_else(|| self.error.clone().filter(|text| !text.trim().is_empty()))
            .unwrap_or_else(|| UNKNOWN_REJECTION_MESSAGE.to_string());
        ServerRejection::new(message)
    }
}

/// Turns form errors such as `{"file": ["This field is required."]}` into
/// `file: This field is required.`.
pub fn flatten_errors(errors: &Value) -> Option<String> {
    let text = match errors {
        Value::Null => return None,
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(flatten_errors)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(field, value)| {
                flatten_errors(value).map(|messages| {
                    if field == "__all__" {
                        messages
                    } else {
                        format!("{field}: {messages}")
                    }
                })
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn deserialize_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}
