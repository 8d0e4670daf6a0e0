//! Pull the assessment document out of a chat reply.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in judge output")]
    NoObject,

    #[error("invalid JSON in judge output: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("judge response has no message content")]
    MissingContent,
}

/// The subset of a chat-completions response the judge reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice.
    pub fn content(&self) -> Result<&str, ExtractError> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or(ExtractError::MissingContent)
    }
}

/// First JSON object in `text`.
///
/// Leading prose and code fences are skipped; anything after the object is
/// ignored.
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoObject)?;
    let value = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or(ExtractError::NoObject)??;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let value = extract_json_object(r#"{"score": 0.9, "rationale": "ok"}"#).unwrap();
        assert_eq!(value, json!({"score": 0.9, "rationale": "ok"}));
    }

    #[test]
    fn test_fenced_object_with_trailing_prose() {
        let text = "Here you go:\n```json\n{\"now_passes\": true}\n```\nHope that helps.";
        assert_eq!(
            extract_json_object(text).unwrap(),
            json!({"now_passes": true})
        );
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(
            extract_json_object("I cannot judge this."),
            Err(ExtractError::NoObject)
        ));
    }

    #[test]
    fn test_truncated_object() {
        assert!(matches!(
            extract_json_object(r#"{"score": 0.9, "rationale": "#),
            Err(ExtractError::Invalid(_))
        ));
    }

    #[test]
    fn test_completion_content() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]
        }))
        .unwrap();
        assert_eq!(completion.content().unwrap(), "{}");

        let empty: ChatCompletion = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(empty.content(), Err(ExtractError::MissingContent)));

        let refusal: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(refusal.content().is_err());
    }
}
