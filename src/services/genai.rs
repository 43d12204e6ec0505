// SPDX-License-Identifier: MIT

//! Gemini client for AI-assisted question generation.
//!
//! One generateContent call with a strict JSON response schema; no retry
//! or backoff, failures propagate to the admin caller as 502.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SYSTEM_PROMPT: &str = r#"
# Role
You are the Expert Quiz Master for a weekly general-knowledge competition.
Your goal is to curate high-quality, engaging, and balanced questions.

# Instructions
1. Quantity: return exactly the number of questions requested.
2. Standardization:
    - "question": the question text.
    - "choices": a list of exactly 4 strings.
    - "correct_answer": a single character ('a', 'b', 'c', or 'd') giving
      the index of the answer in "choices" ('a' is index 0, 'b' index 1, ...).
3. Difficulty: a well-read adult should need to think for 30-60 seconds.
   Avoid primary-school trivia; prefer questions that connect facts about
   well-known entities.

# Quality Guidelines
- All 4 choices must be plausible; avoid silly wrong answers.
- Exactly one clearly correct answer among the four choices.
- Verify the correct answer is factually accurate and present in "choices".

# Output Format (Strict)
Return a JSON object with the top-level key "question_sets" (a list).
Do not include markdown formatting or extra text.
"#;

/// One generated question draft. Not persisted; the admin reviews drafts
/// and creates real questions from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    /// Exactly 4 choices
    pub choices: Vec<String>,
    /// 'a'..'d', an index into `choices`
    pub correct_answer: String,
}

impl GeneratedQuestion {
    /// The choice text the answer letter points at, if well-formed.
    pub fn correct_choice(&self) -> Option<&str> {
        let idx = match self.correct_answer.as_str() {
            "a" => 0,
            "b" => 1,
            "c" => 2,
            "d" => 3,
            _ => return None,
        };
        self.choices.get(idx).map(String::as_str)
    }

    /// 4 choices and a resolvable answer letter.
    pub fn is_well_formed(&self) -> bool {
        self.choices.len() == 4 && self.correct_choice().is_some()
    }
}

#[derive(Deserialize)]
struct QuestionSets {
    question_sets: Vec<GeneratedQuestion>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    /// Generate question drafts. Single call, malformed drafts filtered out.
    pub async fn generate_questions(&self, count: u32) -> Result<Vec<GeneratedQuestion>, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "contents": [{ "parts": [{ "text": format!("Generate {} questions", count) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GeminiApi(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::GeminiApi(format!(
                "generateContent failed ({}): {}",
                status, text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeminiApi(format!("Invalid response body: {}", e)))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| AppError::GeminiApi("Empty response".to_string()))?;

        let sets: QuestionSets = serde_json::from_str(text)
            .map_err(|e| AppError::GeminiApi(format!("Schema violation: {}", e)))?;

        let (questions, dropped): (Vec<_>, Vec<_>) = sets
            .question_sets
            .into_iter()
            .partition(GeneratedQuestion::is_well_formed);

        if !dropped.is_empty() {
            tracing::warn!(count = dropped.len(), "Dropped malformed generated questions");
        }
        tracing::info!(count = questions.len(), "Generated question drafts");

        Ok(questions)
    }
}

/// Strict response schema (OpenAPI subset the Gemini API accepts).
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question_sets": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "choices": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "minItems": 4,
                            "maxItems": 4
                        },
                        "correct_answer": {
                            "type": "STRING",
                            "enum": ["a", "b", "c", "d"]
                        }
                    },
                    "required": ["question", "choices", "correct_answer"]
                }
            }
        },
        "required": ["question_sets"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(correct: &str, choices: &[&str]) -> GeneratedQuestion {
        GeneratedQuestion {
            question: "Which river flows past Hampi?".to_string(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn test_correct_choice_maps_letter_to_index() {
        let q = draft("c", &["Krishna", "Godavari", "Tungabhadra", "Kaveri"]);
        assert_eq!(q.correct_choice(), Some("Tungabhadra"));
        assert!(q.is_well_formed());
    }

    #[test]
    fn test_invalid_letter_rejected() {
        let q = draft("e", &["a", "b", "c", "d"]);
        assert_eq!(q.correct_choice(), None);
        assert!(!q.is_well_formed());
    }

    #[test]
    fn test_wrong_choice_count_rejected() {
        let q = draft("a", &["only", "three", "choices"]);
        assert!(!q.is_well_formed());
    }

    #[test]
    fn test_response_text_parses_into_drafts() {
        let text = r#"{"question_sets":[
            {"question":"Q?","choices":["w","x","y","z"],"correct_answer":"b"}
        ]}"#;
        let sets: QuestionSets = serde_json::from_str(text).unwrap();
        assert_eq!(sets.question_sets.len(), 1);
        assert_eq!(sets.question_sets[0].correct_choice(), Some("x"));
    }
}
