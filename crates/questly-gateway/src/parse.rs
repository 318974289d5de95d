//! Model response parsing into typed payloads.
//!
//! Models are asked for bare JSON but do not always comply. Every structured
//! reply goes through the same recovery ladder before giving up:
//! 1. Direct `serde_json` deserialization
//! 2. Extract JSON from a markdown code block
//! 3. Strip trailing commas and retry
//! 4. Code block plus trailing-comma strip

use questly_types::{MasteryChallenge, SuggestedTask};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// Most steps kept from a breakdown.
pub const MAX_SUGGESTIONS: usize = 5;

/// Suggestions arrive either as a bare list or wrapped in an object (JSON
/// mode on some backends refuses top-level arrays).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestionPayload {
    List(Vec<SuggestedTask>),
    Wrapped {
        #[serde(alias = "suggestions", alias = "subtasks")]
        tasks: Vec<SuggestedTask>,
    },
}

/// Parse any JSON payload with the recovery ladder.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, GatewayError> {
    let trimmed = raw.trim();

    // Strategy 1: direct parse
    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Ok(parsed);
    }

    // Strategy 2: extract from markdown code block
    if let Some(json_str) = extract_json_from_codeblock(trimmed)
        && let Ok(parsed) = serde_json::from_str::<T>(json_str)
    {
        return Ok(parsed);
    }

    // Strategy 3: strip trailing commas and retry
    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(parsed) = serde_json::from_str::<T>(&cleaned) {
        return Ok(parsed);
    }

    // Strategy 4: extract from code block then strip commas
    if let Some(json_str) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(json_str);
        if let Ok(parsed) = serde_json::from_str::<T>(&cleaned_inner) {
            return Ok(parsed);
        }
    }

    Err(GatewayError::Parse(format!(
        "all parse strategies failed for: {trimmed}"
    )))
}

/// Parse a task breakdown. Blank titles are dropped and at most
/// [`MAX_SUGGESTIONS`] are kept.
pub fn parse_suggestions(raw: &str) -> Result<Vec<SuggestedTask>, GatewayError> {
    let tasks = match parse_json::<SuggestionPayload>(raw)? {
        SuggestionPayload::List(tasks) | SuggestionPayload::Wrapped { tasks } => tasks,
    };
    Ok(tasks
        .into_iter()
        .filter(|t| !t.title.trim().is_empty())
        .map(|t| SuggestedTask {
            title: t.title.trim().to_owned(),
            description: t.description.trim().to_owned(),
            category: t.category.trim().to_owned(),
        })
        .take(MAX_SUGGESTIONS)
        .collect())
}

/// Parse a mastery challenge. Questions whose answer is not among their
/// options are dropped.
pub fn parse_mastery(raw: &str) -> Result<MasteryChallenge, GatewayError> {
    let mut challenge = parse_json::<MasteryChallenge>(raw)?;
    challenge
        .questions
        .retain(|q| q.options.iter().any(|o| o == &q.correct_answer));
    Ok(challenge)
}

/// Clean a free-text reply: trim whitespace and surrounding quotes.
pub fn parse_text(raw: &str) -> Result<String, GatewayError> {
    let text = raw.trim().trim_matches('"').trim();
    if text.is_empty() {
        return Err(GatewayError::Parse(String::from("empty response")));
    }
    Ok(text.to_owned())
}

/// Extract JSON content from markdown code blocks.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    // Look for ```json ... ``` or ``` ... ```
    let body_start = |tag_at: usize, tag_len: usize| {
        let after_tag = tag_at.checked_add(tag_len).unwrap_or(tag_at);
        text.get(after_tag..)
            .and_then(|s| s.find('\n'))
            .and_then(|nl| after_tag.checked_add(nl))
            .and_then(|pos| pos.checked_add(1))
            .unwrap_or(after_tag)
    };
    let start = text
        .find("```json")
        .map(|i| body_start(i, 7))
        .or_else(|| text.find("```").map(|i| body_start(i, 3)))?;

    let remaining = text.get(start..)?;
    let end = remaining.find("```")?;
    remaining.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets.
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    for (i, c) in chars.iter().enumerate() {
        if *c == ',' {
            let next = chars
                .iter()
                .skip(i.saturating_add(1))
                .find(|n| !n.is_whitespace())
                .copied();
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        result.push(*c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_list() {
        let raw = r#"[{"title": "Read ch. 1", "description": "Skim it", "category": "Study"}]"#;
        let tasks = parse_suggestions(raw).unwrap_or_default();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.first().map(|t| t.title.as_str()), Some("Read ch. 1"));
    }

    #[test]
    fn parses_wrapped_object() {
        let raw = r#"{"tasks": [{"title": "A"}, {"title": "B"}]}"#;
        assert_eq!(parse_suggestions(raw).map(|t| t.len()).ok(), Some(2));
        let raw = r#"{"suggestions": [{"title": "A"}]}"#;
        assert_eq!(parse_suggestions(raw).map(|t| t.len()).ok(), Some(1));
    }

    #[test]
    fn caps_at_five_and_drops_blank_titles() {
        let raw = r#"[{"title": " "}, {"title": "1"}, {"title": "2"}, {"title": "3"},
                      {"title": "4"}, {"title": "5"}, {"title": "6"}]"#;
        let tasks = parse_suggestions(raw).unwrap_or_default();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn recovers_from_code_block_with_trailing_comma() {
        let raw = "Here you go:\n```json\n[{\"title\": \"Plan\", \"category\": \"Other\",},]\n```";
        let tasks = parse_suggestions(raw).unwrap_or_default();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_suggestions("I cannot help with that."),
            Err(GatewayError::Parse(_))
        ));
    }

    #[test]
    fn mastery_drops_questions_with_foreign_answer() {
        let raw = r#"{
            "questions": [
                {"id": "1", "question": "Q1", "options": ["a", "b"], "correctAnswer": "b", "explanation": ""},
                {"id": "2", "question": "Q2", "options": ["a", "b"], "correctAnswer": "c", "explanation": ""}
            ],
            "nextQuest": {"title": "Next", "description": "More", "category": "Study"}
        }"#;
        let challenge = parse_mastery(raw);
        assert_eq!(challenge.as_ref().map(|c| c.questions.len()).ok(), Some(1));
        assert_eq!(
            challenge.map(|c| c.next_quest.title).ok().as_deref(),
            Some("Next")
        );
    }

    #[test]
    fn text_is_trimmed_and_unquoted() {
        assert_eq!(
            parse_text("  \"Small steps compound.\"\n").ok().as_deref(),
            Some("Small steps compound.")
        );
        assert!(parse_text("   ").is_err());
    }

    #[test]
    fn strip_trailing_commas_basic() {
        assert_eq!(strip_trailing_commas(r#"{"a": 1, "b": 2,}"#), r#"{"a": 1, "b": 2}"#);
        assert_eq!(strip_trailing_commas("[1, 2, 3,\n]"), "[1, 2, 3\n]");
    }

    #[test]
    fn extract_plain_code_block() {
        let text = "```\n{\"x\": 1}\n```";
        assert_eq!(extract_json_from_codeblock(text), Some("{\"x\": 1}"));
        assert_eq!(extract_json_from_codeblock("no fences"), None);
    }
}
