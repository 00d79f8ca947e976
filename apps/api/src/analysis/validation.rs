//! Parses and validates raw analysis output from the provider.
//!
//! PASS conditions:
//! - Body is JSON (code fences tolerated), either `{ "analysis": {...} }` or the bare analysis
//! - `skills` holds exactly 5 entries, each a plain integer in 0..=10
//! - `career1`..`career3` each have a non-empty `title` and `description`
//!
//! Every problem is reported, not just the first.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::llm_client::strip_json_fences;
use crate::models::analysis::{AnalysisPayload, Career};

pub const SKILL_COUNT: usize = 5;
pub const MAX_SKILL_SCORE: u64 = 10;
const CAREER_KEYS: [&str; 3] = ["career1", "career2", "career3"];

pub fn parse_analysis(raw: &str) -> Result<AnalysisPayload, Vec<String>> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))
        .map_err(|e| vec![format!("response is not valid JSON: {e}")])?;

    let root = value
        .as_object()
        .ok_or_else(|| vec!["response is not a JSON object".to_string()])?;
    let analysis = match root.get("analysis") {
        Some(Value::Object(inner)) => inner,
        Some(_) => return Err(vec!["'analysis' is not an object".to_string()]),
        None => root,
    };

    let mut problems = Vec::new();
    let skills = validate_skills(analysis.get("skills"), &mut problems);
    let careers: Vec<Option<Career>> = CAREER_KEYS
        .iter()
        .map(|key| validate_career(key, analysis.get(*key), &mut problems))
        .collect();

    if !problems.is_empty() {
        return Err(problems);
    }

    match (skills, &careers[..]) {
        (Some(skills), [Some(c1), Some(c2), Some(c3)]) => Ok(AnalysisPayload {
            skills,
            career1: c1.clone(),
            career2: c2.clone(),
            career3: c3.clone(),
        }),
        _ => Err(vec!["analysis is incomplete".to_string()]),
    }
}

fn validate_skills(value: Option<&Value>, problems: &mut Vec<String>) -> Option<BTreeMap<String, u8>> {
    let Some(map) = value.and_then(Value::as_object) else {
        problems.push("'skills' must be an object of skill name to score".to_string());
        return None;
    };

    if map.len() != SKILL_COUNT {
        problems.push(format!(
            "expected exactly {SKILL_COUNT} skills, found {}",
            map.len()
        ));
    }

    let before = problems.len();
    let mut skills = BTreeMap::new();
    for (name, score) in map {
        if name.trim().is_empty() {
            problems.push("skill names must not be empty".to_string());
            continue;
        }
        match score.as_u64() {
            Some(n) if n <= MAX_SKILL_SCORE => {
                skills.insert(name.clone(), n as u8);
            }
            _ => problems.push(format!(
                "skill '{name}' must be an integer between 0 and {MAX_SKILL_SCORE}, got {score}"
            )),
        }
    }

    (problems.len() == before && map.len() == SKILL_COUNT).then_some(skills)
}

fn validate_career(key: &str, value: Option<&Value>, problems: &mut Vec<String>) -> Option<Career> {
    let Some(obj) = value.and_then(Value::as_object) else {
        problems.push(format!("'{key}' must be an object with title and description"));
        return None;
    };

    let title = required_text(obj, key, "title", problems);
    let description = required_text(obj, key, "description", problems);
    Some(Career {
        title: title?,
        description: description?,
    })
}

fn required_text(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match obj.get(field).and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => {
            problems.push(format!("'{key}.{field}' must be a non-empty string"));
            None
        }
    }
}
