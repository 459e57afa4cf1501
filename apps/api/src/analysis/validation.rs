use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::models::AnalysisResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

const SCORE_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

/// Maps a parsed model reply onto `AnalysisResult` and checks every range.
///
/// Shape failures (missing field, wrong type, unknown skill level) return a
/// single issue. Range failures are collected so the caller sees all of them.
/// Values are never clamped: a reply either passes untouched or is rejected.
pub fn validate_analysis(value: Value) -> Result<AnalysisResult, Vec<ValidationIssue>> {
    let result: AnalysisResult = serde_json::from_value(value)
        .map_err(|e| vec![ValidationIssue::new("$", format!("does not match schema: {e}"))])?;

    let mut issues = Vec::new();

    if !SCORE_RANGE.contains(&result.ats_score) {
        issues.push(ValidationIssue::new(
            "atsScore",
            format!("{} is outside 0-100", result.ats_score),
        ));
    }

    for (i, skill) in result.skills.iter().enumerate() {
        check_non_negative(
            &mut issues,
            format!("skills[{i}].yearsExperience"),
            skill.years_experience,
        );
    }

    for (i, job) in result.job_recommendations.iter().enumerate() {
        if !SCORE_RANGE.contains(&job.match_score) {
            issues.push(ValidationIssue::new(
                format!("jobRecommendations[{i}].matchScore"),
                format!("{} is outside 0-100", job.match_score),
            ));
        }
    }

    for (i, step) in result.learning_path.iter().enumerate() {
        check_non_negative(
            &mut issues,
            format!("learningPath[{i}].estimatedHours"),
            step.estimated_hours,
        );
    }

    if issues.is_empty() {
        Ok(result)
    } else {
        Err(issues)
    }
}

fn check_non_negative(issues: &mut Vec<ValidationIssue>, field: String, value: f64) {
    if !value.is_finite() {
        issues.push(ValidationIssue::new(field, "must be a finite number >= 0"));
    } else if value < 0.0 {
        issues.push(ValidationIssue::new(field, format!("{value} is negative")));
    }
}
