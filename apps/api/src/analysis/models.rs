use serde::{Deserialize, Serialize};

/// Inbound analysis request. Wire names follow the client's camelCase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub linkedin_profile: Option<String>,
}

impl AnalysisRequest {
    pub fn new(resume_text: impl Into<String>, linkedin_profile: Option<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            linkedin_profile,
        }
    }

    /// The profile text as sent, or `None` when absent or blank.
    pub fn profile(&self) -> Option<&str> {
        self.linkedin_profile
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Proficiency level the model assigns to each detected skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    #[serde(alias = "beginner", alias = "BEGINNER")]
    Beginner,
    #[serde(alias = "intermediate", alias = "INTERMEDIATE")]
    Intermediate,
    #[serde(alias = "advanced", alias = "ADVANCED")]
    Advanced,
    #[serde(alias = "expert", alias = "EXPERT")]
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    pub level: SkillLevel,
    pub years_experience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendation {
    pub title: String,
    pub match_score: i64, // 0 – 100
    pub required_skills: Vec<String>,
    pub company: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub skill: String,
    pub current_level: String,
    pub target_level: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    /// "course" | "book" | "video" | ..., free text from the model.
    #[serde(rename = "type")]
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStep {
    pub skill: String,
    pub resources: Vec<LearningResource>,
    pub estimated_hours: f64,
    pub priority: String,
}

/// The full analysis returned to callers. Only ever constructed from a reply
/// that passed `validation::validate_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ats_score: i64, // 0 – 100
    pub skills: Vec<Skill>,
    pub job_recommendations: Vec<JobRecommendation>,
    pub skill_gaps: Vec<SkillGap>,
    pub learning_path: Vec<LearningStep>,
}
