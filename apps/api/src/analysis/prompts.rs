// Resume analysis prompt templates.
// The system prompt is only the default; operators may replace it via
// ANALYSIS_SYSTEM_PROMPT_FILE.

use crate::analysis::models::AnalysisRequest;
use crate::llm_client::ChatMessage;

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert career advisor and resume analyzer. Analyze the provided resume and LinkedIn profile to:
1. Calculate an ATS (Applicant Tracking System) score (0-100) based on formatting, keywords, and structure
2. Identify key skills and categorize them by proficiency level (Beginner, Intermediate, Advanced, Expert)
3. Recommend 5 best-fit job titles based on the candidate's experience
4. Identify skill gaps for target roles
5. Generate a personalized learning roadmap with specific resources

Respond ONLY with valid JSON in this exact format:
{
  "atsScore": number,
  "skills": [{"name": string, "level": string, "yearsExperience": number}],
  "jobRecommendations": [{"title": string, "matchScore": number, "requiredSkills": string[], "company": string, "location": string}],
  "skillGaps": [{"skill": string, "currentLevel": string, "targetLevel": string, "priority": string}],
  "learningPath": [{"skill": string, "resources": [{"title": string, "url": string, "type": string}], "estimatedHours": number, "priority": string}]
}

RULES:
1. atsScore and matchScore are whole numbers between 0 and 100
2. level is exactly one of: Beginner, Intermediate, Advanced, Expert
3. yearsExperience and estimatedHours are never negative
4. Return ONLY the JSON object. No code fences, no commentary."#;

/// Marker substituted when the caller sent no profile text.
pub const PROFILE_NOT_PROVIDED: &str = "Not provided";

/// Renders the user message for a request.
pub fn build_user_prompt(request: &AnalysisRequest) -> String {
    format!(
        "Resume:\n{}\n\nLinkedIn Profile:\n{}",
        request.resume_text,
        request.profile().unwrap_or(PROFILE_NOT_PROVIDED)
    )
}

/// The two messages sent per analysis: system instruction, then user content.
pub fn build_messages(system_prompt: &str, request: &AnalysisRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(build_user_prompt(request)),
    ]
}
