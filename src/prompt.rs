//! Prompt construction for cover letter generation
//!
//! Request values are embedded verbatim; nothing is escaped or trimmed.

/// Fixed system message sent with every generation
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates cover letters based on resume and job description.";

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_LENGTH: &str = "medium";

/// Validated inputs of a single generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterBrief {
    resume_text: String,
    vacancy_description: String,
    tone: String,
    language: String,
    length: String,
}

impl CoverLetterBrief {
    /// Build a brief; absent style options take their defaults
    pub fn new(
        resume_text: String,
        vacancy_description: String,
        tone: Option<String>,
        language: Option<String>,
        length: Option<String>,
    ) -> Self {
        Self {
            resume_text,
            vacancy_description,
            tone: tone.unwrap_or_else(|| DEFAULT_TONE.to_string()),
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            length: length.unwrap_or_else(|| DEFAULT_LENGTH.to_string()),
        }
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn vacancy_description(&self) -> &str {
        &self.vacancy_description
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn length(&self) -> &str {
        &self.length
    }

    /// User message carrying the style options, resume and job description
    pub fn user_prompt(&self) -> String {
        format!(
            "Generate a {} cover letter in {} that is {} length based on the following resume and job description:\n\nResume: {}\n\nJob Description: {}",
            self.tone, self.language, self.length, self.resume_text, self.vacancy_description
        )
    }
}
