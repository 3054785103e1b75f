//! Fixed prompt text sent to the provider.

/// Instruction that frames every request.
pub const SYSTEM_PROMPT: &str = "You are an expert aviation instructor. Explain any Air Traffic \
Control (ATC) or pilot phrase in simple, clear, and beginner-friendly English. Be concise and \
focus on the meaning relevant to flight operations.";

/// Returned in place of an empty model answer.
pub const FALLBACK_EXPLANATION: &str = "No explanation found.";

/// A system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn for_phrase(phrase: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: phrase.to_string(),
        }
    }
}
