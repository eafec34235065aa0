pub const DIAGNOSIS_INSTRUCTION: &str = "Analyze this plant leaf. Identify the disease if present, the confidence level, causes, and recommended treatments. Format the response with clear headings.";

pub const DIAGNOSIS_EMPTY_FALLBACK: &str = "Could not analyze the image. Please try again.";
pub const DIAGNOSIS_FAILURE_FALLBACK: &str =
    "Error analyzing image. Please ensure your API key is valid.";

pub const ADVISORY_EMPTY_FALLBACK: &str = "I couldn't generate an answer.";
pub const ADVISORY_FAILURE_FALLBACK: &str = "Service unavailable.";

pub fn advisory_prompt(question: &str, language: &str) -> String {
    format!(
        "You are an expert agricultural advisor. The user asks: \"{question}\". Answer in {language} language concisely and helpfully."
    )
}

#[cfg(test)]
mod tests {
    use super::advisory_prompt;

    #[test]
    fn advisory_prompt_interpolates_question_and_language() {
        assert_eq!(
            advisory_prompt("Best fertilizer for rice?", "Hindi"),
            "You are an expert agricultural advisor. The user asks: \"Best fertilizer for rice?\". Answer in Hindi language concisely and helpfully."
        );
    }
}
