//! Prompts for section and reference generation.
//!
//! Every prompt lives here so the markup contract between the generator and
//! the normaliser/classifier is visible in one place: numbered headings as
//! `**C.S Title**`, subheadings as `**Title**`, bullets starting with `•`
//! and `**Key Term:**` labels. Changing that contract means changing
//! [`crate::pipeline::normalize`] and [`crate::pipeline::classify`] too.

use crate::pipeline::llm::SectionRequest;

/// Default system prompt for section calls.
pub const SECTION_SYSTEM_PROMPT: &str = "Generate detailed academic content for a technical \
project report section. Maintain consistent formatting and technical depth.";

/// System prompt for the references call.
pub const REFERENCES_SYSTEM_PROMPT: &str = "Generate academic references in IEEE format. \
Start directly with the numbered references. Do not include any introductory text.";

/// Build the user prompt for one section.
pub fn section_prompt(request: &SectionRequest) -> String {
    let key = request.key;
    format!(
        r#"Generate section {key} ({section_title}) for "{title}".
Structure the content as follows:
• Use only two-level section numbering ({key})
• Use exactly two asterisks (**) for bold text, not four asterisks (****)
• Format headings as: **{key} Title**
• Format subheadings as: **Subheading Title**
• For bullet points:
  - Start with •
  - Use **Key Term:** for emphasized terms
• Example format:
  **1.1 Overview**
  [Introduction paragraph]

  **System Architecture**
  • **Database:** Description...
  • **Network:** Description...

Target length: {words} words.
Previous context: {context}"#,
        section_title = request.section_title,
        title = request.report_title,
        words = request.target_words,
        context = request.context,
    )
}

/// Build the user prompt for the references list.
pub fn references_prompt(title: &str) -> String {
    format!(
        r#"Generate 15-20 relevant academic references for a project report about "{title}".
Requirements:
1. Use IEEE citation format
2. Include recent papers (last 5-10 years)
3. Focus on reputable journals and conferences
4. Mix of foundational and recent works
5. Ensure relevance to {title}
6. Do not include any introductory text
7. Start directly with numbered references
8. Each reference should be on a new line
9. Format exactly like this:
   [1] A. Author, B. Author and C. Author, "Title of paper," Name of Journal, vol. x, no. x, pp. xxx-xxx, Month Year."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SectionKey;

    #[test]
    fn section_prompt_carries_key_target_and_context() {
        let request = SectionRequest {
            report_title: "Smart Irrigation System".into(),
            key: SectionKey::new(1, 1),
            section_title: "Timeline".into(),
            target_words: 112,
            context: "previous tail".into(),
        };
        let prompt = section_prompt(&request);
        assert!(prompt.contains("Generate section 1.1 (Timeline) for \"Smart Irrigation System\""));
        assert!(prompt.contains("**1.1 Title**"));
        assert!(prompt.contains("Target length: 112 words."));
        assert!(prompt.ends_with("Previous context: previous tail"));
    }

    #[test]
    fn references_prompt_names_topic() {
        let prompt = references_prompt("Smart Irrigation System");
        assert!(prompt.contains("about \"Smart Irrigation System\""));
        assert!(prompt.contains("IEEE"));
    }
}
