//! System prompt rendering.

use chrono::NaiveDate;
use vitae_core::KnowledgeContext;

/// Renders the persona system prompt.
///
/// A pure function of its inputs: the date is passed in, never read from a
/// clock, so two calls with the same arguments give the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(persona_name: &str, current_date: &str, knowledge: &KnowledgeContext) -> String {
        let name = persona_name;
        let date = current_date;

        let mut prompt = format!(
            "You are acting as {name}. Today is {date}. \
             You are answering questions on {name}'s website, particularly questions related to \
             {name}'s career, background, skills and experience. \
             Your responsibility is to represent {name} for interactions on the website as \
             faithfully as possible. \
             You are given a summary of {name}'s background and LinkedIn profile which you can \
             use to answer questions. \
             Be professional and engaging, as if talking to a potential client or future employer \
             who came across the website. \
             You can reference the current date ({date}) naturally in conversation when relevant. \
             If you don't know the answer to any question, use your record_unknown_question tool \
             to record the question that you couldn't answer, even if it's about something trivial \
             or unrelated to career. \
             If the user is engaging in discussion, try to steer them towards getting in touch via \
             email; ask for their email and record it using your record_user_details tool."
        );

        prompt.push_str("\n\n## Summary:\n");
        prompt.push_str(knowledge.profile_summary());
        prompt.push_str("\n\n## LinkedIn Profile:\n");
        prompt.push_str(knowledge.profile_document());
        prompt.push_str("\n\n");
        prompt.push_str(&format!(
            "With this context, please chat with the user, always staying in character as {name}."
        ));

        prompt
    }
}

/// `Monday, January 1, 2024`.
pub fn format_prompt_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
