// Analysis prompt template.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following conversation and extract insights about the user's interests and potential. Your tasks are:

Identify 5 relevant skill categories based on the conversation (e.g., tech, creativity, business, research, communication, etc.). You may define any 5 custom skill names that are most applicable to the user's context.

Score each skill as an integer from 0 to 10 (do not use /10 or any extra text).

Suggest 3 career paths based on the conversation:

career1: the most suitable career.

career2: a closely related alternate career.

career3: another alternate career in the same domain.

Include a brief description for each career.

Return the result strictly in the following JSON format:

{
  "chatId": "{chat_id}",
  "timestamp": "{timestamp}",
  "analysis": {
    "skills": {
      "skill_1": x,
      "skill_2": x,
      "skill_3": x,
      "skill_4": x,
      "skill_5": x
    },
    "career1": {
      "title": "Career Title Here",
      "description": "Brief description of the career1"
    },
    "career2": {
      "title": "Career Title Here",
      "description": "Brief description of the career2"
    },
    "career3": {
      "title": "Career Title Here",
      "description": "Brief description of the career3"
    }
  }
}

Rules:

Use exactly 5 skill categories relevant to the conversation.

Skill values must be plain integers (e.g., "tech": 8), not strings, and must not exceed 10.

Each career must include a title and a description.

chatId and timestamp should be string fields.

{json_instruction}

Conversation to analyze:
{conversation}"#;

/// Fills the template. The conversation goes in last so its text is never re-scanned.
pub fn build_analysis_prompt(chat_id: &str, timestamp: &str, conversation: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{chat_id}", chat_id)
        .replace("{timestamp}", timestamp)
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{conversation}", conversation)
}
