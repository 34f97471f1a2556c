//! Prompt templates sent to the AI service.

use chess_core::MoveRecord;

use crate::models::KeyMoment;

pub const ANALYSIS_SYSTEM: &str =
    "You are a chess grandmaster. You must respond with valid JSON only, no other text or formatting.";

pub const COACH_PERSONA: &str = "You are an experienced chess coach and grandmaster. \
Provide clear, constructive advice and explain concepts in an easy-to-understand way. \
Focus on helping players improve their game through strategic understanding and tactical awareness.";

pub const VOICE_COACH_PERSONA: &str = "You are an experienced chess coach and grandmaster. \
You have just analyzed a game, and now you're providing voice coaching. \
Keep your responses clear, concise, and focused on the most important points. \
Reference specific moves and positions from the game analysis when relevant.";

pub const FORMATTING_GUIDE: &str = "Format your responses using markdown:

1. Use '### Analysis' for position or question analysis
2. Use '### Key Points' for main takeaways
3. Use '### Strategy' for long-term plans
4. Use '### Tactics' for immediate opportunities
5. Use '### Suggestions' for concrete moves or ideas
6. Use '### Evaluation' for position assessment

Use numbered lists (1., 2., etc.) for sequential points.
Use **bold** for emphasis on important terms.
Keep paragraphs focused and well-structured.";

pub const STRUCTURE_SYSTEM: &str = "You are a JSON formatter. Format the chess coaching advice into a \
valid JSON object with the exact structure specified. Ensure all strings are properly escaped.";

pub const HEALTH_SYSTEM: &str = "You are a chess analyzer.";
pub const HEALTH_PROBE: &str = "Say 'OK' if you can hear me.";

/// System preamble for a coaching conversation: persona followed by formatting rules.
pub fn coaching_preamble(persona: &str) -> String {
    format!("{persona}\n\n{FORMATTING_GUIDE}")
}

/// User prompt asking for a JSON game analysis of `moves`.
pub fn analysis_prompt(moves: &[MoveRecord]) -> String {
    let moves_text = moves
        .iter()
        .map(MoveRecord::full_move)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a chess analysis engine. Analyze the following chess game and provide your analysis in JSON format.
IMPORTANT: Respond with ONLY valid JSON - no markdown, no code blocks, no additional text.

Required JSON structure:
{{
    "summary": "Brief overall game summary",
    "key_moments": [
        {{
            "move_number": number,
            "move": "move in algebraic notation",
            "analysis": "Analysis of the move",
            "evaluation": "Evaluation symbol (e.g., +=, =, -/+)"
        }}
    ]
}}

Game moves to analyze:
{moves_text}

Remember: Return ONLY the JSON object, nothing else."#
    )
}

pub fn game_context_message(game_context: &str) -> String {
    format!("Here's the game we're discussing:\n{game_context}")
}

/// Seeds a voice coaching turn with the finished analysis and the transcribed question.
pub fn voice_question(summary: &str, key_moments: &[KeyMoment], question: &str) -> String {
    let moments = serde_json::to_string_pretty(key_moments).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Game Summary: {summary}\n\nKey Moments:\n{moments}\n\nPlayer Question/Comment: {question}"
    )
}

/// Asks the AI to convert free-text coaching into the structured reply shape.
pub fn structure_prompt(coaching_text: &str) -> String {
    format!(
        r#"Convert the following coaching advice into a JSON object with this exact structure:
{{
    "text_response": "Main coaching response with markdown formatting",
    "suggestions": ["Suggestion 1", "Suggestion 2", "Suggestion 3"],
    "next_steps": ["Action 1", "Action 2"],
    "evaluation": "Brief evaluation"
}}

Original coaching content:
{coaching_text}"#
    )
}
