//! Persona and canned messages for the Hermes assistant
//!
//! The system prompt and its acknowledgment form the two seed turns the
//! server prepends to every chat-completion request. The canned texts cover
//! first contact, voice-service fallback, and chat-service degradation.

use hermes_protocol::Turn;

/// System persona instruction sent as the first seed turn
pub const SYSTEM_PROMPT: &str = r#"You are Hermes, Ashtone Onyango's professional AI assistant. You represent him warmly and professionally.

## About Ashtone:
- Senior AI Software Engineer with 5+ years experience
- Co-Founder & AI Solutions Architect at Wan AI Labs
- Expert in Agentic AI, LLMs, and production AI systems
- Built AI solutions for 11+ clients (healthcare, real estate, fintech)
- Key projects: Rightsify Hydra (3M+ users), MarketReady.ai, TenderAI
- Contact: ashtone@wanailabs.org

## Communication Guidelines:
- Keep responses brief (2-3 sentences max)
- Be contextually aware - don't repeat questions already answered
- If the user said who they are (recruiter, client, developer), remember it
- For questions outside portfolio scope, politely redirect to direct contact
- Don't hallucinate or exaggerate - stick to facts about Ashtone

## Out of Scope Handling:
When asked about things not in the portfolio, recommend reaching out directly:
"Feel free to reach out to Ashtone directly at ashtone@wanailabs.org. He'd be happy to discuss how his AI expertise can help with your specific needs!"

Remember: You're having a natural conversation that should lead to meaningful connections!"#;

/// Acknowledgment sent as the second seed turn
pub const SEED_ACK: &str = "I understand. I am Hermes, Ashtone's AI assistant. I'll maintain conversation context, avoid repetitive questions, provide helpful information about his work, and end conversations professionally with clear next steps. How can I assist you today?";

/// First-contact message returned by the voice endpoint when `intro` is set
pub const INTRO_MESSAGE: &str = "Hi! I'm Hermes, Ashtone's AI assistant. Great to meet you! 😊\n\nAre you a recruiter, potential client, or maybe a fellow developer? I'd love to help you learn about Ashtone's work in the best way for your needs!";

/// Synthetic transcript paired with the intro message
pub const INTRO_TRANSCRIPT: &str = "Hello, I'd like to learn about Ashtone";

/// Message returned when the speech service is judged unavailable
pub const FALLBACK_MESSAGE: &str = "Hey there! Having some voice issues right now, but I'm still here to help! 🎤\n\nJust switch to text mode and we can keep chatting. What brings you to Ashtone's portfolio today?";

/// Synthetic transcript paired with the fallback message
pub const FALLBACK_TRANSCRIPT: &str = "Voice service unavailable - switching to text mode";

/// Substitute reply when the chat-completion service fails or answers empty
pub const DEGRADED_MESSAGE: &str = "I apologize, but I'm having trouble processing your request right now. Please try asking again, or feel free to contact Ashtone directly at ashtone@wanailabs.org for immediate assistance.";

/// The two seed turns: persona instruction and its acknowledgment
pub fn seed_turns() -> [Turn; 2] {
    [Turn::user(SYSTEM_PROMPT), Turn::model(SEED_ACK)]
}

/// Build the full turn sequence for a chat-completion call
///
/// Seed turns first, then the supplied history in order, then the new user
/// turn. If the client echoed the seed turns at the head of its history
/// they are dropped rather than duplicated.
pub fn compose_turns(history: &[Turn], user_text: &str) -> Vec<Turn> {
    let history = strip_seed_echo(history);

    let mut turns = Vec::with_capacity(history.len() + 3);
    turns.extend(seed_turns());
    turns.extend_from_slice(history);
    turns.push(Turn::user(user_text));
    turns
}

/// Drop a leading client echo of the seed turns, if present
fn strip_seed_echo(history: &[Turn]) -> &[Turn] {
    if history
        .first()
        .is_some_and(|turn| turn.text() == SYSTEM_PROMPT)
    {
        let skip = if history.get(1).is_some_and(|turn| turn.text() == SEED_ACK) {
            2
        } else {
            1
        };
        &history[skip..]
    } else {
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_protocol::TurnRole;

    #[test]
    fn test_seed_turns_shape() {
        let [persona, ack] = seed_turns();
        assert_eq!(persona.role, TurnRole::User);
        assert!(persona.text().contains("Hermes"));
        assert_eq!(ack.role, TurnRole::Model);
        assert_eq!(ack.text(), SEED_ACK);
    }

    #[test]
    fn test_compose_orders_history_before_new_turn() {
        let history = vec![Turn::user("earlier question"), Turn::model("earlier answer")];
        let turns = compose_turns(&history, "new question");

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[2].text(), "earlier question");
        assert_eq!(turns[3].text(), "earlier answer");
        assert_eq!(turns[4].text(), "new question");
        assert_eq!(turns[4].role, TurnRole::User);
    }

    #[test]
    fn test_compose_empty_history() {
        let turns = compose_turns(&[], "hello");
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text(), SYSTEM_PROMPT);
        assert_eq!(turns[2].text(), "hello");
    }

    #[test]
    fn test_seed_echo_not_duplicated() {
        let mut history = vec![Turn::user(SYSTEM_PROMPT), Turn::model(SEED_ACK)];
        history.push(Turn::user("real question"));

        let turns = compose_turns(&history, "next");
        let persona_count = turns
            .iter()
            .filter(|t| t.text() == SYSTEM_PROMPT)
            .count();
        assert_eq!(persona_count, 1);
        assert_eq!(turns[2].text(), "real question");
    }
}
