//! The seed conversations every session starts with.

use companion_core::conversation::{ChatRole, ConversationSeed, SeedMessage};

fn message(role: ChatRole, content: &str) -> SeedMessage {
    SeedMessage {
        role,
        content: content.to_owned(),
    }
}

/// Returns the seed conversations, supplied to the session at startup.
pub fn conversations() -> Vec<ConversationSeed> {
    vec![
        ConversationSeed {
            id: "product-launch".to_owned(),
            title: "Product launch prep".to_owned(),
            description: "Line up the key selling points and the event flow"
                .to_owned(),
            timestamp: "09:24".to_owned(),
            pinned: true,
            unread: 2,
            messages: vec![
                message(
                    ChatRole::User,
                    "We plan to ship the new AI features at the end of \
                     November and need help sorting out the highlights.",
                ),
                message(
                    ChatRole::Assistant,
                    "I have collected how similar features are positioned \
                     in the market and listed three differentiators. Which \
                     part would you like to look at first?",
                ),
            ],
        },
        ConversationSeed {
            id: "travel-plan".to_owned(),
            title: "Weekend in Hangzhou".to_owned(),
            description: "A relaxed city stroll".to_owned(),
            timestamp: "08:10".to_owned(),
            pinned: false,
            unread: 0,
            messages: vec![
                message(
                    ChatRole::User,
                    "I want a relaxed two-day, one-night itinerary focused \
                     on food and coffee.",
                ),
                message(
                    ChatRole::Assistant,
                    "Got it. I'll start with five must-visit spots and pair \
                     them with nearby cafes and walking routes. I can add \
                     schedule reminders along the way too.",
                ),
            ],
        },
        ConversationSeed {
            id: "daily-notes".to_owned(),
            title: "Daily report helper".to_owned(),
            description: "Turn scattered thoughts into something shareable"
                .to_owned(),
            timestamp: "yesterday".to_owned(),
            pinned: false,
            unread: 0,
            messages: vec![
                message(
                    ChatRole::User,
                    "Help me turn today's discussion with the engineering \
                     team into a daily report.",
                ),
                message(
                    ChatRole::Assistant,
                    "Sure. I'll draft it in three sections: progress, \
                     risks, and resources.",
                ),
            ],
        },
    ]
}
