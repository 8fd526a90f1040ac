//! Derived lifecycle state of a puzzle channel.

use crate::dao::chat::{CategoryInfo, TextChannelInfo};
use crate::services::naming::has_name_prefix;

/// Lifecycle state read off a channel's topic and parent category.
///
/// Nothing is stored: classification happens against a fresh snapshot every
/// time a channel-scoped command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleState {
    /// The channel does not belong to a puzzle (no topic, or no channel).
    Unknown,
    /// The channel sits in a round or puzzles category.
    Active {
        /// Puzzle title, taken from the channel topic.
        title: String,
    },
    /// The channel sits in a Solved-prefixed category.
    Solved {
        /// Puzzle title, taken from the channel topic.
        title: String,
    },
}

impl PuzzleState {
    /// Classify a channel by its topic and parent category.
    pub fn classify(
        channel: Option<&TextChannelInfo>,
        categories: &[CategoryInfo],
        solved_prefix: &str,
    ) -> Self {
        let Some(channel) = channel else {
            return PuzzleState::Unknown;
        };
        let Some(topic) = channel.topic.as_deref() else {
            return PuzzleState::Unknown;
        };
        let title = topic.trim().to_string();
        if title.is_empty() {
            return PuzzleState::Unknown;
        }

        let parent = channel
            .parent_id
            .and_then(|id| categories.iter().find(|category| category.id == id));
        match parent {
            Some(category) if has_name_prefix(&category.name, solved_prefix) => {
                PuzzleState::Solved { title }
            }
            _ => PuzzleState::Active { title },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<CategoryInfo> {
        vec![
            CategoryInfo {
                id: 1,
                name: "Puzzles".into(),
            },
            CategoryInfo {
                id: 2,
                name: "Solved".into(),
            },
        ]
    }

    fn channel(topic: Option<&str>, parent: Option<u64>) -> TextChannelInfo {
        TextChannelInfo {
            id: 99,
            name: "some-channel".into(),
            topic: topic.map(Into::into),
            parent_id: parent,
        }
    }

    #[test]
    fn channel_in_a_puzzle_category_is_active() {
        let state = PuzzleState::classify(
            Some(&channel(Some("Crossword 1"), Some(1))),
            &categories(),
            "Solved",
        );
        assert_eq!(
            state,
            PuzzleState::Active {
                title: "Crossword 1".into()
            }
        );
    }

    #[test]
    fn channel_in_the_solved_chain_is_solved() {
        let state = PuzzleState::classify(
            Some(&channel(Some("Crossword 1"), Some(2))),
            &categories(),
            "Solved",
        );
        assert_eq!(
            state,
            PuzzleState::Solved {
                title: "Crossword 1".into()
            }
        );
    }

    #[test]
    fn topicless_or_missing_channels_are_unknown() {
        assert_eq!(
            PuzzleState::classify(Some(&channel(None, Some(1))), &categories(), "Solved"),
            PuzzleState::Unknown
        );
        assert_eq!(
            PuzzleState::classify(None, &categories(), "Solved"),
            PuzzleState::Unknown
        );
        assert_eq!(
            PuzzleState::classify(Some(&channel(Some("   "), Some(1))), &categories(), "Solved"),
            PuzzleState::Unknown
        );
    }

    #[test]
    fn topic_whitespace_is_trimmed() {
        let state = PuzzleState::classify(
            Some(&channel(Some("  Crossword 1  "), None)),
            &categories(),
            "Solved",
        );
        assert_eq!(
            state,
            PuzzleState::Active {
                title: "Crossword 1".into()
            }
        );
    }
}
