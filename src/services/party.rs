//! Party-size badge derived from the start-of-event size and the solved
//! puzzle count.

use crate::dao::chat::{ChatResult, TextChannelInfo};
use crate::services::directory::{ChannelDirectory, solved_category_chain, text_channels_in};

/// Name prefix identifying the sentinel badge channel.
const PARTY_CHANNEL_PREFIX: &str = "party-of";

/// Maintains the `party-of-N` sentinel channel.
///
/// The count is the start-of-event party size minus every solved text
/// channel, summed across the whole Solved category chain so overflow
/// categories keep counting.
pub struct PartyCounter {
    directory: ChannelDirectory,
    solved_prefix: String,
    start_party_size: i64,
}

impl PartyCounter {
    /// Count against the given Solved prefix and starting size.
    pub fn new(
        directory: ChannelDirectory,
        solved_prefix: impl Into<String>,
        start_party_size: i64,
    ) -> Self {
        Self {
            directory,
            solved_prefix: solved_prefix.into(),
            start_party_size,
        }
    }

    /// Solved text channels summed across the Solved category chain.
    pub async fn solved_total(&self) -> ChatResult<usize> {
        let snapshot = self.directory.snapshot().await?;
        let total = solved_category_chain(&snapshot, &self.solved_prefix)
            .iter()
            .map(|category| text_channels_in(&snapshot, category.id))
            .sum();
        Ok(total)
    }

    /// Current party size.
    pub async fn party_count(&self) -> ChatResult<i64> {
        let solved = self.solved_total().await? as i64;
        Ok(self.start_party_size - solved)
    }

    /// Refresh the sentinel channel name without posting anything.
    pub async fn update_silently(&self) -> ChatResult<i64> {
        let count = self.party_count().await?;
        if let Some(channel) = self.party_channel().await? {
            self.directory
                .rename_channel(channel.id, &party_channel_name(count))
                .await?;
        }
        Ok(count)
    }

    /// Refresh the sentinel channel and post the reason with the new count.
    pub async fn announce(&self, reason: &str) -> ChatResult<i64> {
        let count = self.update_silently().await?;
        if let Some(channel) = self.party_channel().await? {
            let message = format!("{reason}\nWe're now a party of {count}.");
            self.directory.send_message(channel.id, &message).await?;
        }
        Ok(count)
    }

    async fn party_channel(&self) -> ChatResult<Option<TextChannelInfo>> {
        let snapshot = self.directory.snapshot().await?;
        Ok(snapshot
            .text_channels
            .into_iter()
            .find(|channel| channel.name.starts_with(PARTY_CHANNEL_PREFIX)))
    }
}

/// Channel names cannot carry a `-` sign character, so negative counts spell
/// the sign out: `party-of-minus-3`.
fn party_channel_name(count: i64) -> String {
    if count < 0 {
        format!("{PARTY_CHANNEL_PREFIX}-minus-{}", -count)
    } else {
        format!("{PARTY_CHANNEL_PREFIX}-{count}")
    }
}
