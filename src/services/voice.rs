//! Voice room lifecycle: paired creation, occupancy-guarded removal, the
//! deferred-removal queue, and the idle sweep.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::info;

use crate::dao::chat::{ChatResult, VoiceChannelInfo, VoiceStateEvent};
use crate::services::directory::ChannelDirectory;

/// Outcome of toggling the voice room paired to a puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceToggle {
    /// No room existed; one was created.
    Created,
    /// An empty room existed; it was deleted.
    Removed,
    /// The room is occupied and was left in place.
    RetainedBusy,
}

/// Outcome of a removal attempt on a puzzle's voice room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRemoval {
    /// The room was empty and has been deleted.
    Removed,
    /// The room is occupied; deletion was queued for when it empties.
    Deferred,
    /// The room is occupied and was left in place without queueing.
    RetainedBusy,
    /// No room with that name exists.
    Absent,
}

/// Creates and removes the voice rooms paired to puzzles.
///
/// A room with members in it is never deleted by any path here; removal is
/// queued in the pending set and completed by [`Self::on_voice_state`] once
/// the last member leaves, or swept later.
pub struct VoiceChannelManager {
    directory: ChannelDirectory,
    voice_category: String,
    pending: Mutex<HashSet<String>>,
}

impl VoiceChannelManager {
    /// Manage voice rooms under the named category.
    pub fn new(directory: ChannelDirectory, voice_category: impl Into<String>) -> Self {
        Self {
            directory,
            voice_category: voice_category.into(),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Find or create the room paired to a puzzle.
    pub async fn ensure_room(&self, title: &str) -> ChatResult<VoiceChannelInfo> {
        if let Some(existing) = self.directory.voice_channel_by_name(title).await? {
            return Ok(existing);
        }
        let category = self
            .directory
            .find_or_create_category(&self.voice_category)
            .await?;
        self.directory.create_voice_channel(title, category.id).await
    }

    /// Create the room when absent, delete it when empty, retain it when
    /// occupied.
    pub async fn toggle(&self, title: &str) -> ChatResult<VoiceToggle> {
        match self.directory.voice_channel_by_name(title).await? {
            None => {
                self.ensure_room(title).await?;
                Ok(VoiceToggle::Created)
            }
            Some(room) if room.occupants == 0 => {
                self.directory.delete_channel(room.id).await?;
                self.pending.lock().await.remove(title);
                Ok(VoiceToggle::Removed)
            }
            Some(_) => Ok(VoiceToggle::RetainedBusy),
        }
    }

    /// Remove the room now when empty, queue the removal when occupied.
    ///
    /// Used by `solve`: marking a puzzle solved must not block on people
    /// still talking in its room.
    pub async fn remove_or_defer(&self, title: &str) -> ChatResult<VoiceRemoval> {
        match self.directory.voice_channel_by_name(title).await? {
            None => Ok(VoiceRemoval::Absent),
            Some(room) if room.occupants == 0 => {
                self.directory.delete_channel(room.id).await?;
                self.pending.lock().await.remove(title);
                Ok(VoiceRemoval::Removed)
            }
            Some(_) => {
                self.defer_remove(title).await;
                Ok(VoiceRemoval::Deferred)
            }
        }
    }

    /// Remove the room when empty; report an occupied room without queueing.
    ///
    /// Used by the privileged `remove`: the busy state is surfaced to the
    /// requester and the room is left alone.
    pub async fn remove_if_idle(&self, title: &str) -> ChatResult<VoiceRemoval> {
        match self.directory.voice_channel_by_name(title).await? {
            None => Ok(VoiceRemoval::Absent),
            Some(room) if room.occupants == 0 => {
                self.directory.delete_channel(room.id).await?;
                self.pending.lock().await.remove(title);
                Ok(VoiceRemoval::Removed)
            }
            Some(_) => Ok(VoiceRemoval::RetainedBusy),
        }
    }

    /// Queue the room for deletion once it empties.
    pub async fn defer_remove(&self, title: &str) {
        self.pending.lock().await.insert(title.to_string());
    }

    /// Whether a removal is queued for this room name.
    pub async fn pending_contains(&self, title: &str) -> bool {
        self.pending.lock().await.contains(title)
    }

    /// Observer for the host's voice-state feed.
    ///
    /// Folds the event into the occupancy view, then completes a queued
    /// removal when the departed room is now empty. Returns the name of the
    /// room that was removed, if any.
    pub async fn on_voice_state(&self, event: VoiceStateEvent) -> ChatResult<Option<String>> {
        let left = event.left;
        self.directory.apply_voice_state(event).await?;

        let Some(left) = left else { return Ok(None) };
        let snapshot = self.directory.snapshot().await?;
        let Some(room) = snapshot.voice_channels.iter().find(|room| room.id == left) else {
            return Ok(None);
        };
        if room.occupants != 0 {
            return Ok(None);
        }

        {
            let mut pending = self.pending.lock().await;
            if !pending.remove(&room.name) {
                return Ok(None);
            }
        }

        self.directory.delete_channel(room.id).await?;
        info!(room = %room.name, "removed voice channel after the last member left");
        Ok(Some(room.name.clone()))
    }

    /// Delete every empty voice channel whose trimmed, lowercased name does
    /// not start with a protected prefix. Occupied channels are never
    /// touched, whatever their name.
    pub async fn sweep_idle(&self, protected_prefixes: &[String]) -> ChatResult<usize> {
        let snapshot = self.directory.snapshot().await?;
        let mut removed = 0;

        for room in snapshot.voice_channels {
            let name = room.name.trim().to_lowercase();
            let protected = protected_prefixes
                .iter()
                .any(|prefix| name.starts_with(&prefix.to_lowercase()));
            if protected || room.occupants != 0 {
                continue;
            }
            self.directory.delete_channel(room.id).await?;
            self.pending.lock().await.remove(&room.name);
            removed += 1;
        }

        Ok(removed)
    }
}
