//! Puzzle lifecycle orchestration.
//!
//! Coordinates the text channel, spreadsheet, and voice room of each puzzle
//! through add/solve/remove/toggle-voice, keeping the three externally-owned
//! resources in a consistent logical state. Nothing about a puzzle is stored
//! here; state is re-derived from the guild and the document store per call.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dao::{
        chat::{CategoryInfo, ChannelId, VoiceStateEvent},
        drive::DocumentStore,
    },
    error::{ServiceError, ServiceResult},
    services::{
        directory::{ChannelDirectory, channels_in, solved_category_chain},
        naming,
        party::PartyCounter,
        rounds::{RoundMatch, RoundResolver},
        voice::{VoiceChannelManager, VoiceRemoval, VoiceToggle},
    },
    state::{SharedState, puzzle::PuzzleState},
};

/// Channel-count ceiling the platform imposes on a category.
pub const CATEGORY_CAPACITY: usize = 50;

/// Behavioral switches distinguishing the hunt variants.
///
/// Historical deployments forked the whole bot per hunt; the differences
/// reduce to these fields plus the optional collaborators they enable.
#[derive(Debug, Clone)]
pub struct HuntOptions {
    /// Category new puzzles land in when rounds are disabled.
    pub puzzles_category: String,
    /// Name of the primary Solved category and prefix of its overflow chain.
    pub solved_prefix: String,
    /// Category voice rooms are parented under.
    pub voice_category: String,
    /// Whether puzzles are organized into round categories.
    pub rounds_enabled: bool,
    /// Whether the party-size badge is maintained.
    pub party_counter_enabled: bool,
    /// Start-of-event party size the solved count is subtracted from.
    pub start_party_size: i64,
    /// Voice channels with these name prefixes are never swept.
    pub protected_voice_prefixes: Vec<String>,
}

impl Default for HuntOptions {
    fn default() -> Self {
        Self {
            puzzles_category: "Puzzles".to_string(),
            solved_prefix: "Solved".to_string(),
            voice_category: "Puzzle Voice Channels".to_string(),
            rounds_enabled: false,
            party_counter_enabled: false,
            start_party_size: 0,
            protected_voice_prefixes: vec!["lobby".to_string(), "general".to_string()],
        }
    }
}

/// Where a channel-scoped command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelContext {
    /// Channel the command was issued in.
    pub channel_id: ChannelId,
}

/// Result of a successful `add`.
#[derive(Debug, Clone)]
pub struct AddedPuzzle {
    /// Sanitized puzzle title.
    pub title: String,
    /// Text channel created for the puzzle.
    pub channel_id: ChannelId,
    /// Browse link of the puzzle's spreadsheet.
    pub sheet_link: String,
    /// Round the puzzle was filed under, when rounds are enabled.
    pub round: Option<String>,
}

/// Result of a successful `solve`.
#[derive(Debug, Clone)]
pub struct SolvedPuzzle {
    /// Puzzle title.
    pub title: String,
    /// Solved category the text channel was moved into.
    pub solved_category: String,
    /// What happened to the puzzle's voice room.
    pub voice: VoiceRemoval,
    /// Refreshed party size, when the counter is enabled.
    pub party_count: Option<i64>,
}

/// Result of a `remove`.
#[derive(Debug, Clone)]
pub struct RemovedPuzzle {
    /// Puzzle title.
    pub title: String,
    /// Whether a text channel existed and was deleted.
    pub channel_deleted: bool,
    /// What happened to the puzzle's voice room.
    pub voice: VoiceRemoval,
}

/// The state machine coordinating channels, voice rooms, and spreadsheets.
pub struct PuzzleOrchestrator {
    directory: ChannelDirectory,
    drive: Arc<dyn DocumentStore>,
    voice: VoiceChannelManager,
    party: Option<PartyCounter>,
    options: HuntOptions,
    state: SharedState,
}

impl PuzzleOrchestrator {
    /// Wire an orchestrator over the given backends.
    pub fn new(
        directory: ChannelDirectory,
        drive: Arc<dyn DocumentStore>,
        state: SharedState,
        options: HuntOptions,
    ) -> Self {
        let voice = VoiceChannelManager::new(directory.clone(), options.voice_category.clone());
        let party = options.party_counter_enabled.then(|| {
            PartyCounter::new(
                directory.clone(),
                options.solved_prefix.clone(),
                options.start_party_size,
            )
        });
        Self {
            directory,
            drive,
            voice,
            party,
            options,
            state,
        }
    }

    /// Voice manager, for hosts wiring the voice-state feed directly.
    pub fn voice_manager(&self) -> &VoiceChannelManager {
        &self.voice
    }

    /// Party counter, when the variant enables it.
    pub fn party_counter(&self) -> Option<&PartyCounter> {
        self.party.as_ref()
    }

    /// Active option set.
    pub fn options(&self) -> &HuntOptions {
        &self.options
    }

    /// Connect-time bootstrap: ensure the base categories exist, drop any
    /// stale current-round pointer, and refresh the party badge.
    pub async fn bootstrap(&self) -> ServiceResult<()> {
        for name in [
            &self.options.puzzles_category,
            &self.options.voice_category,
            &self.options.solved_prefix,
        ] {
            self.directory.find_or_create_category(name).await?;
        }
        self.state.clear_current_round().await;
        if let Some(party) = &self.party {
            party.update_silently().await?;
        }
        Ok(())
    }

    /// Create the full resource bundle for a new puzzle.
    pub async fn add(&self, raw_title: &str, round_hint: Option<&str>) -> ServiceResult<AddedPuzzle> {
        let title = naming::sanitize_title(raw_title)
            .map_err(|err| ServiceError::Validation(err.to_string()))?;
        let gate = self.state.title_gate(&title);
        let _guard = gate.lock().await;

        if self.directory.text_channel_by_topic(&title).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "there is already a puzzle called `{title}`"
            )));
        }

        // Everything that can reject the command happens before the first
        // resource is created.
        let (category, round) = self.resolve_target_category(round_hint).await?;

        let sheet_link = self.drive.find_or_create_spreadsheet(&title).await?;
        let channel = self
            .directory
            .create_text_channel(&title, &title, category.id)
            .await?;
        let link_message = self
            .directory
            .send_message(
                channel.id,
                &format!("Spreadsheet for this puzzle: {sheet_link}"),
            )
            .await?;
        self.directory.pin_message(channel.id, link_message).await?;
        self.voice.ensure_room(&title).await?;

        if let Some(round_name) = &round {
            self.state.set_current_round(round_name.clone()).await;
        }

        info!(title = %title, round = ?round, "created puzzle");
        Ok(AddedPuzzle {
            title,
            channel_id: channel.id,
            sheet_link,
            round,
        })
    }

    /// Mark the puzzle behind the invoking channel as solved.
    pub async fn solve(&self, ctx: ChannelContext) -> ServiceResult<SolvedPuzzle> {
        let title = match self.classify_channel(ctx).await? {
            PuzzleState::Active { title } => title,
            PuzzleState::Solved { .. } => {
                return Err(ServiceError::Conflict("puzzle is already solved".into()));
            }
            PuzzleState::Unknown => {
                return Err(ServiceError::Conflict(
                    "this channel is not associated to a puzzle".into(),
                ));
            }
        };
        let gate = self.state.title_gate(&title);
        let _guard = gate.lock().await;

        // Capacity is checked before anything moves.
        let solved = self.locate_solved_category().await?;
        self.drive.move_spreadsheet_to_solved(&title).await?;
        self.directory.move_channel(ctx.channel_id, solved.id).await?;
        let voice = self.voice.remove_or_defer(&title).await?;

        let party_count = match &self.party {
            Some(party) => Some(party.announce(&format!("Solved puzzle {title}.")).await?),
            None => None,
        };

        info!(title = %title, category = %solved.name, voice = ?voice, "marked puzzle solved");
        Ok(SolvedPuzzle {
            title,
            solved_category: solved.name,
            voice,
            party_count,
        })
    }

    /// Tear down a puzzle's resources. Privileged; missing resources are
    /// no-ops, never errors.
    pub async fn remove(&self, raw_title: &str) -> ServiceResult<RemovedPuzzle> {
        let title = naming::sanitize_title(raw_title)
            .map_err(|err| ServiceError::Validation(err.to_string()))?;
        let gate = self.state.title_gate(&title);
        let _guard = gate.lock().await;

        let voice = self.voice.remove_if_idle(&title).await?;
        let channel = self.directory.text_channel_by_topic(&title).await?;
        let channel_deleted = match &channel {
            Some(channel) => {
                self.directory.delete_channel(channel.id).await?;
                true
            }
            None => false,
        };
        self.drive.trash_spreadsheet(&title).await?;

        info!(title = %title, channel_deleted, voice = ?voice, "removed puzzle");
        Ok(RemovedPuzzle {
            title,
            channel_deleted,
            voice,
        })
    }

    /// Toggle the voice room of the puzzle behind the invoking channel.
    pub async fn toggle_voice(&self, ctx: ChannelContext) -> ServiceResult<(String, VoiceToggle)> {
        let title = match self.classify_channel(ctx).await? {
            PuzzleState::Active { title } | PuzzleState::Solved { title } => title,
            PuzzleState::Unknown => {
                return Err(ServiceError::Conflict(
                    "a voice channel can only be toggled in a puzzle's text channel".into(),
                ));
            }
        };

        let toggle = self.voice.toggle(&title).await?;
        Ok((title, toggle))
    }

    /// Create a round category and make it the current round.
    pub async fn create_round(&self, name: &str) -> ServiceResult<String> {
        if !self.options.rounds_enabled {
            return Err(ServiceError::Conflict(
                "rounds are not enabled for this hunt".into(),
            ));
        }
        let name = name.trim();
        if naming::normalize_round_key(name).is_empty() {
            return Err(ServiceError::Validation(
                "round name needs at least one alphanumeric character".into(),
            ));
        }

        let resolver = self.round_resolver().await?;
        if resolver.contains_key_of(name) {
            return Err(ServiceError::Conflict(format!(
                "a round matching `{name}` already exists"
            )));
        }

        self.directory.create_category(name).await?;
        self.state.set_current_round(name.to_string()).await;
        info!(round = %name, "created round");
        Ok(name.to_string())
    }

    /// Refresh the party badge on demand.
    pub async fn recount(&self) -> ServiceResult<i64> {
        let Some(party) = &self.party else {
            return Err(ServiceError::Conflict(
                "party counting is not enabled for this hunt".into(),
            ));
        };
        Ok(party.update_silently().await?)
    }

    /// Sweep idle, unprotected voice channels.
    pub async fn voice_cleanup(&self) -> ServiceResult<usize> {
        Ok(self
            .voice
            .sweep_idle(&self.options.protected_voice_prefixes)
            .await?)
    }

    /// Voice-state observer relayed by the host's gateway connection.
    pub async fn on_voice_state(&self, event: VoiceStateEvent) -> ServiceResult<Option<String>> {
        Ok(self.voice.on_voice_state(event).await?)
    }

    /// Member join/leave observer; keeps the party badge current.
    pub async fn on_membership_change(&self) -> ServiceResult<()> {
        if let Some(party) = &self.party {
            party.update_silently().await?;
        }
        Ok(())
    }

    async fn classify_channel(&self, ctx: ChannelContext) -> ServiceResult<PuzzleState> {
        let snapshot = self.directory.snapshot().await?;
        let channel = snapshot
            .text_channels
            .iter()
            .find(|channel| channel.id == ctx.channel_id);
        Ok(PuzzleState::classify(
            channel,
            &snapshot.categories,
            &self.options.solved_prefix,
        ))
    }

    async fn round_resolver(&self) -> ServiceResult<RoundResolver> {
        let snapshot = self.directory.snapshot().await?;
        Ok(RoundResolver::from_categories(
            &snapshot.categories,
            &self.options.solved_prefix,
            &[
                self.options.puzzles_category.as_str(),
                self.options.voice_category.as_str(),
            ],
        ))
    }

    /// Resolve the category a new puzzle is filed under, plus the round name
    /// when rounds are in play.
    async fn resolve_target_category(
        &self,
        round_hint: Option<&str>,
    ) -> ServiceResult<(CategoryInfo, Option<String>)> {
        if !self.options.rounds_enabled {
            if round_hint.is_some() {
                return Err(ServiceError::Validation(
                    "rounds are not enabled for this hunt".into(),
                ));
            }
            let category = self
                .directory
                .find_or_create_category(&self.options.puzzles_category)
                .await?;
            return Ok((category, None));
        }

        let round_name = match round_hint {
            Some(prefix) => match self.round_resolver().await?.resolve(prefix) {
                RoundMatch::Resolved(name) => name,
                RoundMatch::Ambiguous(candidates) => {
                    return Err(ServiceError::Validation(format!(
                        "round prefix `{prefix}` is ambiguous: {}",
                        candidates.join(", ")
                    )));
                }
                RoundMatch::NotFound => {
                    return Err(ServiceError::Validation(format!(
                        "no round matches `{prefix}`; create it first"
                    )));
                }
            },
            None => self.state.current_round().await.ok_or_else(|| {
                ServiceError::Validation(
                    "no round is active; name one or create it first".into(),
                )
            })?,
        };

        let category = self.directory.find_or_create_category(&round_name).await?;
        Ok((category, Some(round_name)))
    }

    /// First Solved-chain category with room for another channel.
    ///
    /// The primary category is created when the chain is empty; overflow
    /// categories are only ever found, operators create them by hand.
    async fn locate_solved_category(&self) -> ServiceResult<CategoryInfo> {
        let snapshot = self.directory.snapshot().await?;
        let chain = solved_category_chain(&snapshot, &self.options.solved_prefix);
        if chain.is_empty() {
            return Ok(self
                .directory
                .find_or_create_category(&self.options.solved_prefix)
                .await?);
        }

        for category in chain {
            // The 50th channel succeeds; only the 51st is blocked.
            if channels_in(&snapshot, category.id) == CATEGORY_CAPACITY {
                continue;
            }
            return Ok(category);
        }

        let mention = match self.directory.admin_mention().await {
            Ok(mention) => mention,
            Err(err) => {
                warn!(error = %err, "could not look up the admin role for the capacity alert");
                None
            }
        };
        Err(ServiceError::Capacity {
            category: self.options.solved_prefix.clone(),
            mention,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::dao::chat::{ChatGateway, memory::MemoryGuild};
    use crate::dao::drive::memory::{MemoryDrive, SheetFolder};
    use crate::state::AppState;

    use super::*;

    struct Fixture {
        guild: MemoryGuild,
        drive: MemoryDrive,
        orchestrator: PuzzleOrchestrator,
    }

    fn fixture(options: HuntOptions) -> Fixture {
        let guild = MemoryGuild::new();
        let drive = MemoryDrive::new();
        let directory = ChannelDirectory::new(Arc::new(guild.clone()));
        let orchestrator = PuzzleOrchestrator::new(
            directory,
            Arc::new(drive.clone()),
            AppState::new(),
            options,
        );
        Fixture {
            guild,
            drive,
            orchestrator,
        }
    }

    fn basic_fixture() -> Fixture {
        fixture(HuntOptions::default())
    }

    fn rounds_fixture() -> Fixture {
        fixture(HuntOptions {
            rounds_enabled: true,
            ..HuntOptions::default()
        })
    }

    async fn fill_category(guild: &MemoryGuild, category: ChannelId, count: usize) {
        for index in 0..count {
            let name = format!("filler-{index}");
            guild
                .create_text_channel(&name, &name, category)
                .await
                .unwrap();
        }
    }

    async fn category_id(guild: &MemoryGuild, name: &str) -> Option<ChannelId> {
        let snapshot = guild.snapshot().await.unwrap();
        snapshot
            .categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.id)
    }

    async fn parent_of(guild: &MemoryGuild, channel: ChannelId) -> Option<ChannelId> {
        let snapshot = guild.snapshot().await.unwrap();
        snapshot
            .text_channels
            .iter()
            .find(|existing| existing.id == channel)
            .and_then(|existing| existing.parent_id)
    }

    #[tokio::test]
    async fn add_creates_the_full_resource_bundle() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword #1", None).await.unwrap();

        assert_eq!(added.title, "Crossword 1");
        assert_eq!(f.drive.active_count("Crossword 1"), 1);
        assert!(f.guild.voice_channel_id("Crossword 1").is_some());

        let puzzles = category_id(&f.guild, "Puzzles").await.unwrap();
        assert_eq!(parent_of(&f.guild, added.channel_id).await, Some(puzzles));

        let pins = f.guild.pinned_contents(added.channel_id);
        assert_eq!(pins.len(), 1);
        assert!(pins[0].contains(&added.sheet_link));
    }

    #[tokio::test]
    async fn adding_the_same_title_twice_is_a_conflict() {
        let f = basic_fixture();
        f.orchestrator.add("Crossword 1", None).await.unwrap();

        let err = f.orchestrator.add("Crossword 1", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Exactly one channel and one sheet survive the retry.
        let snapshot = f.guild.snapshot().await.unwrap();
        let channels = snapshot
            .text_channels
            .iter()
            .filter(|channel| channel.topic.as_deref() == Some("Crossword 1"))
            .count();
        assert_eq!(channels, 1);
        assert_eq!(f.drive.active_count("Crossword 1"), 1);
    }

    #[tokio::test]
    async fn empty_titles_are_rejected_before_any_side_effect() {
        let f = basic_fixture();
        let err = f.orchestrator.add("  '#'  ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let snapshot = f.guild.snapshot().await.unwrap();
        assert!(snapshot.text_channels.is_empty());
        assert!(snapshot.categories.is_empty());
    }

    #[tokio::test]
    async fn solve_moves_channel_and_sheet_and_removes_the_voice_room() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword #1", None).await.unwrap();

        let solved = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await
            .unwrap();

        assert_eq!(solved.title, "Crossword 1");
        assert_eq!(solved.voice, VoiceRemoval::Removed);
        assert!(f.guild.voice_channel_id("Crossword 1").is_none());
        assert_eq!(f.drive.folder_of("Crossword 1"), Some(SheetFolder::Solved));

        let solved_id = category_id(&f.guild, "Solved").await.unwrap();
        assert_eq!(parent_of(&f.guild, added.channel_id).await, Some(solved_id));
    }

    #[tokio::test]
    async fn solving_twice_reports_already_solved() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();
        let ctx = ChannelContext {
            channel_id: added.channel_id,
        };
        f.orchestrator.solve(ctx).await.unwrap();

        let err = f.orchestrator.solve(ctx).await.unwrap_err();
        match err {
            ServiceError::Conflict(message) => assert!(message.contains("already solved")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn solving_outside_a_puzzle_channel_is_a_conflict() {
        let f = basic_fixture();
        let general = f.guild.create_category("General").await.unwrap();
        let chatter = f
            .guild
            .create_text_channel("chatter", "", general.id)
            .await
            .unwrap();
        // A topicless channel is not a puzzle.
        let err = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: chatter.id,
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::Conflict(message) => {
                assert!(message.contains("not associated to a puzzle"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn solve_is_blocked_when_every_solved_category_is_full() {
        let f = basic_fixture();
        f.guild.set_admin_mention("@admins");
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();

        let solved = f.guild.create_category("Solved").await.unwrap();
        fill_category(&f.guild, solved.id, CATEGORY_CAPACITY).await;

        let err = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await
            .unwrap_err();
        match err {
            ServiceError::Capacity { category, mention } => {
                assert_eq!(category, "Solved");
                assert_eq!(mention.as_deref(), Some("@admins"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing moved: the channel is still in Puzzles and the sheet in
        // the root folder.
        let puzzles = category_id(&f.guild, "Puzzles").await.unwrap();
        assert_eq!(parent_of(&f.guild, added.channel_id).await, Some(puzzles));
        assert_eq!(f.drive.folder_of("Crossword 1"), Some(SheetFolder::Root));
    }

    #[tokio::test]
    async fn solve_uses_a_manually_created_overflow_category() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();

        let solved = f.guild.create_category("Solved").await.unwrap();
        fill_category(&f.guild, solved.id, CATEGORY_CAPACITY).await;
        let overflow = f.guild.create_category("Solved 2").await.unwrap();

        let outcome = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await
            .unwrap();
        assert_eq!(outcome.solved_category, "Solved 2");
        assert_eq!(parent_of(&f.guild, added.channel_id).await, Some(overflow.id));
    }

    #[tokio::test]
    async fn solve_defers_removal_of_an_occupied_voice_room() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();
        f.guild.occupy("Crossword 1", "alice");

        let solved = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await
            .unwrap();

        assert_eq!(solved.voice, VoiceRemoval::Deferred);
        assert!(f.guild.voice_channel_id("Crossword 1").is_some());
        assert!(f.orchestrator.voice_manager().pending_contains("Crossword 1").await);

        // The deferred removal completes once the room empties.
        let room_id = f.guild.voice_channel_id("Crossword 1").unwrap();
        f.orchestrator
            .on_voice_state(VoiceStateEvent {
                member: "alice".into(),
                left: Some(room_id),
                joined: None,
            })
            .await
            .unwrap();
        assert!(f.guild.voice_channel_id("Crossword 1").is_none());
    }

    #[tokio::test]
    async fn remove_tears_down_every_resource() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();

        let removed = f.orchestrator.remove("Crossword 1").await.unwrap();
        assert!(removed.channel_deleted);
        assert_eq!(removed.voice, VoiceRemoval::Removed);

        let snapshot = f.guild.snapshot().await.unwrap();
        assert!(
            !snapshot
                .text_channels
                .iter()
                .any(|channel| channel.id == added.channel_id)
        );
        assert_eq!(f.drive.active_count("Crossword 1"), 0);
    }

    #[tokio::test]
    async fn removing_a_missing_puzzle_is_a_no_op() {
        let f = basic_fixture();
        let removed = f.orchestrator.remove("Never Existed").await.unwrap();
        assert!(!removed.channel_deleted);
        assert_eq!(removed.voice, VoiceRemoval::Absent);
    }

    #[tokio::test]
    async fn remove_reports_a_busy_voice_room_and_leaves_it() {
        let f = basic_fixture();
        f.orchestrator.add("Crossword 1", None).await.unwrap();
        f.guild.occupy("Crossword 1", "alice");

        let removed = f.orchestrator.remove("Crossword 1").await.unwrap();
        assert!(removed.channel_deleted);
        assert_eq!(removed.voice, VoiceRemoval::RetainedBusy);
        assert!(f.guild.voice_channel_id("Crossword 1").is_some());
        // Reported, not queued: the room belongs to the sweep now.
        assert!(!f.orchestrator.voice_manager().pending_contains("Crossword 1").await);
    }

    #[tokio::test]
    async fn toggle_voice_needs_a_puzzle_channel() {
        let f = basic_fixture();
        let general = f.guild.create_category("General").await.unwrap();
        let chatter = f
            .guild
            .create_text_channel("chatter", "", general.id)
            .await
            .unwrap();

        let err = f
            .orchestrator
            .toggle_voice(ChannelContext {
                channel_id: chatter.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn toggle_voice_works_from_the_puzzle_channel() {
        let f = basic_fixture();
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();
        let ctx = ChannelContext {
            channel_id: added.channel_id,
        };

        // `add` created the room, so the first toggle removes it.
        let (title, toggle) = f.orchestrator.toggle_voice(ctx).await.unwrap();
        assert_eq!(title, "Crossword 1");
        assert_eq!(toggle, VoiceToggle::Removed);

        let (_, toggle) = f.orchestrator.toggle_voice(ctx).await.unwrap();
        assert_eq!(toggle, VoiceToggle::Created);
    }

    #[tokio::test]
    async fn add_requires_a_round_when_rounds_are_enabled() {
        let f = rounds_fixture();
        let err = f.orchestrator.add("Crossword 1", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // All-or-nothing: nothing was created.
        assert_eq!(f.drive.active_count("Crossword 1"), 0);
        assert!(f.guild.snapshot().await.unwrap().text_channels.is_empty());
    }

    #[tokio::test]
    async fn add_files_the_puzzle_under_the_resolved_round() {
        let f = rounds_fixture();
        f.orchestrator.create_round("Ocean").await.unwrap();

        let added = f.orchestrator.add("Crossword 1", Some("oc")).await.unwrap();
        assert_eq!(added.round.as_deref(), Some("Ocean"));

        let ocean = category_id(&f.guild, "Ocean").await.unwrap();
        assert_eq!(parent_of(&f.guild, added.channel_id).await, Some(ocean));
    }

    #[tokio::test]
    async fn add_defaults_to_the_current_round() {
        let f = rounds_fixture();
        f.orchestrator.create_round("Ocean").await.unwrap();
        f.orchestrator.create_round("Outer Space").await.unwrap();

        // The latest round creation moved the pointer.
        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();
        assert_eq!(added.round.as_deref(), Some("Outer Space"));
    }

    #[tokio::test]
    async fn ambiguous_round_hints_list_the_candidates() {
        let f = rounds_fixture();
        f.orchestrator.create_round("Ocean").await.unwrap();
        f.orchestrator.create_round("Outer Space").await.unwrap();

        let err = f
            .orchestrator
            .add("Crossword 1", Some("o"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(message) => {
                assert!(message.contains("Ocean"));
                assert!(message.contains("Outer Space"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.drive.active_count("Crossword 1"), 0);
    }

    #[tokio::test]
    async fn unknown_round_hints_ask_for_creation() {
        let f = rounds_fixture();
        f.orchestrator.create_round("Ocean").await.unwrap();

        let err = f
            .orchestrator
            .add("Crossword 1", Some("Zzz"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn round_creation_rejects_normalized_key_collisions() {
        let f = rounds_fixture();
        f.orchestrator.create_round("Movies!").await.unwrap();

        let err = f.orchestrator.create_round("movies").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // The original round still resolves.
        let added = f.orchestrator.add("Crossword 1", Some("movies")).await.unwrap();
        assert_eq!(added.round.as_deref(), Some("Movies!"));
    }

    #[tokio::test]
    async fn party_count_is_announced_after_a_solve() {
        let f = fixture(HuntOptions {
            party_counter_enabled: true,
            start_party_size: 10,
            ..HuntOptions::default()
        });
        let general = f.guild.create_category("General").await.unwrap();
        let party = f
            .guild
            .create_text_channel("party-of-10", "party", general.id)
            .await
            .unwrap();

        let added = f.orchestrator.add("Crossword 1", None).await.unwrap();
        let solved = f
            .orchestrator
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await
            .unwrap();

        assert_eq!(solved.party_count, Some(9));
        let snapshot = f.guild.snapshot().await.unwrap();
        assert!(
            snapshot
                .text_channels
                .iter()
                .any(|channel| channel.name == "party-of-9")
        );
        let messages = f.guild.message_contents(party.id);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Solved puzzle Crossword 1."));
    }

    #[tokio::test]
    async fn recount_refreshes_the_badge_on_demand() {
        let f = fixture(HuntOptions {
            party_counter_enabled: true,
            start_party_size: 8,
            ..HuntOptions::default()
        });
        let general = f.guild.create_category("General").await.unwrap();
        f.guild
            .create_text_channel("party-of-8", "party", general.id)
            .await
            .unwrap();
        let solved = f.guild.create_category("Solved").await.unwrap();
        fill_category(&f.guild, solved.id, 3).await;

        assert_eq!(f.orchestrator.recount().await.unwrap(), 5);
        let snapshot = f.guild.snapshot().await.unwrap();
        assert!(
            snapshot
                .text_channels
                .iter()
                .any(|channel| channel.name == "party-of-5")
        );
    }

    #[tokio::test]
    async fn recount_is_rejected_without_a_party_counter() {
        let f = basic_fixture();
        let err = f.orchestrator.recount().await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn bootstrap_creates_the_base_categories_once() {
        let f = basic_fixture();
        f.orchestrator.bootstrap().await.unwrap();
        f.orchestrator.bootstrap().await.unwrap();

        let snapshot = f.guild.snapshot().await.unwrap();
        for name in ["Puzzles", "Solved", "Puzzle Voice Channels"] {
            let count = snapshot
                .categories
                .iter()
                .filter(|category| category.name == name)
                .count();
            assert_eq!(count, 1, "expected exactly one `{name}` category");
        }
    }
}
