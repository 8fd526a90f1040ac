//! Host-facing command surface.
//!
//! The host framework owns slash-command registration and dispatch; it calls
//! these methods and renders each reply's message and success signal however
//! it likes (typically as a reaction). Everything here is a thin translation
//! of orchestrator outcomes into short status strings.

use std::sync::Arc;

use tracing::warn;

use crate::{
    error::ServiceError,
    services::{
        puzzle_service::{ChannelContext, PuzzleOrchestrator},
        voice::{VoiceRemoval, VoiceToggle},
    },
};

/// Outcome of one command, ready for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Short status line shown to the requester.
    pub message: String,
    /// Whether the host should render a success or failure signal.
    pub success: bool,
}

impl CommandReply {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

/// The command set exposed to the host framework.
#[derive(Clone)]
pub struct CommandSurface {
    orchestrator: Arc<PuzzleOrchestrator>,
}

impl CommandSurface {
    /// Expose an orchestrator as a command set.
    pub fn new(orchestrator: Arc<PuzzleOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// The wrapped orchestrator, for event-feed wiring.
    pub fn orchestrator(&self) -> &Arc<PuzzleOrchestrator> {
        &self.orchestrator
    }

    /// `add(title, round?)` - create a puzzle's resource bundle.
    pub async fn add(&self, title: &str, round: Option<&str>) -> CommandReply {
        match self.orchestrator.add(title, round).await {
            Ok(added) => {
                let mut message = format!("Created puzzle {}", added.title);
                if let Some(round) = &added.round {
                    message.push_str(&format!(" in round {round}"));
                }
                message.push_str(&format!("; spreadsheet at {}", added.sheet_link));
                CommandReply::ok(message)
            }
            Err(err) => render_error(err),
        }
    }

    /// `solve()` - mark the invoking channel's puzzle as solved.
    pub async fn solve(&self, ctx: ChannelContext) -> CommandReply {
        match self.orchestrator.solve(ctx).await {
            Ok(solved) => {
                let mut message = format!(
                    "Marked {} as solved and filed it under {}",
                    solved.title, solved.solved_category
                );
                if solved.voice == VoiceRemoval::Deferred {
                    message.push_str(
                        "; its voice channel is in use and will be removed once it empties",
                    );
                }
                if let Some(count) = solved.party_count {
                    message.push_str(&format!(". Party size is now {count}"));
                }
                CommandReply::ok(message)
            }
            Err(err) => render_error(err),
        }
    }

    /// `remove(title)` - privileged teardown of a puzzle.
    pub async fn remove(&self, title: &str) -> CommandReply {
        match self.orchestrator.remove(title).await {
            Ok(removed) => {
                let mut message = format!("Removed {}", removed.title);
                if removed.voice == VoiceRemoval::RetainedBusy {
                    message.push_str("; its voice channel is in use and was left in place");
                }
                CommandReply::ok(message)
            }
            Err(err) => render_error(err),
        }
    }

    /// `toggle_voice()` - toggle the invoking channel's voice room.
    pub async fn toggle_voice(&self, ctx: ChannelContext) -> CommandReply {
        match self.orchestrator.toggle_voice(ctx).await {
            Ok((title, VoiceToggle::Created)) => {
                CommandReply::ok(format!("Created voice channel for {title}"))
            }
            Ok((title, VoiceToggle::Removed)) => {
                CommandReply::ok(format!("Removed voice channel for {title}"))
            }
            Ok((_, VoiceToggle::RetainedBusy)) => {
                CommandReply::fail("Not removing a voice channel that is in use")
            }
            Err(err) => render_error(err),
        }
    }

    /// `round(name)` - create a round and make it current.
    pub async fn round(&self, name: &str) -> CommandReply {
        match self.orchestrator.create_round(name).await {
            Ok(name) => CommandReply::ok(format!("Created round {name} and made it current")),
            Err(err) => render_error(err),
        }
    }

    /// `recount()` - refresh the party badge.
    pub async fn recount(&self) -> CommandReply {
        match self.orchestrator.recount().await {
            Ok(count) => CommandReply::ok(format!("Party size is now {count}")),
            Err(err) => render_error(err),
        }
    }

    /// `voice_cleanup()` - sweep idle, unprotected voice channels.
    pub async fn voice_cleanup(&self) -> CommandReply {
        match self.orchestrator.voice_cleanup().await {
            Ok(count) => CommandReply::ok(format!("Removed {count} idle voice channel(s)")),
            Err(err) => render_error(err),
        }
    }
}

fn render_error(err: ServiceError) -> CommandReply {
    match &err {
        ServiceError::Capacity { category, mention } => {
            let alert = format!("The solved category {category} is full");
            CommandReply::fail(match mention {
                Some(mention) => format!("{mention} {alert}"),
                None => alert,
            })
        }
        ServiceError::Chat(_) | ServiceError::Drive(_) => {
            // Partial progress is left in place for manual reconciliation;
            // the log line carries the cause chain.
            warn!(error = ?err, "command failed against an external system");
            CommandReply::fail(err.to_string())
        }
        _ => CommandReply::fail(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::dao::chat::memory::MemoryGuild;
    use crate::dao::drive::memory::MemoryDrive;
    use crate::services::directory::ChannelDirectory;
    use crate::services::puzzle_service::HuntOptions;
    use crate::state::AppState;

    use super::*;

    fn surface() -> (MemoryGuild, CommandSurface) {
        let guild = MemoryGuild::new();
        let directory = ChannelDirectory::new(Arc::new(guild.clone()));
        let orchestrator = PuzzleOrchestrator::new(
            directory,
            Arc::new(MemoryDrive::new()),
            AppState::new(),
            HuntOptions::default(),
        );
        (guild, CommandSurface::new(Arc::new(orchestrator)))
    }

    #[tokio::test]
    async fn add_reports_success_with_the_sheet_link() {
        let (_guild, surface) = surface();
        let reply = surface.add("Crossword #1", None).await;
        assert!(reply.success);
        assert!(reply.message.contains("Crossword 1"));
        assert!(reply.message.contains("memory://sheet/"));
    }

    #[tokio::test]
    async fn duplicate_add_reports_failure() {
        let (_guild, surface) = surface();
        surface.add("Crossword 1", None).await;
        let reply = surface.add("Crossword 1", None).await;
        assert!(!reply.success);
        assert!(reply.message.contains("already"));
    }

    #[tokio::test]
    async fn busy_voice_toggle_reports_failure_without_removal() {
        let (guild, surface) = surface();
        let added = surface.orchestrator().add("Crossword 1", None).await.unwrap();
        guild.occupy("Crossword 1", "alice");

        let reply = surface
            .toggle_voice(ChannelContext {
                channel_id: added.channel_id,
            })
            .await;
        assert!(!reply.success);
        assert!(guild.voice_channel_id("Crossword 1").is_some());
    }

    #[tokio::test]
    async fn capacity_errors_carry_the_admin_mention() {
        use crate::dao::chat::ChatGateway;
        use crate::services::puzzle_service::CATEGORY_CAPACITY;

        let (guild, surface) = surface();
        guild.set_admin_mention("@admins");
        let added = surface.orchestrator().add("Crossword 1", None).await.unwrap();

        let solved = guild.create_category("Solved").await.unwrap();
        for index in 0..CATEGORY_CAPACITY {
            let name = format!("filler-{index}");
            guild
                .create_text_channel(&name, &name, solved.id)
                .await
                .unwrap();
        }

        let reply = surface
            .solve(ChannelContext {
                channel_id: added.channel_id,
            })
            .await;
        assert!(!reply.success);
        assert!(reply.message.starts_with("@admins"));
        assert!(reply.message.contains("full"));
    }
}
