/// Read-through channel and category lookups.
pub mod directory;
/// Canonical identifier policy for titles and round names.
pub mod naming;
/// Party-size badge derived from guild data.
pub mod party;
/// Puzzle lifecycle orchestration.
pub mod puzzle_service;
/// Round-prefix resolution.
pub mod rounds;
/// Voice room lifecycle and deferred removal.
pub mod voice;
