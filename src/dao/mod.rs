/// Chat platform port and backends.
pub mod chat;
/// Document store port and backends.
pub mod drive;
