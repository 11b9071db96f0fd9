//! skillref core library: the topic index, SKILL.md reference bookkeeping, the docs
//! manifest, and the documentation fetcher used by the `skillref` CLI.

pub mod config;
pub mod fetch;
pub mod init;
pub mod manifest;
pub mod skill;
pub mod topics;
