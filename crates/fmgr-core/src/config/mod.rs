//! Configuration management for fmgr.
//!
//! User preferences ([`settings::Config`]) are stored as a TOML file and
//! loaded once at startup. Everything has a default, so a missing file is
//! never fatal.

pub mod settings;
