//! Command implementations that do not need an open store.

pub mod init;
