pub mod agents;
pub mod chat;
pub mod commands;
pub mod status;
