pub mod chat;
pub mod commands;
pub mod media;
pub mod viewer_service;
