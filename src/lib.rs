pub mod client;
pub mod identity;
pub mod predict;
pub mod settings;
pub mod storage;
pub mod web;
