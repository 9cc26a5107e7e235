pub mod error;
pub mod passes;
pub mod session;
pub mod settings;
