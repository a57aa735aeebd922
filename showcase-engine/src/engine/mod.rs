pub mod assets;
pub mod channel;
pub mod core;
pub mod loading;
pub mod presentation;
