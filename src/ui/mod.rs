//! Terminal front-end: prompts, clipboard, progress rendering, reveal

pub mod clipboard;
pub mod render;
pub mod reveal;
pub mod selector;
