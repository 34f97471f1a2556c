pub mod analysis;
pub mod coaching;
pub mod prompts;
