//! Prompt construction under a byte budget.

pub mod budget;
pub mod compose;
pub mod variants;

pub use budget::{allocate, Allocation};
pub use compose::{ComposedPrompt, PromptComposer, PromptMode, Style, SYSTEM_PROMPT};
pub use variants::{ChunkVariants, Tier};
