pub mod assistant;
pub mod renderer;

pub use assistant::{AssistantReply, ChatAssistant};
pub use renderer::{
    classify_line, render, split_bold, Block, BulletGlyph, ChatDocument, LineToken, ListItem, Span,
};
