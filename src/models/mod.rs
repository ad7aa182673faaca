mod position;
mod settings;
mod chat;

pub use position::*;
pub use settings::*;
pub use chat::*;
