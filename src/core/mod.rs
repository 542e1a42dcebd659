pub mod assets;
pub mod content;
pub mod emoji;
pub mod renderer;
pub mod request;
pub mod style;
pub mod template;
