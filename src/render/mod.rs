pub mod renderer;

pub use renderer::{HudItem, KeyHint, Renderer};
