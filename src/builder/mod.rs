//! Link-in-bio page document and the editing operations over it.

pub mod config;
pub mod editor;

pub use config::{
    ButtonVariant, Component, ComponentContent, ComponentType, PageConfig, Profile,
    ResolvedTheme, SocialPlatform, TextSize, Theme, MAX_COMPONENTS,
};
pub use editor::{MoveDirection, PageEditor};
