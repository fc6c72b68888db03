pub mod chat;
pub mod settings;
pub mod shared;

pub use chat::ChatView;
pub use settings::SettingsView;
