//! User-facing wording: calm risk messages, lifestyle tips, and the
//! alarm-language scan that guards both.

pub mod keywords;
pub mod lifestyle;
pub mod messages;

pub use keywords::{scan_language, LanguageCategory, LanguageMatch};
pub use lifestyle::LifestyleAdvisor;
pub use messages::MessageComposer;
