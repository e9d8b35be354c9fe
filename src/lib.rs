pub mod build_log;
pub mod cli;
pub mod colors;
pub mod error;
pub mod events;
pub mod filter;
pub mod folders;
pub mod settings;

pub use build_log::*;
pub use colors::*;
pub use error::*;
pub use events::*;
pub use filter::*;
pub use folders::*;
pub use settings::*;
