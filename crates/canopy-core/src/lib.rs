pub mod actions;
pub mod config;
pub mod context;
pub mod contracts;
pub mod error;
pub mod fullname;
pub mod loading;
pub mod localisation;
pub mod node;
pub mod payload;
pub mod present;
pub mod presentation;
pub mod reducer;
pub mod state;
pub mod surface;
pub mod tree;
pub mod vote;

pub use actions::*;
pub use config::*;
pub use context::*;
pub use contracts::*;
pub use error::*;
pub use fullname::*;
pub use loading::*;
pub use localisation::*;
pub use node::*;
pub use payload::*;
pub use present::*;
pub use presentation::*;
pub use reducer::*;
pub use state::*;
pub use surface::*;
pub use tree::*;
pub use vote::*;
