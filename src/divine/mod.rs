mod divine_command;
mod game;

pub use divine_command::{DivineCommand, DivineCommandError, ListingOutcome, ToolOutput};
pub use game::Game;
