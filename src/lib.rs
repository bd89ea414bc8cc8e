//! Procedurally generated tile-grid maze campaign.
//!
//! Each level carves a random start-to-exit path, scatters walls around it,
//! and drops a blinking trap, a freeze tile and, once per campaign, a magic
//! tile. [`Game`] runs the campaign; the terminal front end lives in
//! `main.rs` and [`render`].

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod hazards;
pub mod level;
pub mod maze;
pub mod render;
pub mod timers;
pub mod timing;

pub use config::{Rules, Settings};
pub use error::{Error, GenerationError, Result};
pub use game::{Ending, Event, Frame, Game, Phase};
pub use grid::{Dir, Pos, Tile, TileKind};
pub use timing::{BestTimeStore, CampaignSummary, MemoryStore};
