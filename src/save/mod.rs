pub mod context;
pub mod manager;

pub use context::{SaveContext, Saveable};
pub use manager::{SaveManager, SlotInfo, QUICKSAVE_SLOT, SAVE_VERSION};
