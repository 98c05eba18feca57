mod bus;
mod types;

pub use bus::{MessageBus, NoteDispatcher};
pub use types::BridgeMessage;
