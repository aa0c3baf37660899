pub mod session;
pub mod store;

pub use session::{ChatEvent, ChatSession, RequestId};
pub use store::MessageStore;
