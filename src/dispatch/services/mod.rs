//! Application services for action dispatch.

mod card_update;
mod dispatcher;
mod retry;

pub use dispatcher::{
    ActionDispatchError, ActionDispatchResult, ActionDispatchService, MoveDirection,
};
pub use retry::RetryPolicy;
