pub mod revokes;

pub use revokes::{
    revoke_one_time_credits, revoke_remaining_subscription_credits_on_end,
    revoke_subscription_credits,
};
