pub mod enums;
pub mod filters;
pub mod health_log;
pub mod hypothesis;
pub mod lab;
pub mod medical_test;
pub mod user;

pub use filters::*;
pub use health_log::*;
pub use hypothesis::*;
pub use lab::*;
pub use medical_test::*;
pub use user::*;

use uuid::Uuid;

/// Row owner. Guest rows carry a NULL `user_id` and the client-held guest
/// key in `guest_id`; account rows carry the account id and a NULL `guest_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Guest(Uuid),
    User(Uuid),
}

impl Owner {
    /// Value bound to the `user_id` column (`None` for guests).
    pub fn user_id(&self) -> Option<String> {
        match self {
            Owner::Guest(_) => None,
            Owner::User(id) => Some(id.to_string()),
        }
    }

    /// Value bound to the `guest_id` column (`None` for accounts).
    pub fn guest_id(&self) -> Option<String> {
        match self {
            Owner::Guest(key) => Some(key.to_string()),
            Owner::User(_) => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Owner::Guest(_))
    }
}
