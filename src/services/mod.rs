mod accounts;
mod users;

pub use accounts::{AccountService, Signup};
pub use users::UserService;
