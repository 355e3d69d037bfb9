pub mod accounts;
pub mod error;
pub mod messages;
pub mod routes;

pub use accounts::AccountService;
pub use error::ServiceError;
pub use messages::MessageService;
pub use routes::{AppState, AppStateInner, router};
