//! Shared application state

use crate::accounts::UserService;

#[derive(Clone)]
pub struct AppState {
    pub accounts: UserService,
}
