pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, validate_username};
pub use auth_service_impl::SeaOrmAuthService;

pub mod account;
pub use account::{
    AccountAction, AccountController, AccountView, ActionOutcome, CreateUserOutcome, Navigation,
    Profile, Role, UserSummary,
};
