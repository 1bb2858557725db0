//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{
    AuthResponse, ChangePasswordRequest, LoginCredentials, NewUser, Profile, ProfileUpdate,
    PublicUser, RegisterRequest, User, normalize_email, split_specialties,
};
