use async_trait::async_trait;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user account operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new, not yet activated user and email them an activation token.
    ///
    /// # Arguments
    /// * `command` - Name, email and plaintext password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `Validation` - Invalid input or email already registered
    /// * `Credential` - Password hashing failed
    /// * `Persistence` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Email a fresh activation token to a registered, inactive user.
    ///
    /// # Arguments
    /// * `email` - Address the account was registered with
    ///
    /// # Errors
    /// * `Validation` - Malformed email, unknown email or user already active
    /// * `Persistence` - Database operation failed
    async fn request_activation_token(&self, email: &str) -> Result<(), UserError>;

    /// Email a password reset token to an activated user.
    ///
    /// # Arguments
    /// * `email` - Address the account was registered with
    ///
    /// # Errors
    /// * `Validation` - Malformed email or user not activated
    /// * `NotFound` - No user with this email
    /// * `Persistence` - Database operation failed
    async fn request_password_reset_token(&self, email: &str) -> Result<(), UserError>;

    /// Activate the user owning an activation token.
    ///
    /// # Arguments
    /// * `token` - Activation token plaintext
    ///
    /// # Returns
    /// The activated user
    ///
    /// # Errors
    /// * `Validation` - Malformed, unknown or expired token
    /// * `EditConflict` - User changed concurrently
    /// * `Persistence` - Database operation failed
    async fn activate_user(&self, token: &str) -> Result<User, UserError>;

    /// Replace the password of the user owning a password reset token.
    ///
    /// # Arguments
    /// * `token` - Password reset token plaintext
    /// * `password` - New plaintext password, dropped once hashed
    ///
    /// # Errors
    /// * `Validation` - Malformed input, unknown or expired token
    /// * `EditConflict` - User changed concurrently
    /// * `Persistence` - Database operation failed
    async fn reset_password(&self, token: &str, password: String) -> Result<(), UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Persistence` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
}

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new user.
    ///
    /// # Returns
    /// Stored user with its assigned id, creation time and version
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Persistence` - Insert failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Find user by ID.
    ///
    /// # Returns
    /// Optional user (None if not found)
    ///
    /// # Errors
    /// * `Persistence` - Query failed or stored row is corrupted
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Find user by email address.
    ///
    /// # Returns
    /// Optional user (None if not found)
    ///
    /// # Errors
    /// * `Persistence` - Query failed or stored row is corrupted
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Write back a user read earlier, provided nobody changed it since.
    ///
    /// # Arguments
    /// * `user` - User carrying the version it was read at
    ///
    /// # Returns
    /// Updated user with its version incremented
    ///
    /// # Errors
    /// * `EditConflict` - No row with this id and version
    /// * `Persistence` - Update failed
    async fn update(&self, user: User) -> Result<User, UserError>;
}
