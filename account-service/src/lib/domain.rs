pub mod clock;
pub mod errors;
pub mod notification;
pub mod session;
pub mod token;
pub mod user;
pub mod validation;
