pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod ports;
