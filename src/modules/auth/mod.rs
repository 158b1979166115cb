pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{LoginRequest, LoginResponse};
pub use router::init_auth_router;
