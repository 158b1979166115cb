pub mod controller;
pub mod model;
pub mod registry;
pub mod router;
pub mod service;

pub use model::{ResourceDef, ResourceList};
pub use router::init_resources_router;
