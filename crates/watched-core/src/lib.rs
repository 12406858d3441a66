pub mod config;
pub mod logging;

pub mod http_loader;
pub mod reply;
pub mod request;
pub mod status;
pub mod surface;
pub mod target;
pub mod toggler;
