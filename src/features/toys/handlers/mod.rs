mod toy_handler;

pub use toy_handler::*;
