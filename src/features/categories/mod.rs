//! Category pages.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/catalog/categories` | No | List categories |
//! | GET/POST | `/catalog/categories/create` | No | Create form |
//! | GET | `/catalog/categories/{id}` | No | Category detail with its toys |
//! | GET/POST | `/catalog/categories/{id}/update` | Basic | Update form |
//! | GET/POST | `/catalog/categories/{id}/delete` | Basic | Delete, blocked while toys remain |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::routes;
