//! Toy pages and the catalog landing page.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/catalog` | No | Landing page with toy and category counts |
//! | GET | `/catalog/toys` | No | List toys |
//! | GET/POST | `/catalog/toys/create` | No | Create form (url-encoded or multipart with `image`) |
//! | GET | `/catalog/toys/{id}` | No | Toy detail |
//! | GET/POST | `/catalog/toys/{id}/update` | Basic | Update form |
//! | GET/POST | `/catalog/toys/{id}/delete` | Basic | Delete confirmation |

pub mod dtos;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::routes;
