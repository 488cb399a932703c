//! Request and response shapes for the JSON API.
//!
//! `*Create` / `*Update` types are what clients send, `*View` / `*Response`
//! types are what the API returns. Field checks that serde cannot express live
//! next to the type they guard and return a client-facing message.

pub mod comment;
pub mod tea;
pub mod user;

pub use comment::{CommentCreate, CommentView};
pub use tea::{TeaCreate, TeaUpdate, TeaView};
pub use user::{LoginResponse, RegisteredUser, UserLogin, UserRegistration, UserResponse};
