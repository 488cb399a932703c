// handlers/mod.rs - one module per resource
//
// Public reads need no token. Every mutating handler takes `AuthUser`, which
// rejects the request with 401 before the body is parsed.

pub mod comments;
pub mod system;
pub mod teas;
pub mod users;
