pub mod model;

pub use model::{Movie, NewMovie, NewUser, User};
