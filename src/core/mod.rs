pub mod errors;
pub mod http;
pub mod utils;

pub use errors::{
    ApiError,
    LexiqError,
};
