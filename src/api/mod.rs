pub mod client;
pub mod envelope;
pub mod quiz;
pub mod srs;
pub mod wordbook;

pub use client::{
    ApiBody,
    ApiClient,
    RequestOptions,
};
