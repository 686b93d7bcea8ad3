pub mod auth;
pub mod cut_out;
pub mod shared;
