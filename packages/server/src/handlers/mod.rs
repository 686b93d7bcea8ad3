pub mod assets;
pub mod auth;
pub mod cut_out;
