pub mod cut_out;
pub mod user;
