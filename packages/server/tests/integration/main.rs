mod auth;
mod cut_out;
