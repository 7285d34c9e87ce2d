// HTTP middleware applied around the whole router

pub mod cors;

pub use cors::*;
