#![forbid(unsafe_code)]

pub mod records;
pub mod repository;
pub mod sqlite;
