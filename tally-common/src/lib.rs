#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod db;
pub mod models;
pub mod notify;
pub mod oplog;
pub mod push;
pub mod schema;
