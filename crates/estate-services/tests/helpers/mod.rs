#![allow(dead_code)]

pub mod cache;
pub mod fixtures;
pub mod property_store;
pub mod purchase_store;
pub mod storage;
