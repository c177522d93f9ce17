// API module organization
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod storage;
