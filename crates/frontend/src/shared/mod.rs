pub mod api_utils;
pub mod crud;
pub mod date_utils;
pub mod export;
pub mod loader;
pub mod local_store;
pub mod remote;
