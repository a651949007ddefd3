pub mod api_error;
pub mod collection;
pub mod collection_key;
pub mod export;
pub mod form;
pub mod numbers;
