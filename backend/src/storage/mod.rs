pub mod upload_store;
