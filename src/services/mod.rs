pub mod config_service;
pub mod llm_client;
pub mod session_service;
pub mod stream_inserter;
