pub mod credentials;
pub mod gate;
pub mod password;
pub mod session_service;
pub mod token_codec;
