pub mod entity;
pub mod keys;
pub mod kv;
pub mod kv_repo;
pub mod mapper;
pub mod seed;

pub use keys::StorageKeys;
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use kv_repo::{KvImagesRepository, KvRequestsRepository, KvSessionRepository, KvUsersRepository};
