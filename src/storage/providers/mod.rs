// Re-export storage providers
pub mod memory;
pub mod rocksdb;

// Re-export provider structs for convenience
pub use memory::MemoryStorage;
pub use rocksdb::RocksDBStorage;
