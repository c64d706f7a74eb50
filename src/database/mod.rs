//! Módulo de base de datos
//!
//! Conexión a PostgreSQL y el almacenamiento en memoria equivalente.

pub mod connection;
pub mod memory;

pub use connection::DatabaseConnection;
pub use memory::MemoryStore;
