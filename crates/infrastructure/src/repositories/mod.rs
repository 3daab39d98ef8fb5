pub mod reputation_repository;

pub use reputation_repository::SqliteReputationRepository;
