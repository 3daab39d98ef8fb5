mod reputation_repository;
mod session_notifier;

pub use reputation_repository::ReputationRepository;
pub use session_notifier::{NullNotifier, SessionNotifier};
