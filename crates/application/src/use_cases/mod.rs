pub mod block_source;
pub mod check_admission;
pub mod delete_source;
pub mod get_source;
pub mod recent_sources;
pub mod unblock_source;

pub use block_source::BlockSourceUseCase;
pub use check_admission::CheckAdmissionUseCase;
pub use delete_source::DeleteSourceUseCase;
pub use get_source::GetSourceUseCase;
pub use recent_sources::RecentSourcesUseCase;
pub use unblock_source::UnblockSourceUseCase;
