// Repository interfaces (ports)
// Implemented by infrastructure adapters, consumed by the API layer

pub mod errors;
pub mod invitation_repository;
pub mod membership_repository;
pub mod news_repository;
pub mod project_repository;
pub mod squad_repository;
pub mod team_repository;
pub mod user_repository;

pub use errors::{RepositoryError, RepositoryResult};
pub use invitation_repository::{InvitationEntry, InvitationRepository};
pub use membership_repository::MembershipRepository;
pub use news_repository::{NewsEntry, NewsRepository};
pub use project_repository::{ProjectEntry, ProjectMember, ProjectRepository};
pub use squad_repository::{SquadRepository, SquadSummary};
pub use team_repository::{TeamRepository, TeamSummary};
pub use user_repository::{UserAccount, UserRepository};
