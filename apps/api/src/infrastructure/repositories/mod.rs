// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_invitation_repository;
pub mod postgres_membership_repository;
pub mod postgres_news_repository;
pub mod postgres_project_repository;
pub mod postgres_squad_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use postgres_invitation_repository::PostgresInvitationRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_news_repository::PostgresNewsRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_squad_repository::PostgresSquadRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::membership::MembershipPlan;
use crate::domain::repositories::RepositoryError;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(conflict_message(db_err.constraint()).to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::NotFound("Referenced record".to_string());
            }
        }
        RepositoryError::Database(err.to_string())
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("profiles_email_key") => "Email already registered",
        Some("user_teams_user_team_role_key") => "User already holds this role in the team",
        Some("user_squads_user_squad_key") => "User is already a member of this squad",
        _ => "Record already exists",
    }
}

/// Fails with `NotFound` when an UPDATE or DELETE touched no row
pub(crate) fn ensure_affected(rows: u64, entity: &str) -> Result<(), RepositoryError> {
    if rows == 0 {
        return Err(RepositoryError::NotFound(entity.to_string()));
    }
    Ok(())
}

/// Writes the team and squad seats of `plan` for `user_id` inside `tx`
pub(crate) async fn insert_memberships(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    plan: &MembershipPlan,
) -> Result<(), sqlx::Error> {
    for seat in &plan.teams {
        sqlx::query(
            r#"
            INSERT INTO user_teams (user_id, team_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, team_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(seat.team_id)
        .bind(seat.role)
        .execute(&mut **tx)
        .await?;
    }

    for seat in &plan.squads {
        sqlx::query(
            r#"
            INSERT INTO user_squads (user_id, squad_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, squad_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(user_id)
        .bind(seat.squad_id)
        .bind(seat.role)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Drops every seat of `user_id` and writes the seats of `plan` inside `tx`
pub(crate) async fn replace_memberships(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    plan: &MembershipPlan,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_teams WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM user_squads WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    insert_memberships(tx, user_id, plan).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_constraint_maps_to_registration_message() {
        assert_eq!(
            conflict_message(Some("profiles_email_key")),
            "Email already registered"
        );
        assert_eq!(conflict_message(None), "Record already exists");
    }

    #[test]
    fn untouched_rows_are_not_found() {
        assert_eq!(
            ensure_affected(0, "Team"),
            Err(RepositoryError::NotFound("Team".to_string()))
        );
        assert!(ensure_affected(1, "Team").is_ok());
    }
}
