use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ensure_affected;
use crate::domain::membership::{SquadMembership, TeamMembership};
use crate::domain::repositories::{MembershipRepository, RepositoryResult};
use crate::domain::roles::{SquadRole, TeamRole};

type TeamSeatRow = (Uuid, Uuid, TeamRole);
type SquadSeatRow = (Uuid, Uuid, Uuid, SquadRole);

const TEAM_SEAT_SELECT: &str = r#"
    SELECT ut.user_id, ut.team_id, ut.role
    FROM user_teams ut
    JOIN teams t ON t.id = ut.team_id
"#;

const SQUAD_SEAT_SELECT: &str = r#"
    SELECT us.user_id, us.squad_id, s.team_id, us.role
    FROM user_squads us
    JOIN squads s ON s.id = us.squad_id
"#;

fn team_seat((user_id, team_id, role): TeamSeatRow) -> TeamMembership {
    TeamMembership {
        user_id,
        team_id,
        role,
    }
}

fn squad_seat((user_id, squad_id, team_id, role): SquadSeatRow) -> SquadMembership {
    SquadMembership {
        user_id,
        squad_id,
        team_id,
        role,
    }
}

/// PostgreSQL implementation of MembershipRepository
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Team seats matching `filter`, which may reference `id` as `$1`
    async fn team_seats(&self, filter: &str, id: Option<Uuid>) -> RepositoryResult<Vec<TeamMembership>> {
        let sql = format!("{TEAM_SEAT_SELECT} {filter} ORDER BY t.name, ut.role");
        let mut query = sqlx::query_as::<_, TeamSeatRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(team_seat).collect())
    }

    async fn squad_seats(&self, filter: &str, id: Option<Uuid>) -> RepositoryResult<Vec<SquadMembership>> {
        let sql = format!("{SQUAD_SEAT_SELECT} {filter} ORDER BY s.name");
        let mut query = sqlx::query_as::<_, SquadSeatRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(squad_seat).collect())
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn teams_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<TeamMembership>> {
        self.team_seats("WHERE ut.user_id = $1", Some(user_id)).await
    }

    async fn squads_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<SquadMembership>> {
        self.squad_seats("WHERE us.user_id = $1", Some(user_id)).await
    }

    async fn team_members(&self, team_id: Uuid) -> RepositoryResult<Vec<TeamMembership>> {
        self.team_seats("WHERE ut.team_id = $1", Some(team_id)).await
    }

    async fn squad_members(&self, squad_id: Uuid) -> RepositoryResult<Vec<SquadMembership>> {
        self.squad_seats("WHERE us.squad_id = $1", Some(squad_id)).await
    }

    async fn all_team_memberships(&self) -> RepositoryResult<Vec<TeamMembership>> {
        self.team_seats("", None).await
    }

    async fn all_squad_memberships(&self) -> RepositoryResult<Vec<SquadMembership>> {
        self.squad_seats("", None).await
    }

    async fn add_team_role(&self, membership: &TeamMembership) -> RepositoryResult<()> {
        sqlx::query("INSERT INTO user_teams (user_id, team_id, role) VALUES ($1, $2, $3)")
            .bind(membership.user_id)
            .bind(membership.team_id)
            .bind(membership.role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_team_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "DELETE FROM user_teams WHERE team_id = $1 AND user_id = $2 AND role = $3",
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        ensure_affected(result.rows_affected(), "Membership")
    }
}
