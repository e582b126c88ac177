//! Shared fixtures for the HTTP integration tests
//!
//! `InMemoryStore` implements every repository trait over plain vectors so
//! the full router can be driven without a database.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use teamhub_api::api::{build_router, AppState};
use teamhub_api::auth::jwt::create_token;
use teamhub_api::auth::password::hash_password;
use teamhub_api::config::AppConfig;
use teamhub_api::domain::invitation::Invitation;
use teamhub_api::domain::membership::{MembershipPlan, SquadMembership, TeamMembership};
use teamhub_api::domain::news::{News, NewsDetails};
use teamhub_api::domain::project::Project;
use teamhub_api::domain::repositories::{
    InvitationEntry, InvitationRepository, MembershipRepository, NewsEntry, NewsRepository,
    ProjectEntry, ProjectMember, ProjectRepository, RepositoryError, RepositoryResult,
    SquadRepository, SquadSummary, TeamRepository, TeamSummary, UserAccount, UserRepository,
};
use teamhub_api::domain::roles::{SquadRole, TeamRole};
use teamhub_api::domain::squad::Squad;
use teamhub_api::domain::team::{Leadership, Team, TeamDetails};
use teamhub_api::domain::user::{Email, Profile};
use teamhub_api::infrastructure::storage::LocalObjectStorage;
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";
pub const PASSWORD: &str = "password123";

#[derive(Default)]
struct Data {
    accounts: Vec<UserAccount>,
    team_members: Vec<TeamMembership>,
    squad_members: Vec<SquadMembership>,
    teams: Vec<Team>,
    squads: Vec<Squad>,
    news: Vec<News>,
    projects: Vec<(Project, Vec<Uuid>)>,
    invitations: Vec<Invitation>,
}

impl Data {
    fn email_taken(&self, email: &Email, except: Option<Uuid>) -> bool {
        self.accounts
            .iter()
            .any(|a| &a.profile.email == email && Some(a.profile.id) != except)
    }

    fn team_name(&self, team_id: Option<Uuid>) -> Option<String> {
        let team_id = team_id?;
        self.teams
            .iter()
            .find(|t| t.id() == team_id)
            .map(|t| t.name().to_string())
    }

    fn profile(&self, user_id: Uuid) -> Option<&Profile> {
        self.accounts
            .iter()
            .map(|a| &a.profile)
            .find(|p| p.id == user_id)
    }

    fn write_plan(&mut self, user_id: Uuid, plan: &MembershipPlan) -> RepositoryResult<()> {
        for seat in &plan.teams {
            if !self.teams.iter().any(|t| t.id() == seat.team_id) {
                return Err(RepositoryError::NotFound("Referenced record".to_string()));
            }
            let row = TeamMembership {
                user_id,
                team_id: seat.team_id,
                role: seat.role,
            };
            if !self.team_members.contains(&row) {
                self.team_members.push(row);
            }
        }
        for seat in &plan.squads {
            let squad = self
                .squads
                .iter()
                .find(|s| s.id == seat.squad_id)
                .ok_or_else(|| RepositoryError::NotFound("Referenced record".to_string()))?;
            let team_id = squad.team_id;
            self.squad_members
                .retain(|m| !(m.user_id == user_id && m.squad_id == seat.squad_id));
            self.squad_members.push(SquadMembership {
                user_id,
                squad_id: seat.squad_id,
                team_id,
                role: seat.role,
            });
        }
        Ok(())
    }

    fn in_teams(team_id: Option<Uuid>, teams: Option<&[Uuid]>) -> bool {
        match teams {
            None => true,
            Some(ids) => team_id.is_some_and(|t| ids.contains(&t)),
        }
    }
}

/// Every repository backed by one shared set of vectors
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<Mutex<Data>>,
}

impl InMemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut Data) -> T) -> T {
        let mut data = self.data.lock().unwrap();
        f(&mut data)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        account: &UserAccount,
        memberships: &MembershipPlan,
        invitation_id: Option<Uuid>,
    ) -> RepositoryResult<()> {
        self.with(|d| {
            if let Some(id) = invitation_id {
                let inv = d
                    .invitations
                    .iter()
                    .find(|i| i.id == id)
                    .ok_or_else(|| RepositoryError::NotFound("Invitation".to_string()))?;
                if inv.used {
                    return Err(RepositoryError::Conflict(
                        "Invitation has already been used".to_string(),
                    ));
                }
            }
            if d.email_taken(&account.profile.email, None) {
                return Err(RepositoryError::Conflict("Email already registered".to_string()));
            }

            d.accounts.push(account.clone());
            d.write_plan(account.profile.id, memberships)?;

            if let Some(id) = invitation_id {
                for inv in d.invitations.iter_mut().filter(|i| i.id == id) {
                    inv.used = true;
                }
            }
            Ok(())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Profile>> {
        Ok(self.with(|d| d.profile(id).cloned()))
    }

    async fn find_account_by_id(&self, id: Uuid) -> RepositoryResult<Option<UserAccount>> {
        Ok(self.with(|d| d.accounts.iter().find(|a| a.profile.id == id).cloned()))
    }

    async fn find_account_by_email(&self, email: &Email) -> RepositoryResult<Option<UserAccount>> {
        Ok(self.with(|d| d.accounts.iter().find(|a| &a.profile.email == email).cloned()))
    }

    async fn list(&self) -> RepositoryResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> =
            self.with(|d| d.accounts.iter().map(|a| a.profile.clone()).collect());
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn find_many(&self, ids: &[Uuid]) -> RepositoryResult<Vec<Profile>> {
        Ok(self.with(|d| {
            d.accounts
                .iter()
                .filter(|a| ids.contains(&a.profile.id))
                .map(|a| a.profile.clone())
                .collect()
        }))
    }

    async fn update(
        &self,
        profile: &Profile,
        memberships: Option<&MembershipPlan>,
    ) -> RepositoryResult<()> {
        self.with(|d| {
            if d.email_taken(&profile.email, Some(profile.id)) {
                return Err(RepositoryError::Conflict("Email already registered".to_string()));
            }
            if !d.accounts.iter().any(|a| a.profile.id == profile.id) {
                return Err(RepositoryError::NotFound("User".to_string()));
            }

            if let Some(plan) = memberships {
                let snapshot = (d.team_members.clone(), d.squad_members.clone());
                d.team_members.retain(|m| m.user_id != profile.id);
                d.squad_members.retain(|m| m.user_id != profile.id);
                if let Err(err) = d.write_plan(profile.id, plan) {
                    (d.team_members, d.squad_members) = snapshot;
                    return Err(err);
                }
            }

            if let Some(account) = d.accounts.iter_mut().find(|a| a.profile.id == profile.id) {
                account.profile = profile.clone();
            }
            Ok(())
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepositoryResult<()> {
        self.with(|d| {
            let account = d
                .accounts
                .iter_mut()
                .find(|a| a.profile.id == id)
                .ok_or_else(|| RepositoryError::NotFound("User".to_string()))?;
            account.password_hash = password_hash.to_string();
            Ok(())
        })
    }

    async fn update_last_login(&self, _id: Uuid) -> RepositoryResult<()> {
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.accounts.len();
            d.accounts.retain(|a| a.profile.id != id);
            if d.accounts.len() == before {
                return Err(RepositoryError::NotFound("User".to_string()));
            }
            d.team_members.retain(|m| m.user_id != id);
            d.squad_members.retain(|m| m.user_id != id);
            d.news.retain(|n| n.author_id != id);
            Ok(())
        })
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.with(|d| d.accounts.len() as i64))
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn teams_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<TeamMembership>> {
        Ok(self.with(|d| {
            d.team_members
                .iter()
                .filter(|m| m.user_id == user_id)
                .copied()
                .collect()
        }))
    }

    async fn squads_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<SquadMembership>> {
        Ok(self.with(|d| {
            d.squad_members
                .iter()
                .filter(|m| m.user_id == user_id)
                .copied()
                .collect()
        }))
    }

    async fn team_members(&self, team_id: Uuid) -> RepositoryResult<Vec<TeamMembership>> {
        Ok(self.with(|d| {
            d.team_members
                .iter()
                .filter(|m| m.team_id == team_id)
                .copied()
                .collect()
        }))
    }

    async fn squad_members(&self, squad_id: Uuid) -> RepositoryResult<Vec<SquadMembership>> {
        Ok(self.with(|d| {
            d.squad_members
                .iter()
                .filter(|m| m.squad_id == squad_id)
                .copied()
                .collect()
        }))
    }

    async fn all_team_memberships(&self) -> RepositoryResult<Vec<TeamMembership>> {
        Ok(self.with(|d| d.team_members.clone()))
    }

    async fn all_squad_memberships(&self) -> RepositoryResult<Vec<SquadMembership>> {
        Ok(self.with(|d| d.squad_members.clone()))
    }

    async fn add_team_role(&self, membership: &TeamMembership) -> RepositoryResult<()> {
        self.with(|d| {
            if d.team_members.contains(membership) {
                return Err(RepositoryError::Conflict(
                    "User already holds this role in the team".to_string(),
                ));
            }
            d.team_members.push(*membership);
            Ok(())
        })
    }

    async fn remove_team_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.team_members.len();
            d.team_members
                .retain(|m| !(m.team_id == team_id && m.user_id == user_id && m.role == role));
            if d.team_members.len() == before {
                return Err(RepositoryError::NotFound("Membership".to_string()));
            }
            Ok(())
        })
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn create(&self, team: &Team, leadership: &Leadership) -> RepositoryResult<()> {
        self.with(|d| {
            d.teams.push(team.clone());
            replace_leadership(d, team.id(), leadership);
        });
        Ok(())
    }

    async fn update(&self, team: &Team, leadership: Option<&Leadership>) -> RepositoryResult<()> {
        self.with(|d| {
            let slot = d
                .teams
                .iter_mut()
                .find(|t| t.id() == team.id())
                .ok_or_else(|| RepositoryError::NotFound("Team".to_string()))?;
            *slot = team.clone();
            if let Some(leadership) = leadership {
                replace_leadership(d, team.id(), leadership);
            }
            Ok(())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        Ok(self.with(|d| d.teams.iter().find(|t| t.id() == id).cloned()))
    }

    async fn list(&self) -> RepositoryResult<Vec<TeamSummary>> {
        let mut summaries: Vec<TeamSummary> = self.with(|d| {
            d.teams
                .iter()
                .map(|t| {
                    let mut members: Vec<Uuid> = d
                        .team_members
                        .iter()
                        .filter(|m| m.team_id == t.id())
                        .map(|m| m.user_id)
                        .collect();
                    members.sort_unstable();
                    members.dedup();

                    TeamSummary {
                        team: t.clone(),
                        president_id: d
                            .team_members
                            .iter()
                            .find(|m| m.team_id == t.id() && m.role == TeamRole::President)
                            .map(|m| m.user_id),
                        squad_count: d.squads.iter().filter(|s| s.team_id == t.id()).count()
                            as i64,
                        member_count: members.len() as i64,
                    }
                })
                .collect()
        });
        summaries.sort_by(|a, b| a.team.name().cmp(b.team.name()));
        Ok(summaries)
    }

    async fn leadership(&self, team_id: Uuid) -> RepositoryResult<Leadership> {
        Ok(self.with(|d| {
            let seat = |role| {
                d.team_members
                    .iter()
                    .find(|m| m.team_id == team_id && m.role == role)
                    .map(|m| m.user_id)
            };
            Leadership {
                president_id: seat(TeamRole::President),
                vice_president_id: seat(TeamRole::VicePresident),
            }
        }))
    }

    async fn replace_leadership(&self, team_id: Uuid, leadership: &Leadership) -> RepositoryResult<()> {
        self.with(|d| replace_leadership(d, team_id, leadership));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.teams.len();
            d.teams.retain(|t| t.id() != id);
            if d.teams.len() == before {
                return Err(RepositoryError::NotFound("Team".to_string()));
            }
            d.team_members.retain(|m| m.team_id != id);
            d.squad_members.retain(|m| m.team_id != id);
            d.squads.retain(|s| s.team_id != id);
            d.news.retain(|n| n.team_id != Some(id));
            d.projects.retain(|(p, _)| p.team_id != Some(id));
            Ok(())
        })
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.with(|d| d.teams.len() as i64))
    }
}

fn replace_leadership(d: &mut Data, team_id: Uuid, leadership: &Leadership) {
    d.team_members
        .retain(|m| !(m.team_id == team_id && m.role.is_staff()));
    let seats = [
        (leadership.president_id, TeamRole::President),
        (leadership.vice_president_id, TeamRole::VicePresident),
    ];
    for (user_id, role) in seats {
        if let Some(user_id) = user_id {
            d.team_members.push(TeamMembership {
                user_id,
                team_id,
                role,
            });
        }
    }
}

#[async_trait]
impl SquadRepository for InMemoryStore {
    async fn save(&self, squad: &Squad) -> RepositoryResult<()> {
        self.with(|d| {
            d.squads.retain(|s| s.id != squad.id);
            d.squads.push(squad.clone());
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Squad>> {
        Ok(self.with(|d| d.squads.iter().find(|s| s.id == id).cloned()))
    }

    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<SquadSummary>> {
        let mut squads: Vec<SquadSummary> = self.with(|d| {
            d.squads
                .iter()
                .filter(|s| Data::in_teams(Some(s.team_id), teams))
                .map(|s| SquadSummary {
                    squad: s.clone(),
                    team_name: d.team_name(Some(s.team_id)).unwrap_or_default(),
                    member_count: d.squad_members.iter().filter(|m| m.squad_id == s.id).count()
                        as i64,
                })
                .collect()
        });
        squads.sort_by(|a, b| a.squad.name.cmp(&b.squad.name));
        Ok(squads)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.squads.len();
            d.squads.retain(|s| s.id != id);
            if d.squads.len() == before {
                return Err(RepositoryError::NotFound("Squad".to_string()));
            }
            d.squad_members.retain(|m| m.squad_id != id);
            Ok(())
        })
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        Ok(self.with(|d| {
            d.squads
                .iter()
                .filter(|s| Data::in_teams(Some(s.team_id), teams))
                .count() as i64
        }))
    }
}

#[async_trait]
impl NewsRepository for InMemoryStore {
    async fn save(&self, news: &News) -> RepositoryResult<()> {
        self.with(|d| {
            d.news.retain(|n| n.id != news.id);
            d.news.push(news.clone());
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<News>> {
        Ok(self.with(|d| d.news.iter().find(|n| n.id == id).cloned()))
    }

    async fn list(&self, teams: Option<&[Uuid]>, limit: Option<i64>) -> RepositoryResult<Vec<NewsEntry>> {
        Ok(self.with(|d| {
            let mut news: Vec<&News> = d
                .news
                .iter()
                .filter(|n| Data::in_teams(n.team_id, teams))
                .collect();
            news.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            news.into_iter()
                .take(limit.map_or(usize::MAX, |l| l as usize))
                .map(|n| {
                    let author = d.profile(n.author_id);
                    NewsEntry {
                        news: n.clone(),
                        team_name: d.team_name(n.team_id),
                        author_name: author.map(|p| p.name.clone()).unwrap_or_default(),
                        author_avatar_url: author.and_then(|p| p.avatar_url.clone()),
                    }
                })
                .collect()
        }))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.news.len();
            d.news.retain(|n| n.id != id);
            if d.news.len() == before {
                return Err(RepositoryError::NotFound("News".to_string()));
            }
            Ok(())
        })
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        Ok(self.with(|d| d.news.iter().filter(|n| Data::in_teams(n.team_id, teams)).count() as i64))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn save(&self, project: &Project, member_ids: &[Uuid]) -> RepositoryResult<()> {
        self.with(|d| {
            d.projects.retain(|(p, _)| p.id != project.id);
            d.projects.push((project.clone(), member_ids.to_vec()));
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Project>> {
        Ok(self.with(|d| {
            d.projects
                .iter()
                .find(|(p, _)| p.id == id)
                .map(|(p, _)| p.clone())
        }))
    }

    async fn members(&self, project_id: Uuid) -> RepositoryResult<Vec<ProjectMember>> {
        let mut members: Vec<ProjectMember> = self.with(|d| {
            d.projects
                .iter()
                .find(|(p, _)| p.id == project_id)
                .map(|(_, ids)| {
                    ids.iter()
                        .filter_map(|id| d.profile(*id))
                        .map(|p| ProjectMember {
                            id: p.id,
                            name: p.name.clone(),
                            is_admin: p.is_admin,
                        })
                        .collect()
                })
                .unwrap_or_default()
        });
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    async fn list(&self, teams: Option<&[Uuid]>) -> RepositoryResult<Vec<ProjectEntry>> {
        let mut entries: Vec<ProjectEntry> = self.with(|d| {
            d.projects
                .iter()
                .filter(|(p, _)| Data::in_teams(p.team_id, teams))
                .map(|(p, ids)| ProjectEntry {
                    project: p.clone(),
                    team_name: d.team_name(p.team_id),
                    member_count: ids.len() as i64,
                })
                .collect()
        });
        entries.sort_by(|a, b| b.project.created_at.cmp(&a.project.created_at));
        Ok(entries)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.with(|d| {
            let before = d.projects.len();
            d.projects.retain(|(p, _)| p.id != id);
            if d.projects.len() == before {
                return Err(RepositoryError::NotFound("Project".to_string()));
            }
            Ok(())
        })
    }

    async fn count(&self, teams: Option<&[Uuid]>) -> RepositoryResult<i64> {
        Ok(self.with(|d| {
            d.projects
                .iter()
                .filter(|(p, _)| Data::in_teams(p.team_id, teams))
                .count() as i64
        }))
    }
}

#[async_trait]
impl InvitationRepository for InMemoryStore {
    async fn create(&self, invitation: &Invitation) -> RepositoryResult<()> {
        self.with(|d| d.invitations.push(invitation.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<InvitationEntry>> {
        Ok(self.with(|d| {
            d.invitations.iter().find(|i| i.id == id).map(|i| InvitationEntry {
                invitation: i.clone(),
                team_name: d.team_name(i.team_id),
                squad_name: i
                    .squad_id
                    .and_then(|s| d.squads.iter().find(|sq| sq.id == s))
                    .map(|s| s.name.clone()),
            })
        }))
    }

    async fn list_by_creator(&self, user_id: Uuid) -> RepositoryResult<Vec<InvitationEntry>> {
        let ids: Vec<Uuid> = self.with(|d| {
            let mut own: Vec<&Invitation> = d
                .invitations
                .iter()
                .filter(|i| i.created_by == Some(user_id))
                .collect();
            own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            own.into_iter().map(|i| i.id).collect()
        });

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entry) = InvitationRepository::find_by_id(self, id).await? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

/// Router over an in-memory store plus a throwaway upload directory
pub struct TestApp {
    pub store: InMemoryStore,
    pub config: AppConfig,
    pub router: Router,
    _uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let uploads = TempDir::new().unwrap();
        let config = AppConfig {
            jwt_secret: JWT_SECRET.to_string(),
            upload_dir: uploads.path().to_path_buf(),
            ..config
        };
        let store = InMemoryStore::default();
        let storage = LocalObjectStorage::new(
            uploads.path(),
            &config.public_base_url,
            config.storage_buckets.clone(),
        );

        let state = AppState {
            config: Arc::new(config.clone()),
            users: Arc::new(store.clone()),
            memberships: Arc::new(store.clone()),
            teams: Arc::new(store.clone()),
            squads: Arc::new(store.clone()),
            news: Arc::new(store.clone()),
            projects: Arc::new(store.clone()),
            invitations: Arc::new(store.clone()),
            storage: Arc::new(storage),
        };

        Self {
            router: build_router(state),
            store,
            config,
            _uploads: uploads,
        }
    }

    /// Adds a user with `PASSWORD` and returns their profile
    pub fn user(&self, name: &str, email: &str, is_admin: bool) -> Profile {
        let profile = Profile::new(name, Email::new(email).unwrap(), is_admin).unwrap();
        let account = UserAccount {
            profile: profile.clone(),
            password_hash: hash_password(PASSWORD).unwrap(),
        };
        self.store.with(|d| d.accounts.push(account));
        profile
    }

    pub fn team(&self, name: &str) -> Team {
        let (team, _) = Team::new(TeamDetails {
            name: name.to_string(),
            ..Default::default()
        })
        .unwrap();
        self.store.with(|d| d.teams.push(team.clone()));
        team
    }

    pub fn squad(&self, name: &str, team_id: Uuid) -> Squad {
        let squad = Squad::new(name, team_id).unwrap();
        self.store.with(|d| d.squads.push(squad.clone()));
        squad
    }

    pub fn squads(&self) -> Vec<Squad> {
        self.store.with(|d| d.squads.clone())
    }

    pub fn join_team(&self, user_id: Uuid, team_id: Uuid, role: TeamRole) {
        self.store.with(|d| {
            d.team_members.push(TeamMembership {
                user_id,
                team_id,
                role,
            })
        });
    }

    pub fn join_squad(&self, user_id: Uuid, squad: &Squad, role: SquadRole) {
        self.store.with(|d| {
            d.squad_members.push(SquadMembership {
                user_id,
                squad_id: squad.id,
                team_id: squad.team_id,
                role,
            })
        });
    }

    pub fn news(&self, title: &str, team_id: Option<Uuid>, author_id: Uuid) -> News {
        let news = News::new(
            NewsDetails {
                title: title.to_string(),
                content: "Body".to_string(),
                team_id,
                ..Default::default()
            },
            author_id,
        )
        .unwrap();
        self.store.with(|d| d.news.push(news.clone()));
        news
    }

    pub fn invitation(&self, invitation: Invitation) -> Invitation {
        self.store.with(|d| d.invitations.push(invitation.clone()));
        invitation
    }

    pub fn invitation_used(&self, id: Uuid) -> bool {
        self.store
            .with(|d| d.invitations.iter().any(|i| i.id == id && i.used))
    }

    pub fn team_roles(&self, user_id: Uuid) -> Vec<(Uuid, TeamRole)> {
        self.store.with(|d| {
            d.team_members
                .iter()
                .filter(|m| m.user_id == user_id)
                .map(|m| (m.team_id, m.role))
                .collect()
        })
    }

    pub fn squad_roles(&self, user_id: Uuid) -> Vec<(Uuid, SquadRole)> {
        self.store.with(|d| {
            d.squad_members
                .iter()
                .filter(|m| m.user_id == user_id)
                .map(|m| (m.squad_id, m.role))
                .collect()
        })
    }

    pub fn token(&self, user_id: Uuid) -> String {
        create_token(user_id, JWT_SECRET, 1).unwrap()
    }

    /// Sends a request and returns status, headers and the JSON body
    /// (`Value::Null` when the body is empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            set_cookies,
            text,
            json,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookies: Vec<String>,
    pub text: String,
    pub json: Value,
}

impl TestResponse {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}=", name);
        self.set_cookies
            .iter()
            .find(|c| c.starts_with(&prefix))
            .map(String::as_str)
    }
}

/// Request builder with optional bearer token, active team cookie and JSON body
pub fn request(method: &str, uri: &str) -> RequestSpec {
    RequestSpec {
        method: method.to_string(),
        uri: uri.to_string(),
        token: None,
        active_team: None,
        body: None,
    }
}

pub struct RequestSpec {
    method: String,
    uri: String,
    token: Option<String>,
    active_team: Option<String>,
    body: Option<Value>,
}

impl RequestSpec {
    pub fn token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    pub fn active_team(mut self, team_id: impl ToString) -> Self {
        self.active_team = Some(team_id.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method.as_str()).uri(self.uri.as_str());
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(team) = &self.active_team {
            builder = builder.header(header::COOKIE, format!("selectedTeamId={}", team));
        }
        match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}
