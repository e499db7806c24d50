use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::{like_pattern, map_sqlx_error};
use crate::domain::repositories::{Page, RepositoryError, TeamQuery, TeamRepository, Visibility};
use crate::domain::team::{MaxSize, Member, MemberRole, Team, TeamCode};

const TEAM_COLUMNS: &str = "t.id, t.name, t.code, t.description, t.department_id, t.manager_id, \
     t.leader_id, t.max_size, t.is_active, t.created_by, t.created_at, t.updated_at, t.version";

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    code: String,
    description: Option<String>,
    department_id: Uuid,
    manager_id: Option<Uuid>,
    leader_id: Option<Uuid>,
    max_size: i32,
    is_active: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    team_id: Uuid,
    user_id: Uuid,
    role: String,
    joined_date: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> Result<Member, RepositoryError> {
        let role: MemberRole = self.role.parse().map_err(RepositoryError::Database)?;
        Ok(Member::new(self.user_id, role, self.joined_date))
    }
}

impl TeamRow {
    fn into_team(self, members: Vec<Member>) -> Result<Team, RepositoryError> {
        let code = TeamCode::new(self.code).map_err(RepositoryError::Database)?;
        let max_size = u32::try_from(self.max_size)
            .map_err(|e| e.to_string())
            .and_then(MaxSize::new)
            .map_err(RepositoryError::Database)?;

        Ok(Team::from_persistence(
            self.id,
            self.name,
            code,
            self.description,
            self.department_id,
            self.manager_id,
            self.leader_id,
            max_size,
            self.is_active,
            members,
            self.created_by,
            self.created_at,
            self.updated_at,
            self.version,
        ))
    }
}

/// PostgreSQL implementation of TeamRepository
///
/// Teams live in `teams`, memberships in `team_members` ordered by
/// `position`. Writes touch the team row and its member rows in one
/// transaction; `version` is compared and bumped on every update.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_members(&self, team_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Member>>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT team_id, user_id, role, joined_date
            FROM team_members
            WHERE team_id = ANY($1)
            ORDER BY team_id, position
            "#,
        )
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "load team members"))?;

        let mut members: HashMap<Uuid, Vec<Member>> = HashMap::new();
        for row in rows {
            let team_id = row.team_id;
            members.entry(team_id).or_default().push(row.into_member()?);
        }
        Ok(members)
    }

    async fn hydrate(&self, rows: Vec<TeamRow>) -> Result<Vec<Team>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut members = self.load_members(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let team_members = members.remove(&row.id).unwrap_or_default();
                row.into_team(team_members)
            })
            .collect()
    }

    async fn find_one(&self, lookup: Lookup<'_>) -> Result<Option<Team>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM teams t WHERE ", TEAM_COLUMNS));
        match lookup {
            Lookup::Id(id) => builder.push("t.id = ").push_bind(id),
            Lookup::Code(code) => builder.push("t.code = ").push_bind(code.as_str().to_string()),
        };

        let row = builder
            .build_query_as::<TeamRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "find team"))?;

        match row {
            None => Ok(None),
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
        }
    }
}

async fn write_members(tx: &mut Transaction<'_, Postgres>, team: &Team) -> Result<(), RepositoryError> {
    for (position, member) in team.members().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, joined_date, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(team.id())
        .bind(member.user_id)
        .bind(member.role.as_str())
        .bind(member.joined_date)
        .bind(position as i32)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(e, "write team member"))?;
    }
    Ok(())
}

enum Lookup<'a> {
    Id(Uuid),
    Code(&'a TeamCode),
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TeamQuery) {
    builder.push(" WHERE TRUE");

    match query.visibility {
        Visibility::All => {}
        Visibility::ManagedBy(id) => {
            builder.push(" AND t.manager_id = ").push_bind(id);
        }
        Visibility::LedBy(id) => {
            builder.push(" AND t.leader_id = ").push_bind(id);
        }
        Visibility::MemberOf(id) => {
            builder
                .push(" AND EXISTS (SELECT 1 FROM team_members m WHERE m.team_id = t.id AND m.user_id = ")
                .push_bind(id)
                .push(")");
        }
    }

    if let Some(department_id) = query.department_id {
        builder.push(" AND t.department_id = ").push_bind(department_id);
    }
    if let Some(is_active) = query.is_active {
        builder.push(" AND t.is_active = ").push_bind(is_active);
    }
    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (t.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn insert(&self, team: &Team) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, "begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO teams (
                id, name, code, description, department_id, manager_id,
                leader_id, max_size, is_active, created_by, created_at, updated_at, version
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.code().as_str())
        .bind(team.description())
        .bind(team.department_id())
        .bind(team.manager_id())
        .bind(team.leader_id())
        .bind(team.max_size().get() as i32)
        .bind(team.is_active())
        .bind(team.created_by())
        .bind(team.created_at())
        .bind(team.updated_at())
        .bind(team.version())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "insert team"))?;

        write_members(&mut tx, team).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, "commit team"))
    }

    async fn update(&self, team: &Team) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, "begin transaction"))?;

        // Concurrent writers queue on the row lock; the loser sees the
        // bumped version and matches no row
        let result = sqlx::query(
            r#"
            UPDATE teams SET
                name = $3,
                description = $4,
                manager_id = $5,
                leader_id = $6,
                max_size = $7,
                is_active = $8,
                updated_at = $9,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(team.id())
        .bind(team.version())
        .bind(team.name())
        .bind(team.description())
        .bind(team.manager_id())
        .bind(team.leader_id())
        .bind(team.max_size().get() as i32)
        .bind(team.is_active())
        .bind(team.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "update team"))?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE id = $1)")
                .bind(team.id())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(e, "check team"))?;
            let subject = format!("Team {}", team.id());
            return Err(if exists {
                RepositoryError::StaleWrite(subject)
            } else {
                RepositoryError::NotFound(subject)
            });
        }

        sqlx::query("DELETE FROM team_members WHERE team_id = $1")
            .bind(team.id())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(e, "clear team members"))?;
        write_members(&mut tx, team).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, "commit team"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>, RepositoryError> {
        self.find_one(Lookup::Id(id)).await
    }

    async fn find_by_code(&self, code: &TeamCode) -> Result<Option<Team>, RepositoryError> {
        self.find_one(Lookup::Code(code)).await
    }

    async fn list(&self, query: &TeamQuery) -> Result<Page<Team>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM teams t");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "count teams"))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM teams t", TEAM_COLUMNS));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY t.created_at DESC, t.code ASC LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(query.page.offset() as i64);

        let rows = select
            .build_query_as::<TeamRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "list teams"))?;

        let teams = self.hydrate(rows).await?;
        Ok(Page::new(teams, total.max(0) as u64, query.page))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete team"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Team {}", id)));
        }

        Ok(())
    }
}
