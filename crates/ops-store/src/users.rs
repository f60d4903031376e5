// users.rs — User, branch, and team queries.

use ops_model::{Branch, Role, Team, User};
use rusqlite::{params, OptionalExtension, Row};

use crate::convert::{enum_from_sql, enum_to_sql, json_from_sql, json_to_sql};
use crate::error::StoreError;
use crate::Store;

fn user_from_row(row: &Row<'_>) -> Result<User, StoreError> {
    Ok(User {
        id: row.get::<_, String>(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        role: enum_from_sql(&row.get::<_, String>(3)?)?,
        branch_id: row.get(4)?,
        can_import: row.get::<_, i64>(5)? != 0,
        can_export: row.get::<_, i64>(6)? != 0,
        credential: row.get(7)?,
        allowed_report_types: json_from_sql(&row.get::<_, String>(8)?)?,
    })
}

const USER_COLUMNS: &str = "id, username, display_name, role, branch_id, \
                            can_import, can_export, credential, allowed_report_types";

impl Store {
    pub fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, display_name, role, branch_id, \
             can_import, can_export, credential, allowed_report_types) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id,
                user.username,
                user.display_name,
                enum_to_sql(&user.role)?,
                user.branch_id,
                user.can_import as i64,
                user.can_export as i64,
                user.credential,
                json_to_sql(&user.allowed_report_types)?,
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<User, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            |row| Ok(user_from_row(row)),
        )
        .optional()?
        .transpose()?
        .ok_or_else(|| StoreError::not_found("user", id))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            |row| Ok(user_from_row(row)),
        )
        .optional()?
        .transpose()
    }

    /// All users holding the admin role (notification fan-out base set).
    pub fn list_admins(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE role = ?1"))?;
        let rows = stmt.query_map(params![enum_to_sql(&Role::Admin)?], |row| {
            Ok(user_from_row(row))
        })?;
        let mut admins = Vec::new();
        for row in rows {
            admins.push(row??);
        }
        Ok(admins)
    }

    /// Replace a user's stored credential (opportunistic rehash on login).
    pub fn update_credential(&self, user_id: &str, credential: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET credential = ?1 WHERE id = ?2",
            params![credential, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("user", user_id));
        }
        Ok(())
    }

    pub fn insert_branch(&self, branch: &Branch) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO branches (id, name) VALUES (?1, ?2)",
            params![branch.id, branch.name],
        )?;
        Ok(())
    }

    pub fn list_branches(&self) -> Result<Vec<Branch>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM branches ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Branch {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut branches = Vec::new();
        for row in rows {
            branches.push(row?);
        }
        Ok(branches)
    }

    pub fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO teams (id, name, leader_id) VALUES (?1, ?2, ?3)",
            params![team.id, team.name, team.leader_id],
        )?;
        Ok(())
    }

    pub fn get_team(&self, id: &str) -> Result<Option<Team>, StoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, leader_id FROM teams WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Team {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        leader_id: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }
}
