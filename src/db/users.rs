//! Users, profiles and opaque access tokens.
//!
//! This is the thin identity surface the core consumes: it maps a presented
//! token to an acting user and resolves profile ids. Credential handling is
//! left to whatever issues the tokens.

use super::{Database, now_ms};
use crate::types::{ProfileId, User, UserId, UserProfile};
use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "p.id, p.user_id, u.username, p.bio, p.avatar";

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        is_staff: row.get("is_staff")?,
        date_joined: row.get("date_joined")?,
    })
}

pub(crate) fn parse_profile_row(row: &Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        bio: row.get(3)?,
        avatar: row.get(4)?,
    })
}

pub(crate) fn get_profile_internal(
    conn: &Connection,
    profile_id: ProfileId,
) -> Result<Option<UserProfile>> {
    let profile = conn
        .query_row(
            &format!(
                "SELECT {PROFILE_COLUMNS} FROM user_profiles p
                 JOIN users u ON u.id = p.user_id
                 WHERE p.id = ?1"
            ),
            params![profile_id],
            parse_profile_row,
        )
        .optional()?;
    Ok(profile)
}

impl Database {
    /// Create a user together with its profile.
    pub fn create_user(&self, username: &str, is_staff: bool) -> Result<(User, UserProfile)> {
        let username = username.trim();
        if username.is_empty() {
            bail!("username must not be empty");
        }
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO users (username, is_staff, date_joined) VALUES (?1, ?2, ?3)",
                params![username, is_staff, now],
            )?;
            let user_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO user_profiles (user_id) VALUES (?1)",
                params![user_id],
            )?;
            let profile_id = tx.last_insert_rowid();

            tx.commit()?;

            Ok((
                User {
                    id: user_id,
                    username: username.to_string(),
                    is_staff,
                    date_joined: now,
                },
                UserProfile {
                    id: profile_id,
                    user_id,
                    username: username.to_string(),
                    bio: String::new(),
                    avatar: None,
                },
            ))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT * FROM users WHERE username = ?1",
                    params![username],
                    parse_user_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Delete a user. Cascades to the profile, tokens and owned projects.
    pub fn delete_user(&self, user_id: UserId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
            Ok(deleted > 0)
        })
    }

    /// Issue a fresh opaque token for a user.
    pub fn issue_token(&self, user_id: UserId) -> Result<String> {
        let key = Uuid::new_v4().simple().to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO auth_tokens (key, user_id, created) VALUES (?1, ?2, ?3)",
                params![key, user_id, now_ms()],
            )?;
            Ok(())
        })?;
        Ok(key)
    }

    /// Resolve a presented token to its user.
    pub fn user_for_token(&self, key: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT u.* FROM auth_tokens t
                     JOIN users u ON u.id = t.user_id
                     WHERE t.key = ?1",
                    params![key],
                    parse_user_row,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Revoke every token held by a user.
    pub fn revoke_tokens(&self, user_id: UserId) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM auth_tokens WHERE user_id = ?1", params![user_id])?;
            Ok(n)
        })
    }

    /// Look up any profile by id. Not scoped: any existing profile is assignable.
    pub fn get_profile(&self, profile_id: ProfileId) -> Result<Option<UserProfile>> {
        self.with_conn(|conn| get_profile_internal(conn, profile_id))
    }

    pub fn profile_for_user(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        self.with_conn(|conn| {
            let profile = conn
                .query_row(
                    &format!(
                        "SELECT {PROFILE_COLUMNS} FROM user_profiles p
                         JOIN users u ON u.id = p.user_id
                         WHERE p.user_id = ?1"
                    ),
                    params![user_id],
                    parse_profile_row,
                )
                .optional()?;
            Ok(profile)
        })
    }

    /// Profiles visible to a user: their own, or all of them for staff.
    pub fn visible_profiles(&self, user: &User) -> Result<Vec<UserProfile>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROFILE_COLUMNS} FROM user_profiles p
                 JOIN users u ON u.id = p.user_id
                 WHERE ?1 OR p.user_id = ?2
                 ORDER BY p.id"
            ))?;
            let profiles = stmt
                .query_map(params![user.is_staff, user.id], parse_profile_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(profiles)
        })
    }

    /// Update the free-form profile fields.
    pub fn update_profile(
        &self,
        profile_id: ProfileId,
        bio: Option<&str>,
        avatar: Option<Option<&str>>,
    ) -> Result<Option<UserProfile>> {
        self.with_conn(|conn| {
            if let Some(bio) = bio {
                conn.execute(
                    "UPDATE user_profiles SET bio = ?1 WHERE id = ?2",
                    params![bio, profile_id],
                )?;
            }
            if let Some(avatar) = avatar {
                conn.execute(
                    "UPDATE user_profiles SET avatar = ?1 WHERE id = ?2",
                    params![avatar, profile_id],
                )?;
            }
            get_profile_internal(conn, profile_id)
        })
    }

    /// Delete a profile. Tasks assigned to it are unassigned, not removed.
    pub fn delete_profile(&self, profile_id: ProfileId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted =
                conn.execute("DELETE FROM user_profiles WHERE id = ?1", params![profile_id])?;
            Ok(deleted > 0)
        })
    }
}
