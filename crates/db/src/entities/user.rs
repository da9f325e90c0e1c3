//! User entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User roles.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum Role {
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    /// Access token resolved by the auth middleware
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    /// Display name
    #[sea_orm(nullable)]
    pub name: Option<String>,

    /// Profile bio
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    /// Avatar URL
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Role
    pub role: Role,

    /// Is this account active? false = banned
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Reason the account was banned
    #[sea_orm(nullable)]
    pub banned_reason: Option<String>,

    /// Ban expiry; NULL = permanent
    #[sea_orm(nullable)]
    pub banned_until: Option<DateTimeWithTimeZone>,

    /// Followers count (denormalized)
    #[sea_orm(default_value = 0)]
    pub followers_count: i32,

    /// Following count (denormalized)
    #[sea_orm(default_value = 0)]
    pub following_count: i32,

    /// Posts count (denormalized)
    #[sea_orm(default_value = 0)]
    pub posts_count: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Whether this user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this user is currently banned.
    ///
    /// A ban with an expiry in the past no longer counts as banned; a ban
    /// without an expiry is permanent.
    #[must_use]
    pub fn is_banned(&self, now: DateTime<Utc>) -> bool {
        if self.is_active {
            return false;
        }
        match self.banned_until {
            Some(until) => until > now,
            None => true,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(is_active: bool, banned_until: Option<DateTime<Utc>>) -> Model {
        Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            token: None,
            name: None,
            bio: None,
            avatar_url: None,
            role: Role::User,
            is_active,
            banned_reason: None,
            banned_until: banned_until.map(Into::into),
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_active_user_is_not_banned() {
        let now = Utc::now();
        assert!(!user(true, None).is_banned(now));
    }

    #[test]
    fn test_permanent_ban() {
        let now = Utc::now();
        assert!(user(false, None).is_banned(now));
    }

    #[test]
    fn test_temporary_ban_expires() {
        let now = Utc::now();
        assert!(user(false, Some(now + Duration::days(1))).is_banned(now));
        assert!(!user(false, Some(now - Duration::days(1))).is_banned(now));
    }
}
