//! Abuse report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report status.
///
/// Transitions: `pending -> resolved` and `pending -> dismissed`, exactly
/// once. No transition leaves `resolved` or `dismissed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "dismissed")]
    Dismissed,
}

/// Report reason codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReportReason {
    #[sea_orm(string_value = "spam")]
    Spam,
    #[sea_orm(string_value = "harassment")]
    Harassment,
    #[sea_orm(string_value = "inappropriate")]
    Inappropriate,
    #[sea_orm(string_value = "violence")]
    Violence,
    #[sea_orm(string_value = "hate_speech")]
    HateSpeech,
    #[sea_orm(string_value = "misinformation")]
    Misinformation,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Abuse report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who submitted the report.
    pub reporter_id: String,

    /// Reported user; exactly one of this and `reported_post_id` is set.
    #[sea_orm(nullable)]
    pub reported_user_id: Option<String>,

    /// Reported post; exactly one of this and `reported_user_id` is set.
    #[sea_orm(nullable)]
    pub reported_post_id: Option<String>,

    /// Reason code.
    pub reason: ReportReason,

    /// Optional free-text description.
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Current status of the report.
    pub status: ReportStatus,

    /// Admin who resolved the report; NULL for the automatic sweep.
    #[sea_orm(nullable)]
    pub resolver_id: Option<String>,

    /// When the report left `pending`.
    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,

    /// When the report was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl ActiveModelBehavior for ActiveModel {}
