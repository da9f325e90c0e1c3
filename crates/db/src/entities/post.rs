//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Media kinds attached to posts.
///
/// Media bytes live in external storage; the core only carries an opaque
/// URL plus this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media reference attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Opaque URL of the stored media.
    pub url: String,
    /// Media kind tag.
    pub kind: MediaKind,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Post text content
    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Attached media references (array of [`MediaItem`])
    #[sea_orm(column_type = "JsonBinary")]
    pub media: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Parse the attached media references.
    #[must_use]
    pub fn media_items(&self) -> Vec<MediaItem> {
        serde_json::from_value(self.media.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_media_items_round_trip() {
        let items = vec![
            MediaItem {
                url: "https://cdn.example/a.png".to_string(),
                kind: MediaKind::Image,
            },
            MediaItem {
                url: "https://cdn.example/b.mp4".to_string(),
                kind: MediaKind::Video,
            },
        ];
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["kind"], "image");
        assert_eq!(json[1]["kind"], "video");

        let parsed: Vec<MediaItem> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_media_items_tolerates_malformed_json() {
        let model = Model {
            id: "p1".to_string(),
            author_id: "u1".to_string(),
            text: "hello".to_string(),
            media: serde_json::json!({"not": "an array"}),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };
        assert!(model.media_items().is_empty());
    }
}
