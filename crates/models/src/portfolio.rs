use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub email: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub social_links: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub settings: Option<Json>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    Ok(())
}

/// Opaque JSON blobs must still be objects so the frontend can index into them.
pub fn validate_json_object(field: &str, value: &Option<Json>) -> Result<(), ModelError> {
    match value {
        None | Some(Json::Null) | Some(Json::Object(_)) => Ok(()),
        Some(_) => Err(ModelError::Validation(format!("{field} must be a JSON object"))),
    }
}
