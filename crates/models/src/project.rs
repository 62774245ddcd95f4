use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Technology tags stored as a JSONB array; serializes as a plain JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Technologies(pub Vec<String>);

impl From<Vec<String>> for Technologies {
    fn from(v: Vec<String>) -> Self { Self(v) }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub github_url: String,
    pub live_url: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub technologies: Technologies,
    pub featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[serde(skip)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() { return Err(ModelError::Validation("name required".into())); }
    if name.len() > 255 { return Err(ModelError::Validation("name too long (<=255)".into())); }
    Ok(())
}

/// Empty is allowed (field not set); otherwise must be an absolute http(s) URL.
pub fn validate_url(field: &str, url: &str) -> Result<(), ModelError> {
    if url.is_empty() { return Ok(()); }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ModelError::Validation(format!("{field} must start with http(s)")));
    }
    if url.len() > 500 {
        return Err(ModelError::Validation(format!("{field} too long (<=500)")));
    }
    Ok(())
}

/// Trim tags and drop empty ones, keeping first-seen order.
pub fn normalize_technologies(tags: Vec<String>) -> Technologies {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for t in tags {
        let t = t.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    Technologies(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_rules() {
        assert!(validate_url("github_url", "").is_ok());
        assert!(validate_url("github_url", "https://github.com/x").is_ok());
        assert!(validate_url("live_url", "ftp://x").is_err());
    }

    #[test]
    fn technologies_are_trimmed_and_deduplicated() {
        let t = normalize_technologies(vec![" Rust ".into(), "".into(), "Go".into(), "Rust".into()]);
        assert_eq!(t.0, vec!["Rust".to_string(), "Go".to_string()]);
    }

    #[test]
    fn technologies_serialize_as_array() {
        let t = Technologies(vec!["Rust".into()]);
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"["Rust"]"#);
    }
}
