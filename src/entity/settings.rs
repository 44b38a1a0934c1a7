use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub site_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub site_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notification_sender: Option<String>,
    pub notifications_enabled: i32,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text", nullable)]
    pub token_secret: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub media_path: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
