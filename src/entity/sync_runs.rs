use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: SyncKind,
    pub trigger: SyncTrigger,
    pub started_at: DateTimeWithTimeZone,
    pub duration_ms: i64,
    pub total_vendors: i32,
    pub successful: i32,
    pub failed: i32,
    pub synced: i32,
    pub created: i32,
    pub updated: i32,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub results: Option<Json>,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SyncKind {
    #[sea_orm(string_value = "PLANTS")]
    #[serde(rename = "PLANTS")]
    Plants,

    #[sea_orm(string_value = "ALERTS")]
    #[serde(rename = "ALERTS")]
    Alerts,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SyncTrigger {
    // Background scheduler tick.
    #[sea_orm(string_value = "SCHEDULE")]
    #[serde(rename = "SCHEDULE")]
    Schedule,

    // External cron hitting the GET trigger; gates still apply.
    #[sea_orm(string_value = "CRON")]
    #[serde(rename = "CRON")]
    Cron,

    // POST trigger; bypasses window and interval gates.
    #[sea_orm(string_value = "MANUAL")]
    #[serde(rename = "MANUAL")]
    Manual,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
