use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub register_number: String,
    pub mobile_number: String,
    pub section: String,

    /// Ordered list of internship records.
    #[sea_orm(column_type = "JsonBinary")]
    pub internships: Json,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
