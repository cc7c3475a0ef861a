// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub website_url: String,
    pub specialty: Option<String>,
    pub status: String,
    pub overall_score: Option<i32>,
    pub citation_presence_score: Option<i32>,
    pub position_score: Option<i32>,
    pub sentiment_score: Option<i32>,
    pub frequency_score: Option<i32>,
    pub citation_count: Option<i32>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub completed_at: Option<ChronoDateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::audit_job::Entity")]
    AuditJobs,
    #[sea_orm(has_many = "super::ai_response::Entity")]
    AiResponses,
}

impl Related<super::audit_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditJobs.def()
    }
}

impl Related<super::ai_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiResponses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
