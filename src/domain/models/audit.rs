// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::job::DomainError;
use crate::domain::models::scores::AggregateScores;

/// 审计实体
///
/// 表示针对一个网站 URL 的一次 AI 可见度检查。
/// 分数字段只在转换到 Completed 时一次性写入。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// 审计唯一标识符
    pub id: Uuid,
    /// 用户提交的网站地址
    pub website_url: String,
    /// 业务专长标签
    pub specialty: Option<Specialty>,
    /// 审计状态
    pub status: AuditStatus,
    /// 最终得分（仅 Completed 时存在）
    pub scores: Option<AggregateScores>,
    /// 提及该业务的回答数量（仅 Completed 时存在）
    pub citation_count: Option<i32>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 完成时间
    pub completed_at: Option<DateTime<FixedOffset>>,
}

/// 审计状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuditStatus::Processing => write!(f, "processing"),
            AuditStatus::Completed => write!(f, "completed"),
            AuditStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AuditStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(AuditStatus::Processing),
            "completed" => Ok(AuditStatus::Completed),
            "failed" => Ok(AuditStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 业务专长
///
/// 封闭枚举，决定提示词目录的专属后缀。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    RedWine,
    WhiteWine,
    Sparkling,
    Rose,
    Dessert,
    Organic,
    Multiple,
}

impl Specialty {
    pub const ALL: [Specialty; 7] = [
        Specialty::RedWine,
        Specialty::WhiteWine,
        Specialty::Sparkling,
        Specialty::Rose,
        Specialty::Dessert,
        Specialty::Organic,
        Specialty::Multiple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::RedWine => "red_wine",
            Specialty::WhiteWine => "white_wine",
            Specialty::Sparkling => "sparkling",
            Specialty::Rose => "rose",
            Specialty::Dessert => "dessert",
            Specialty::Organic => "organic",
            Specialty::Multiple => "multiple",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialty::ALL
            .iter()
            .copied()
            .find(|specialty| specialty.as_str() == s)
            .ok_or(())
    }
}

impl Audit {
    /// 创建一个新的审计，初始状态为 Processing
    pub fn new(website_url: String, specialty: Option<Specialty>) -> Self {
        Self {
            id: Uuid::new_v4(),
            website_url,
            specialty,
            status: AuditStatus::Processing,
            scores: None,
            citation_count: None,
            created_at: Utc::now().into(),
            completed_at: None,
        }
    }

    /// 完成审计并写入最终得分
    ///
    /// 分数与引用数在同一次转换中写入
    pub fn complete(
        mut self,
        scores: AggregateScores,
        citation_count: i32,
    ) -> Result<Self, DomainError> {
        match self.status {
            AuditStatus::Processing => {
                self.status = AuditStatus::Completed;
                self.scores = Some(scores);
                self.citation_count = Some(citation_count);
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记审计失败，分数保持为空
    pub fn fail(mut self) -> Result<Self, DomainError> {
        match self.status {
            AuditStatus::Processing => {
                self.status = AuditStatus::Failed;
                self.completed_at = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }
}
