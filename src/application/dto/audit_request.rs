// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 审计提交请求数据传输对象
///
/// `url` 缺失时由用例返回校验错误，而不是在反序列化阶段失败
#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct SubmitAuditRequestDto {
    /// 待审计的网站地址
    #[validate(url)]
    pub url: Option<String>,
    /// 业务专长，未知值按缺省处理
    pub specialty: Option<String>,
}
