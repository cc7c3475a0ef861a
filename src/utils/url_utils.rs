// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 取出 URL 的主机名并去掉 `www.` 前缀，统一为小写
fn bare_host(website_url: &str) -> Option<String> {
    let parsed = Url::parse(website_url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// 目标域名：主机名去掉 `www.`
///
/// 无法解析时返回空字符串
pub fn target_domain(website_url: &str) -> String {
    bare_host(website_url).unwrap_or_default()
}

/// 业务展示名称：第一个点之前的主机标签，首字母大写
///
/// `https://www.examplewinery.com` → `Examplewinery`
pub fn business_display_name(website_url: &str) -> String {
    let host = target_domain(website_url);
    let label = host.split('.').next().unwrap_or_default();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
