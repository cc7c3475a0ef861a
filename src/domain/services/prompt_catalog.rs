// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit::Specialty;
use crate::domain::models::prompt_result::PromptCategory;

/// 目录中的一条提示词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPrompt {
    pub category: PromptCategory,
    pub text: &'static str,
}

const fn prompt(category: PromptCategory, text: &'static str) -> CatalogPrompt {
    CatalogPrompt { category, text }
}

/// 适用于任何业务的通用前缀
const UNIVERSAL: [CatalogPrompt; 7] = [
    prompt(
        PromptCategory::Discovery,
        "What are the best wineries to visit in wine country?",
    ),
    prompt(
        PromptCategory::Discovery,
        "Which family-owned wineries are worth visiting for a tasting?",
    ),
    prompt(
        PromptCategory::Discovery,
        "What are some hidden gem wineries that locals recommend?",
    ),
    prompt(
        PromptCategory::Experience,
        "Which wineries offer the best tasting room experience and views?",
    ),
    prompt(
        PromptCategory::Experience,
        "What wineries are good for a romantic afternoon or a special occasion?",
    ),
    prompt(
        PromptCategory::Practical,
        "Which wineries accept walk-ins and which require reservations for tastings?",
    ),
    prompt(
        PromptCategory::Practical,
        "What are good wineries for a group tour with food pairings?",
    ),
];

const RED_WINE: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries make the best Cabernet Sauvignon?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I taste award-winning Pinot Noir and Merlot?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries are known for bold red blends worth cellaring?",
    ),
];

const WHITE_WINE: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries make the best Chardonnay?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I taste crisp Sauvignon Blanc and Riesling?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries are known for unoaked or mineral white wines?",
    ),
];

const SPARKLING: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries make the best sparkling wine?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I taste traditional method sparkling wine like Champagne?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries offer sparkling wine tours and bubbly flights?",
    ),
];

const ROSE: [CatalogPrompt; 3] = [
    prompt(PromptCategory::Specialty, "Which wineries make the best rosé?"),
    prompt(
        PromptCategory::Specialty,
        "Where can I enjoy dry rosé on a patio with a view?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries are known for summer rosé releases?",
    ),
];

const DESSERT: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries make the best dessert wines?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I taste late harvest wines, port, or ice wine?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries offer dessert wine and chocolate pairings?",
    ),
];

const ORGANIC: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries make the best organic or biodynamic wines?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I visit a sustainable winery with natural wines?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries are certified organic and offer vineyard tours?",
    ),
];

const MULTIPLE: [CatalogPrompt; 3] = [
    prompt(
        PromptCategory::Specialty,
        "Which wineries have the widest variety of wines to taste?",
    ),
    prompt(
        PromptCategory::Specialty,
        "Where can I taste both red and white wines at one estate?",
    ),
    prompt(
        PromptCategory::Specialty,
        "What wineries are best for a first-time wine tasting?",
    ),
];

fn specialty_suffix(specialty: Option<Specialty>) -> &'static [CatalogPrompt; 3] {
    match specialty {
        Some(Specialty::RedWine) => &RED_WINE,
        Some(Specialty::WhiteWine) => &WHITE_WINE,
        Some(Specialty::Sparkling) => &SPARKLING,
        Some(Specialty::Rose) => &ROSE,
        Some(Specialty::Dessert) => &DESSERT,
        Some(Specialty::Organic) => &ORGANIC,
        Some(Specialty::Multiple) | None => &MULTIPLE,
    }
}

/// 返回某个专长的完整提示词列表
///
/// 通用前缀在前，专长后缀在后；未知或缺省的专长使用 `multiple` 后缀。
pub fn prompts_for_specialty(specialty: Option<Specialty>) -> Vec<CatalogPrompt> {
    UNIVERSAL
        .iter()
        .chain(specialty_suffix(specialty).iter())
        .copied()
        .collect()
}

/// 目录大小（对所有专长相同）
pub fn catalog_size() -> usize {
    UNIVERSAL.len() + MULTIPLE.len()
}
