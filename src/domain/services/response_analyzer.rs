// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::models::prompt_result::{
    CitationSources, CitationType, Extraction, Sentiment,
};
use crate::utils::url_utils::target_domain;

/// 竞争对手列表上限
pub const MAX_COMPETITORS: usize = 10;

/// 以业务类型后缀结尾的首字母大写多词短语
static RANKED_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:[A-Z][\w'&-]*[ \t]+)+(?:Vineyards|Vineyard|Winery|Wineries|Estate|Cellars|Wines|Inn|Lodge|Resort|Hotel|Restaurant)\b",
    )
    .expect("ranked entity pattern is valid")
});

static POSITIVE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:best|excellent|outstanding|exceptional|award-winning|acclaimed|renowned|stunning|beautiful|romantic|charming|delicious|memorable|highly recommended|favorite|top-rated|must-visit|gem|world-class|perfect)\b",
    )
    .expect("positive word pattern is valid")
});

static NEGATIVE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:overpriced|mediocre|disappointing|disappointed|crowded|rude|avoid|worst|poor|underwhelming|bland|expensive|overrated|closed)\b",
    )
    .expect("negative word pattern is valid")
});

/// 点评聚合站点的主机名片段
const REVIEW_HOSTS: [&str; 7] = [
    "yelp.",
    "tripadvisor.",
    "maps.google.",
    "opentable.",
    "vivino.",
    "winespectator.",
    "foursquare.",
];

/// 无引用 URL 时识别点评站点的关键词
const REVIEW_KEYWORDS: [&str; 10] = [
    "yelp",
    "tripadvisor",
    "google maps",
    "google reviews",
    "opentable",
    "vivino",
    "wine spectator",
    "foursquare",
    "review site",
    "online reviews",
];

const NEWS_MARKERS: [&str; 3] = ["news", "blog", "article"];

const NEWS_KEYWORDS: [&str; 4] = ["news", "article", "blog", "magazine"];

/// 回答分析器
///
/// 纯函数：相同输入总是得到相同输出，无副作用。
pub trait ResponseAnalyzer: Send + Sync {
    fn analyze(
        &self,
        response_text: &str,
        business_name: &str,
        business_url: &str,
        citation_urls: &[String],
    ) -> Extraction;
}

/// 运行器使用的分析接口
///
/// 所有 `ResponseAnalyzer` 自动实现该接口；需要远程调用的分析器直接实现它。
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn evaluate(
        &self,
        response_text: &str,
        business_name: &str,
        business_url: &str,
        citation_urls: &[String],
    ) -> Extraction;
}

#[async_trait]
impl<T: ResponseAnalyzer> AnalysisService for T {
    async fn evaluate(
        &self,
        response_text: &str,
        business_name: &str,
        business_url: &str,
        citation_urls: &[String],
    ) -> Extraction {
        self.analyze(response_text, business_name, business_url, citation_urls)
    }
}

/// 基于关键词与正则的分析器
///
/// 名称匹配是大小写不敏感的子串包含，会误报子串，也会漏掉写法变体。
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl ResponseAnalyzer for KeywordAnalyzer {
    fn analyze(
        &self,
        response_text: &str,
        business_name: &str,
        business_url: &str,
        citation_urls: &[String],
    ) -> Extraction {
        let lowered = response_text.to_lowercase();
        let name = business_name.trim().to_lowercase();
        let domain = target_domain(business_url);

        let mentioned = !name.is_empty() && lowered.contains(&name);
        let entities = ranked_entities(response_text);
        let competitors: Vec<String> = entities
            .iter()
            .filter(|entity| name.is_empty() || !entity.to_lowercase().contains(&name))
            .take(MAX_COMPETITORS)
            .cloned()
            .collect();

        let citation_sources = if citation_urls.is_empty() {
            classify_by_keywords(&lowered, &domain, mentioned)
        } else {
            classify_urls(citation_urls, &domain)
        };

        if !mentioned {
            let mut extraction = Extraction::not_mentioned(citation_sources, competitors);
            if citation_sources.owned_website > 0 {
                extraction.citation_type = CitationType::ByCategory;
            }
            return extraction;
        }

        let position = entities
            .iter()
            .position(|entity| entity.to_lowercase().contains(&name))
            .map(|index| index as u32 + 1);

        Extraction {
            mentioned,
            position,
            sentiment: detect_sentiment(&lowered),
            competitors,
            citation_sources,
            mention_count: lowered.matches(name.as_str()).count() as u32,
            context: mention_context(response_text, &name),
            citation_type: CitationType::ByName,
        }
    }
}

/// 按首次出现顺序去重后的排名实体
fn ranked_entities(text: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    for found in RANKED_ENTITY.find_iter(text) {
        let entity = found.as_str().to_string();
        if !entities.contains(&entity) {
            entities.push(entity);
        }
    }
    entities
}

fn detect_sentiment(lowered: &str) -> Sentiment {
    let positive = POSITIVE_WORDS.is_match(lowered);
    let negative = NEGATIVE_WORDS.is_match(lowered);
    match (positive, negative) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

fn alphanumeric_lower(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 第一个包含业务名称的句子
fn mention_context(text: &str, name: &str) -> String {
    let needle = alphanumeric_lower(name);
    if needle.is_empty() {
        return String::new();
    }
    text.split(['.', '!', '?'])
        .find(|sentence| alphanumeric_lower(sentence).contains(&needle))
        .map(|sentence| sentence.trim().to_string())
        .unwrap_or_default()
}

fn classify_urls(citation_urls: &[String], domain: &str) -> CitationSources {
    let mut sources = CitationSources::default();
    for raw in citation_urls {
        let lowered = raw.to_lowercase();
        let host = Url::parse(&lowered)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();

        if host == "reddit.com" || host.ends_with(".reddit.com") {
            sources.reddit += 1;
        } else if is_review_site(&host, &lowered) {
            sources.review_sites += 1;
        } else if !domain.is_empty() && host.contains(domain) {
            sources.owned_website += 1;
        } else if NEWS_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            sources.news += 1;
        } else {
            sources.other += 1;
        }
    }
    sources
}

fn is_review_site(host: &str, url: &str) -> bool {
    let host = format!(".{}", host);
    REVIEW_HOSTS
        .iter()
        .any(|fragment| host.contains(&format!(".{}", fragment)))
        || url.contains("google.com/maps")
}

fn classify_by_keywords(lowered: &str, domain: &str, mentioned: bool) -> CitationSources {
    let mut sources = CitationSources::default();
    if lowered.contains("reddit") || lowered.contains("r/") {
        sources.reddit += 1;
    }
    if REVIEW_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        sources.review_sites += 1;
    }
    if !domain.is_empty() && lowered.contains(domain) {
        sources.owned_website += 1;
    }
    if NEWS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        sources.news += 1;
    }
    if mentioned && sources.total() == 0 {
        sources.other += 1;
    }
    sources
}
