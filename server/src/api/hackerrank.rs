use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use shared::{Platform, PlatformUsername, NOT_AVAILABLE};
use tracing::{debug, instrument};

use super::{check_status, send, StatsAdapter, Transport, UpstreamRequest};
use crate::{error::StatsError, types::HackerrankStats};

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_HEADERS: [(&str, &str); 7] = [
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Cache-Control", "no-cache"),
    ("Pragma", "no-cache"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Upgrade-Insecure-Requests", "1"),
];

struct Rule {
    selector: &'static str,
    extract: fn(ElementRef<'_>) -> Option<String>,
}

const fn rule(selector: &'static str, extract: fn(ElementRef<'_>) -> Option<String>) -> Rule {
    Rule { selector, extract }
}

const AVATAR_RULES: &[Rule] = &[
    rule(r#"img[src*="profile"]"#, image_source),
    rule(r#"img[alt*="profile"]"#, image_source),
    rule(r#"img[alt*="avatar"]"#, image_source),
    rule(r#"img[class*="avatar"]"#, image_source),
    rule(r#"img[class*="profile"]"#, image_source),
    rule(".profile-avatar img", image_source),
    rule(".avatar img", image_source),
    rule(r#"img[src*="hackerrank"]"#, image_source),
];

const LOCATION_RULES: &[Rule] = &[
    rule("span.location", trimmed_text),
    rule(".profile-location", trimmed_text),
    rule(r#"[class*="location"]"#, trimmed_text),
];

const SOLVED_RULES: &[Rule] = &[
    rule("div.stat", solved_count),
    rule(".stat", solved_count),
    rule(r#"[class*="stat"]"#, solved_count),
    rule(r#"[class*="score"]"#, solved_count),
    rule(r#"[class*="solved"]"#, solved_count),
];

const RANK_RULES: &[Rule] = &[
    rule("div.rank", rank_label),
    rule(".rank", rank_label),
    rule(r#"[class*="rank"]"#, rank_label),
    rule(r#"[class*="rating"]"#, rank_label),
];

fn image_source(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(ToString::to_string)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn trimmed_text(element: ElementRef<'_>) -> Option<String> {
    let text = text_of(element);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn solved_count(element: ElementRef<'_>) -> Option<String> {
    let text = text_of(element).to_lowercase();
    if !["solved", "problems", "challenges"]
        .iter()
        .any(|word| text.contains(word))
    {
        return None;
    }
    first_number(&text).map(ToString::to_string)
}

fn rank_label(element: ElementRef<'_>) -> Option<String> {
    trimmed_text(element).filter(|text| text != NOT_AVAILABLE && text.chars().count() < 20)
}

fn first_number(text: &str) -> Option<&str> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
}

fn first_match(document: &Html, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let selector = match Selector::parse(rule.selector) {
            Ok(selector) => selector,
            Err(e) => {
                debug!("Skipping invalid selector {}: {e}", rule.selector);
                return None;
            }
        };
        document.select(&selector).find_map(rule.extract)
    })
}

fn absolute_url(src: String, origin: &str) -> String {
    if src.starts_with("//") {
        format!("https:{src}")
    } else if src.starts_with('/') {
        format!("{origin}{src}")
    } else {
        src
    }
}

/// Extracts whatever the page exposes. Never fails: missing fields keep their
/// defaults.
pub fn parse_profile(html: &str, username: &str, profile_url: &str, origin: &str) -> HackerrankStats {
    let document = Html::parse_document(html);
    let mut stats = HackerrankStats::empty(username.to_string(), profile_url.to_string());

    stats.avatar = first_match(&document, AVATAR_RULES).map(|src| absolute_url(src, origin));
    stats.location = first_match(&document, LOCATION_RULES);
    if let Some(solved) = first_match(&document, SOLVED_RULES).and_then(|n| n.parse().ok()) {
        stats.total_solved = solved;
    }
    if let Some(rank) = first_match(&document, RANK_RULES) {
        stats.rank = rank;
    }
    stats
}

pub struct HackerrankAdapter {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl HackerrankAdapter {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StatsAdapter for HackerrankAdapter {
    type Record = HackerrankStats;

    fn platform(&self) -> Platform {
        Platform::Hackerrank
    }

    #[instrument(skip(self))]
    async fn fetch_stats(&self, username: &PlatformUsername) -> Result<HackerrankStats, StatsError> {
        let profile_url = format!("{}/{}", self.base_url, username);
        let request = BROWSER_HEADERS.iter().fold(
            UpstreamRequest::get(profile_url.as_str()).timeout(PAGE_TIMEOUT),
            |request, (name, value)| request.header(*name, *value),
        );

        let response = send(self.transport.as_ref(), Platform::Hackerrank, request).await?;
        let page = check_status(Platform::Hackerrank, response)?;

        Ok(parse_profile(
            &page.body,
            username.as_str(),
            &profile_url,
            &self.base_url,
        ))
    }
}
