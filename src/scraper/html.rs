//! Implements the Scraper trait for public Jira bug pages
use async_trait::async_trait;
use log::*;
use regex::{Captures, Regex};
use reqwest::Client;
use std::sync::LazyLock;
use tl::{ParserOptions, VDom};

use crate::{
    config::{ClientConfig, ScraperConfig},
    error::{Result, ScrapeError},
    scraper::{BugPage, bug_id_from_url, traits::Scraper},
};

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .unwrap()
});

/// Scraper that locates the title and description containers by element
/// id. Depends on the upstream page keeping its markup.
pub struct HtmlScraper {
    client: Client,
    config: ScraperConfig,
}

impl HtmlScraper {
    pub fn new(client_config: &ClientConfig, config: ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(client_config.scrape_timeout())
            .user_agent(client_config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Scraper for HtmlScraper {
    async fn scrape(&self, url: &str) -> std::result::Result<BugPage, ScrapeError> {
        debug!("scraping upstream bug page {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?
            .error_for_status()
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        extract_bug_page(url, &html, &self.config)
    }
}

/// Pull title and description out of a bug page.
pub fn extract_bug_page(
    url: &str,
    html: &str,
    config: &ScraperConfig,
) -> std::result::Result<BugPage, ScrapeError> {
    let dom = tl::parse(html, ParserOptions::default().track_ids()).map_err(
        |e| ScrapeError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        },
    )?;

    let missing = |element: &str| ScrapeError::MissingElement {
        url: url.to_string(),
        element: element.to_string(),
    };

    let title = element_text(&dom, &config.title_element_id)
        .map(|lines| lines.join(" "))
        .ok_or_else(|| missing(&config.title_element_id))?;

    let description = element_text(&dom, &config.description_element_id)
        .map(|lines| lines.join("\n"))
        .ok_or_else(|| missing(&config.description_element_id))?;

    Ok(BugPage {
        id: bug_id_from_url(url),
        url: url.to_string(),
        title,
        description,
    })
}

// Non-empty text lines under the element with `id`, or None when the element
// is absent or holds no text.
fn element_text<'a>(dom: &VDom<'a>, id: &'a str) -> Option<Vec<String>> {
    let parser = dom.parser();
    let node = dom.get_element_by_id(id)?.get(parser)?;
    let children = node.children()?;

    let lines: Vec<String> = children
        .all(parser)
        .iter()
        .filter_map(|n| n.as_raw())
        .map(|raw| collapse_whitespace(&decode_entities(&raw.as_utf8_str())))
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() { None } else { Some(lines) }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Numeric references and the named entities Jira pages use. Unknown names
// are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity.strip_prefix('#') {
                Some(number) => numeric_entity(number),
                None => named_entity(entity),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn numeric_entity(number: &str) -> Option<char> {
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse().ok()?,
    };
    char::from_u32(code)
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "times" => '\u{00D7}',
        "rarr" => '\u{2192}',
        "larr" => '\u{2190}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::spawn_stub_server;
    use axum::{
        Router,
        extract::Path,
        http::StatusCode,
        response::{Html, IntoResponse, Response},
        routing::get,
    };

    const URL: &str = "https://jira.mongodb.org/browse/SERVER-12345";

    const PAGE: &str = r#"
<html>
  <body>
    <div id="header">Jira</div>
    <div id="summary-val"><h1>Crash when   resharding</h1></div>
    <div id="descriptionmodule">
      <div class="mod-content">
        <p>Resharding could crash the &amp; primary.</p>
        <p>
          Fixed by checking the donor state.
        </p>
      </div>
    </div>
  </body>
</html>
"#;

    #[test]
    fn extracts_title_and_description() {
        let page = extract_bug_page(URL, PAGE, &ScraperConfig::default()).unwrap();

        assert_eq!(page.id, "SERVER-12345");
        assert_eq!(page.url, URL);
        assert_eq!(page.title, "Crash when resharding");
        assert_eq!(
            page.description,
            "Resharding could crash the & primary.\nFixed by checking the donor state."
        );
    }

    #[test]
    fn missing_description_is_an_error() {
        let html = r#"<div id="summary-val">Only a title</div>"#;
        let err = extract_bug_page(URL, html, &ScraperConfig::default()).unwrap_err();

        assert_eq!(
            err,
            ScrapeError::MissingElement {
                url: URL.into(),
                element: "descriptionmodule".into(),
            }
        );
    }

    #[test]
    fn empty_title_is_an_error() {
        let html = r#"<div id="summary-val">   </div><div id="descriptionmodule">x</div>"#;
        let err = extract_bug_page(URL, html, &ScraperConfig::default()).unwrap_err();

        assert!(matches!(err, ScrapeError::MissingElement { ref element, .. } if element == "summary-val"));
    }

    #[test]
    fn decodes_numeric_and_named_entities() {
        assert_eq!(
            decode_entities("don&#x27;t &#8217;x&rsquo; &lt;a&gt; &amp;amp; &bogus; &#xD800;"),
            "don't \u{2019}x\u{2019} <a> &amp; &bogus; &#xD800;"
        );
    }

    #[test]
    fn honours_configured_element_ids() {
        let html = r#"<h1 id="t">Title</h1><section id="d"><p>Body</p></section>"#;
        let config = ScraperConfig {
            title_element_id: "t".into(),
            description_element_id: "d".into(),
        };

        let page = extract_bug_page(URL, html, &config).unwrap();
        assert_eq!(page.title, "Title");
        assert_eq!(page.description, "Body");
    }

    async fn bug_page_handler(Path(id): Path<String>) -> Response {
        match id.as_str() {
            "SLOW-1" => {
                std::future::pending::<()>().await;
                StatusCode::OK.into_response()
            }
            "GONE-1" => StatusCode::NOT_FOUND.into_response(),
            _ => Html(PAGE).into_response(),
        }
    }

    async fn spawn_bug_pages() -> (HtmlScraper, String) {
        let router = Router::new().route("/browse/{id}", get(bug_page_handler));
        let base = spawn_stub_server(router).await;

        let config = ClientConfig {
            scrape_timeout_secs: 1,
            ..ClientConfig::default()
        };

        (
            HtmlScraper::new(&config, ScraperConfig::default()).unwrap(),
            base,
        )
    }

    #[tokio::test]
    async fn scrapes_served_page() {
        let (scraper, base) = spawn_bug_pages().await;
        let url = format!("{base}/browse/SERVER-12345");

        let page = scraper.scrape(&url).await.unwrap();

        assert_eq!(page.id, "SERVER-12345");
        assert_eq!(page.url, url);
        assert_eq!(page.title, "Crash when resharding");
    }

    #[tokio::test]
    async fn error_status_is_unreachable() {
        let (scraper, base) = spawn_bug_pages().await;
        let url = format!("{base}/browse/GONE-1");

        let err = scraper.scrape(&url).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Unreachable { url: ref u, .. } if *u == url));
    }

    #[tokio::test]
    async fn slow_page_times_out() {
        let (scraper, base) = spawn_bug_pages().await;
        let url = format!("{base}/browse/SLOW-1");

        let err = scraper.scrape(&url).await.unwrap_err();

        assert_eq!(err, ScrapeError::Timeout { url });
    }
}
