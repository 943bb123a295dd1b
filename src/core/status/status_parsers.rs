// Extraction of status and news data from the raw bodies the client fetched.
// The Overwatch pages are plain HTML, so this is regex based and tolerant:
// anything that doesn't match is skipped rather than failing the whole page.

use regex::Regex;

use super::status_models::{ComponentStatus, NewsArticle, StatuspageComponents};
use super::status_service::StatusError;

fn regex(pattern: &str) -> Result<Regex, StatusError> {
    Regex::new(pattern).map_err(|e| StatusError::Parse(e.to_string()))
}

/// Maps a Statuspage status id to its display name.
pub fn display_status(raw: &str) -> String {
    match raw {
        "operational" => "Operational".to_string(),
        "under_maintenance" => "Under Maintenance".to_string(),
        "degraded_performance" => "Degraded Performance".to_string(),
        "partial_outage" => "Partial Outage".to_string(),
        "major_outage" => "Major Outage".to_string(),
        other => other.replace('_', " "),
    }
}

/// Parses a Statuspage `components.json` body. Component groups are skipped.
pub fn parse_components(body: &str) -> Result<Vec<ComponentStatus>, StatusError> {
    let payload: StatuspageComponents =
        serde_json::from_str(body).map_err(|e| StatusError::Parse(e.to_string()))?;

    let components: Vec<ComponentStatus> = payload
        .components
        .into_iter()
        .filter(|c| !c.group)
        .map(|c| ComponentStatus {
            name: c.name.trim().to_string(),
            status: display_status(c.status.trim()),
        })
        .collect();

    if components.is_empty() {
        return Err(StatusError::Empty("Statuspage components"));
    }
    Ok(components)
}

fn strip_tags(fragment: &str) -> Result<String, StatusError> {
    let tags = regex(r"<[^>]+>")?;
    let text = tags.replace_all(fragment, " ");
    Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Extracts the headline of the Overwatch status page.
pub fn parse_overwatch_status(html: &str) -> Result<String, StatusError> {
    let title = regex(r#"(?s)<(\w+)[^>]*class="[^"]*\bentry-title\b[^"]*"[^>]*>(.*?)</(\w+)>"#)?;

    for caps in title.captures_iter(html) {
        let inner = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let text = strip_tags(inner)?;
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Err(StatusError::Empty("Overwatch status"))
}

/// Scheme and host of `url`, e.g. `https://playoverwatch.com`.
fn origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(i) => &url[..after_scheme + i],
        None => url,
    }
}

fn absolute_link(link: &str, page_url: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if let Some(rest) = link.strip_prefix("//") {
        format!("https://{}", rest)
    } else if link.starts_with('/') {
        format!("{}{}", origin(page_url), link)
    } else {
        format!("{}/{}", page_url.trim_end_matches('/'), link)
    }
}

fn absolute_image(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}

/// Extracts news cards (link, image, heading) from the Overwatch news page.
pub fn parse_news(html: &str, page_url: &str) -> Result<Vec<NewsArticle>, StatusError> {
    let card = regex(
        r#"(?s)<a[^>]+href="([^"]+)"[^>]*>.*?<img[^>]+src="([^"]+)"[^>]*>.*?<h\d[^>]*>(.*?)</h\d>"#,
    )?;

    let mut articles = Vec::new();
    for caps in card.captures_iter(html) {
        let (Some(link), Some(image), Some(title)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let title = strip_tags(title.as_str())?;
        if title.is_empty() {
            continue;
        }
        articles.push(NewsArticle {
            title,
            link: absolute_link(link.as_str(), page_url),
            image: absolute_image(image.as_str()),
        });
    }

    if articles.is_empty() {
        return Err(StatusError::Empty("Overwatch news"));
    }
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let body = r#"{
            "page": {"id": "x"},
            "components": [
                {"name": "Discord Bot", "status": "operational", "group": false},
                {"name": "Group", "status": "operational", "group": true},
                {"name": "API ", "status": "partial_outage"},
                {"name": "Website", "status": "under_maintenance"}
            ]
        }"#;
        let components = parse_components(body).unwrap();
        assert_eq!(
            components,
            vec![
                ComponentStatus {
                    name: "Discord Bot".into(),
                    status: "Operational".into()
                },
                ComponentStatus {
                    name: "API".into(),
                    status: "Partial Outage".into()
                },
                ComponentStatus {
                    name: "Website".into(),
                    status: "Under Maintenance".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_components_rejects_garbage() {
        assert!(matches!(
            parse_components("<html>"),
            Err(StatusError::Parse(_))
        ));
        assert!(matches!(
            parse_components(r#"{"components": []}"#),
            Err(StatusError::Empty(_))
        ));
    }

    #[test]
    fn test_parse_overwatch_status() {
        let html = r#"<div><h2 class="entry-title h4">
            No problems at <b>Overwatch</b>
        </h2></div>"#;
        assert_eq!(parse_overwatch_status(html).unwrap(), "No problems at Overwatch");
        assert!(parse_overwatch_status("<p>nothing</p>").is_err());
    }

    #[test]
    fn test_parse_news() {
        let html = r#"
            <a class="card" href="/en-us/news/1">
                <img src="//cdn.example.com/one.jpg" alt="">
                <h1 class="title">Patch <em>1.2</em></h1>
            </a>
            <a class="card" href="https://example.com/news/2">
                <img src="https://cdn.example.com/two.jpg">
                <h2>Event</h2>
            </a>"#;
        let articles = parse_news(html, "https://playoverwatch.com/en-us/news").unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Patch 1.2");
        assert_eq!(articles[0].link, "https://playoverwatch.com/en-us/news/1");
        assert_eq!(articles[0].image, "https://cdn.example.com/one.jpg");
        assert_eq!(articles[1].link, "https://example.com/news/2");
        assert_eq!(articles[1].image, "https://cdn.example.com/two.jpg");
    }

    #[test]
    fn test_display_status() {
        assert_eq!(display_status("degraded_performance"), "Degraded Performance");
        assert_eq!(display_status("major_outage"), "Major Outage");
        assert_eq!(display_status("something_new"), "something new");
    }
}
