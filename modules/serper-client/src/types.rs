use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub q: String,
    pub num: u32,
    /// Country code, e.g. `"in"`.
    pub gl: String,
    /// Interface language, e.g. `"en"`.
    pub hl: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerperResponse {
    #[serde(default)]
    pub organic: Vec<SerperResult>,
    #[serde(default)]
    pub news: Vec<SerperResult>,
    #[serde(default, rename = "answerBox")]
    pub answer_box: Option<SerperResult>,
}

/// One search hit. Fields that are missing, null or not strings read as `None`
/// so a single odd entry never fails the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerperResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub snippet: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

impl SerperResponse {
    /// Result links in provider order: organic, then news, then the answer box.
    /// Results without a link are skipped.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.organic
            .iter()
            .chain(self.news.iter())
            .chain(self.answer_box.iter())
            .filter_map(|r| r.link.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_follow_organic_news_answer_box_order() {
        let resp: SerperResponse = serde_json::from_str(
            r#"{
                "organic": [{"link": "https://a.com"}, {"title": "no link"}, {"link": "https://b.com"}],
                "news": [{"link": "https://news.com/1"}],
                "answerBox": {"link": "https://answer.com", "snippet": "42"}
            }"#,
        )
        .unwrap();

        let links: Vec<&str> = resp.links().collect();
        assert_eq!(
            links,
            vec![
                "https://a.com",
                "https://b.com",
                "https://news.com/1",
                "https://answer.com"
            ]
        );
    }

    #[test]
    fn odd_fields_do_not_fail_the_response() {
        let resp: SerperResponse = serde_json::from_str(
            r#"{
                "organic": [
                    {"link": "https://a.com", "title": null, "snippet": 3},
                    {"link": 42, "title": "numeric link"},
                    {"link": null},
                    {"link": "https://b.com", "sitelinks": [{"title": "x"}]}
                ]
            }"#,
        )
        .unwrap();

        let links: Vec<&str> = resp.links().collect();
        assert_eq!(links, vec!["https://a.com", "https://b.com"]);
        assert_eq!(resp.organic[0].title, None);
        assert_eq!(resp.organic[1].title.as_deref(), Some("numeric link"));
    }

    #[test]
    fn empty_response_has_no_links() {
        let resp: SerperResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.links().count(), 0);
    }
}
