use chrono::{DateTime, Utc};

/// Channel-level metadata plus items, as returned by the RSS parser.
/// Fields are `None` when the feed omits them or supplies an empty
/// string; defaulting happens at ingestion time, not here.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub items: Vec<ParsedItem>,
}

#[derive(Debug, Clone)]
pub struct ParsedItem {
    pub title: Option<String>,
    pub content: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ParsedItem {
    pub fn from_rss_item(item: &rss::Item) -> Self {
        // pubDate is RFC 2822 per the RSS spec, but feeds in the wild
        // also emit RFC 3339 dates.
        let published_at = item.pub_date().and_then(parse_item_date);

        let content = item
            .content()
            .map(ToOwned::to_owned)
            .or_else(|| item.description().map(ToOwned::to_owned))
            .filter(|s| !s.is_empty());

        Self {
            title: non_empty(item.title()),
            content,
            link: non_empty(item.link()),
            published_at,
        }
    }
}

impl ParsedFeed {
    pub fn from_channel(channel: &rss::Channel) -> Self {
        let category = channel
            .categories()
            .first()
            .map(|cat| cat.name().to_string())
            .filter(|s| !s.is_empty());

        Self {
            title: non_empty(Some(channel.title())),
            link: non_empty(Some(channel.link())),
            category,
            items: channel.items().iter().map(ParsedItem::from_rss_item).collect(),
        }
    }
}

/// Parse raw response bytes into feed metadata and items.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, rss::Error> {
    let channel = rss::Channel::read_from(std::io::Cursor::new(bytes))?;
    Ok(ParsedFeed::from_channel(&channel))
}

fn parse_item_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(ToOwned::to_owned)
}
