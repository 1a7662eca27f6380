// src/ingest/atom.rs
//! Typed decoder for the arXiv Atom response. The only module that knows the feed schema.

use quick_xml::de::from_str;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::FeedError;
use crate::ingest::types::RawEntry;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term")]
    term: Option<String>,
}

impl From<Entry> for RawEntry {
    fn from(e: Entry) -> Self {
        RawEntry {
            id: e.id,
            title: e.title,
            summary: e.summary,
            published: e.published,
            authors: e
                .authors
                .into_iter()
                .filter_map(|a| a.name)
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            categories: e
                .categories
                .into_iter()
                .filter_map(|c| c.term)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

fn malformed(msg: impl Into<String>) -> FeedError {
    FeedError::Malformed(msg.into())
}

fn is_atom_xmlns(a: &Attribute<'_>) -> bool {
    a.key.as_ref() == b"xmlns" && a.value.as_ref() == ATOM_NS.as_bytes()
}

/// Root must be `<feed xmlns="http://www.w3.org/2005/Atom">`.
fn check_root(xml: &str) -> Result<(), FeedError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"feed" {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(malformed(format!("unexpected root element <{name}>")));
                }
                let atom = e.attributes().flatten().any(|a| is_atom_xmlns(&a));
                if !atom {
                    return Err(malformed("root is not in the Atom namespace"));
                }
                return Ok(());
            }
            Ok(Event::Eof) => return Err(malformed("empty document")),
            Err(e) => return Err(malformed(e.to_string())),
            _ => {}
        }
    }
}

/// Decode one page into raw entries, in document order.
pub fn decode(xml: &str) -> Result<Vec<RawEntry>, FeedError> {
    check_root(xml)?;
    let feed: Feed = from_str(xml).map_err(|e| malformed(e.to_string()))?;
    Ok(feed.entries.into_iter().map(RawEntry::from).collect())
}
