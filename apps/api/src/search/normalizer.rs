//! Response Normalizer: turns one chat completion into a bounded list of `JobListing`s.
//!
//! The model is asked for a JSON array but does not always produce one, so there are
//! two extraction paths:
//! 1. strict: a JSON array of objects embedded anywhere in the text, trusted field by field
//! 2. heuristic: numbered sections (or paragraphs) scanned line by line for labeled fields
//!
//! Both paths end in `fill_defaults`, so every listing carries all seven fields.
//! `normalize` never fails: when nothing usable is found it returns a single
//! placeholder listing that summarises the raw text.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::search::models::JobListing;

/// Upper bound on listings per search unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 8;

const DESCRIPTION_MAX_CHARS: usize = 300;
const PLACEHOLDER_SUMMARY_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

/// Unlabeled lines at or below this length are noise (headings, separators).
const MIN_DESCRIPTION_LINE_CHARS: usize = 20;
/// Heuristic titles at or below this length are rejected ("Job: 1", "Role: IC").
const MIN_TITLE_CHARS: usize = 5;
/// A "label" longer than this is prose that happens to contain a colon.
const MAX_LABEL_WORDS: usize = 4;

// Defaults applied by `fill_defaults` to any listing.
const DEFAULT_COMPANY: &str = "Company Name";
const DEFAULT_LOCATION: &str = "Location";
const DEFAULT_SALARY: &str = "Competitive";
const DEFAULT_DESCRIPTION: &str = "Job description available upon application.";
const DEFAULT_SOURCE: &str = "Enhanced AI Search";

// Defaults for listings recovered by the heuristic path.
const SECTION_COMPANY: &str = "Various Companies";
const SECTION_LOCATION: &str = "Multiple Locations";
const HEURISTIC_SOURCE: &str = "Enhanced AI Search Results";

const PLACEHOLDER_TITLE: &str = "Job Search Results Available";
const PLACEHOLDER_COMPANY: &str = "Multiple Companies";
const PLACEHOLDER_LOCATION: &str = "Various Locations";
const PLACEHOLDER_APPLY_URL: &str = "https://www.linkedin.com/jobs/";

const SEARCH_ENGINE_URL: &str = "https://www.google.com/search?q=";

lazy_static! {
    static ref GREEDY_ARRAY: Regex = Regex::new(r"\[[\s\S]*\]").unwrap();

    // "1. ", "2) ", "**3.** ", "### 4. " at the start of a line
    static ref LIST_MARKER: Regex =
        Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*)?\d{1,2}[.)](?:\*\*)?[ \t]+").unwrap();

    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t]*\n").unwrap();

    static ref URL_PATTERN: Regex = Regex::new(r#"https?://[^\s<>"'`\]\)]+"#).unwrap();
}

#[derive(Debug, Error)]
enum NormalizeError {
    #[error("completion text is empty")]
    EmptyInput,

    #[error("no job listings could be extracted")]
    NoListings,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes a raw completion into at most `max_results` listings (at least one).
pub fn normalize(raw: &str, max_results: usize) -> Vec<JobListing> {
    let max_results = max_results.max(1);

    match try_normalize(raw, max_results) {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Falling back to placeholder listing: {e}");
            vec![placeholder(raw)]
        }
    }
}

fn try_normalize(raw: &str, max_results: usize) -> Result<Vec<JobListing>, NormalizeError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    let listings = match extract_json_objects(text) {
        Some(objects) => {
            debug!("Strict parse found {} JSON job objects", objects.len());
            objects.iter().map(listing_from_json).collect::<Vec<_>>()
        }
        None => {
            warn!("No JSON array in completion, using heuristic section parsing");
            parse_sections(text)
        }
    };

    if listings.is_empty() {
        return Err(NormalizeError::NoListings);
    }

    Ok(listings
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(i, listing)| fill_defaults(listing, i + 1))
        .collect())
}

/// Single listing returned when extraction produced nothing.
fn placeholder(raw: &str) -> JobListing {
    let summary = raw.trim();
    let description = if summary.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        truncate_chars(summary, PLACEHOLDER_SUMMARY_CHARS)
    };

    JobListing {
        title: PLACEHOLDER_TITLE.to_string(),
        company: PLACEHOLDER_COMPANY.to_string(),
        location: PLACEHOLDER_LOCATION.to_string(),
        salary: DEFAULT_SALARY.to_string(),
        description,
        apply_url: PLACEHOLDER_APPLY_URL.to_string(),
        source: HEURISTIC_SOURCE.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Defaulting
// ────────────────────────────────────────────────────────────────────────────

/// Fills every blank field and bounds the description. `position` is 1-indexed.
///
/// Idempotent: a listing that already went through this pass comes back unchanged.
pub fn fill_defaults(mut listing: JobListing, position: usize) -> JobListing {
    if is_blank(&listing.title) {
        listing.title = format!("Job Opportunity {position}");
    }
    default_if_blank(&mut listing.company, DEFAULT_COMPANY);
    default_if_blank(&mut listing.location, DEFAULT_LOCATION);
    default_if_blank(&mut listing.salary, DEFAULT_SALARY);
    default_if_blank(&mut listing.description, DEFAULT_DESCRIPTION);
    default_if_blank(&mut listing.source, DEFAULT_SOURCE);

    if !is_valid_apply_url(&listing.apply_url) {
        listing.apply_url = search_url(&format!("{} {} job", listing.title, listing.company));
    }

    listing.description = truncate_chars(&listing.description, DESCRIPTION_MAX_CHARS);
    listing
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn default_if_blank(field: &mut String, default: &str) {
    if is_blank(field) {
        *field = default.to_string();
    }
}

/// Absolute http(s) URL with a host.
pub fn is_valid_apply_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        })
        .unwrap_or(false)
}

fn search_url(query: &str) -> String {
    format!("{SEARCH_ENGINE_URL}{}", urlencoding::encode(query))
}

/// Cuts `text` to `max` characters and marks the cut with an ellipsis.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{ELLIPSIS}", &text[..idx]),
        None => text.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strict path: embedded JSON array
// ────────────────────────────────────────────────────────────────────────────

/// Finds the first JSON array in `text` that holds at least one object.
/// Tries the widest `[ ... ]` span first, then every `[` as a candidate start.
fn extract_json_objects(text: &str) -> Option<Vec<Map<String, Value>>> {
    if let Some(span) = GREEDY_ARRAY.find(text) {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(span.as_str()) {
            if let Some(objects) = collect_objects(items) {
                return Some(objects);
            }
        }
    }

    for (start, _) in text.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Array(items))) = stream.next() {
            if let Some(objects) = collect_objects(items) {
                return Some(objects);
            }
        }
    }

    None
}

fn collect_objects(items: Vec<Value>) -> Option<Vec<Map<String, Value>>> {
    let objects: Vec<_> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    (!objects.is_empty()).then_some(objects)
}

const TITLE_KEYS: &[&str] = &["title", "job_title", "position"];
const COMPANY_KEYS: &[&str] = &["company", "company_name", "employer"];
const LOCATION_KEYS: &[&str] = &["location"];
const SALARY_KEYS: &[&str] = &["salary", "salary_range", "pay"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary"];
const APPLY_URL_KEYS: &[&str] = &["apply_url", "applyUrl", "url", "link"];
const SOURCE_KEYS: &[&str] = &["source"];

fn listing_from_json(object: &Map<String, Value>) -> JobListing {
    JobListing {
        title: json_field(object, TITLE_KEYS),
        company: json_field(object, COMPANY_KEYS),
        location: json_field(object, LOCATION_KEYS),
        salary: json_field(object, SALARY_KEYS),
        description: json_field(object, DESCRIPTION_KEYS),
        apply_url: json_field(object, APPLY_URL_KEYS),
        source: json_field(object, SOURCE_KEYS),
    }
}

/// First non-blank value among `keys`, rendered as a string. Values are kept verbatim.
fn json_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .map(json_to_text)
        .find(|text| !is_blank(text))
        .unwrap_or_default()
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic path: labeled lines inside sections
// ────────────────────────────────────────────────────────────────────────────

/// Trailing label words that qualify the field named before them.
const LABEL_QUALIFIERS: [&str; 5] = ["name", "range", "details", "info", "information"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Company,
    Location,
    Salary,
    ApplyUrl,
    Description,
}

impl Field {
    /// Matches on the label's final word, so "Job Title" is a title but "Job Type" is not.
    /// A trailing qualifier is skipped first: "Company Name", "Salary Range".
    fn from_label(label: &str) -> Option<Self> {
        let words: Vec<String> = label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let head = match words.as_slice() {
            [.., head, last] if LABEL_QUALIFIERS.contains(&last.as_str()) => head,
            [.., last] => last,
            [] => return None,
        };

        match head.as_str() {
            "company" | "employer" => Some(Field::Company),
            "title" | "position" | "job" | "role" => Some(Field::Title),
            "location" => Some(Field::Location),
            "salary" | "pay" | "compensation" => Some(Field::Salary),
            "apply" | "url" | "link" => Some(Field::ApplyUrl),
            "description" | "summary" => Some(Field::Description),
            _ => None,
        }
    }
}

fn parse_sections(text: &str) -> Vec<JobListing> {
    split_sections(text)
        .into_iter()
        .filter_map(SectionFields::scan)
        .enumerate()
        .map(|(i, fields)| fields.into_listing(i + 1))
        .collect()
}

/// Splits on numbered-list markers; text before the first marker is a preamble and
/// is dropped. Without any marker, paragraphs are the sections.
fn split_sections(text: &str) -> Vec<&str> {
    let markers: Vec<_> = LIST_MARKER.find_iter(text).collect();

    if markers.is_empty() {
        return PARAGRAPH_BREAK
            .split(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
    }

    markers
        .iter()
        .enumerate()
        .map(|(i, marker)| {
            let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
            text[marker.end()..end].trim()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Default)]
struct SectionFields {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    salary: Option<String>,
    apply_url: Option<String>,
    description: Vec<String>,
    labeled_description: bool,
}

impl SectionFields {
    /// `None` when the section carries nothing recognisable.
    fn scan(section: &str) -> Option<Self> {
        let mut fields = SectionFields::default();
        for line in section.lines() {
            fields.absorb(line);
        }
        (!fields.is_empty()).then_some(fields)
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.salary.is_none()
            && self.apply_url.is_none()
            && self.description.is_empty()
    }

    fn absorb(&mut self, raw_line: &str) {
        let line = clean_line(raw_line);
        if line.is_empty() {
            return;
        }

        if let Some((label, value)) = split_label(&line) {
            if let Some(field) = Field::from_label(label) {
                self.assign(field, value);
                return;
            }
        }

        if let Some(url) = find_url(&line) {
            set_once(&mut self.apply_url, url);
            return;
        }

        if line.chars().count() > MIN_DESCRIPTION_LINE_CHARS {
            self.description.push(line);
        }
    }

    fn assign(&mut self, field: Field, value: &str) {
        if value.is_empty() {
            return;
        }

        // "Company: https://careers.acme.com" is a link, not a company name
        if !matches!(field, Field::ApplyUrl | Field::Description) && value.starts_with("http") {
            if let Some(url) = find_url(value) {
                set_once(&mut self.apply_url, url);
            }
            return;
        }

        match field {
            Field::Title => {
                if value.chars().count() > MIN_TITLE_CHARS {
                    set_once(&mut self.title, value.to_string());
                }
            }
            Field::Company => set_once(&mut self.company, value.to_string()),
            Field::Location => set_once(&mut self.location, value.to_string()),
            Field::Salary => set_once(&mut self.salary, value.to_string()),
            Field::ApplyUrl => {
                if let Some(url) = find_url(value) {
                    set_once(&mut self.apply_url, url);
                }
            }
            Field::Description => {
                if !self.labeled_description {
                    self.labeled_description = true;
                    self.description.push(value.to_string());
                }
            }
        }
    }

    fn into_listing(self, position: usize) -> JobListing {
        let title = self
            .title
            .unwrap_or_else(|| format!("Job Opportunity {position}"));
        let company = self.company.unwrap_or_else(|| SECTION_COMPANY.to_string());
        let apply_url = self
            .apply_url
            .unwrap_or_else(|| search_url(&format!("{title} {company} job application")));

        JobListing {
            location: self.location.unwrap_or_else(|| SECTION_LOCATION.to_string()),
            salary: self.salary.unwrap_or_else(|| DEFAULT_SALARY.to_string()),
            description: truncate_chars(&self.description.join(" "), DESCRIPTION_MAX_CHARS),
            source: HEURISTIC_SOURCE.to_string(),
            title,
            company,
            apply_url,
        }
    }
}

fn set_once(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Drops list bullets and markdown bold so labels can be matched.
fn clean_line(line: &str) -> String {
    line.replace("**", "")
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '•' | '>' | '#'))
        .trim_end()
        .to_string()
}

/// Splits "Label: value" at the first colon. The colon of a bare URL is not a label.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim();
    let lower = label.to_lowercase();

    if label.is_empty()
        || lower.ends_with("http")
        || lower.ends_with("https")
        || label.split_whitespace().count() > MAX_LABEL_WORDS
    {
        return None;
    }

    let value = value.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '`' | '"'));
    Some((label, value))
}

fn find_url(text: &str) -> Option<String> {
    let found = URL_PATTERN.find(text)?;
    let url = found
        .as_str()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '*' | '_'));
    is_valid_apply_url(url).then(|| url.to_string())
}
