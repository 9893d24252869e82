//! Wedding site content sections and theme settings.
//!
//! Sections are stored as an ordered JSON array on the wedding row. Each entry
//! carries a `type` tag selecting its payload shape.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of sections a site may carry
pub const MAX_SECTIONS: usize = 32;

const MAX_TITLE_LEN: usize = 200;
const MAX_BODY_LEN: usize = 20_000;

/// One question/answer pair in an FAQ section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// A typed block of site content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSection {
    Hero {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    Story {
        title: String,
        body: String,
    },
    Schedule {
        title: String,
    },
    Travel {
        title: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        map_url: Option<String>,
    },
    Registry {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
    },
    Gallery {
        title: String,
        #[serde(default)]
        image_urls: Vec<String>,
    },
    Faq {
        title: String,
        #[serde(default)]
        items: Vec<FaqItem>,
    },
    Rsvp {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deadline: Option<NaiveDate>,
    },
}

/// A field-level problem found while validating site content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentIssue {
    pub field: String,
    pub message: String,
}

impl ContentIssue {
    fn new(field: String, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ContentSection {
    /// Stable tag of the section kind
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSection::Hero { .. } => "hero",
            ContentSection::Story { .. } => "story",
            ContentSection::Schedule { .. } => "schedule",
            ContentSection::Travel { .. } => "travel",
            ContentSection::Registry { .. } => "registry",
            ContentSection::Gallery { .. } => "gallery",
            ContentSection::Faq { .. } => "faq",
            ContentSection::Rsvp { .. } => "rsvp",
        }
    }

    /// Validate the section payload, reporting issues under `sections[index]`.
    pub fn validate(&self, index: usize) -> Vec<ContentIssue> {
        let prefix = format!("sections[{index}]");
        let mut issues = Vec::new();

        let title = match self {
            ContentSection::Hero { title, .. }
            | ContentSection::Story { title, .. }
            | ContentSection::Schedule { title }
            | ContentSection::Travel { title, .. }
            | ContentSection::Registry { title, .. }
            | ContentSection::Gallery { title, .. }
            | ContentSection::Faq { title, .. }
            | ContentSection::Rsvp { title, .. } => title,
        };
        if title.trim().is_empty() {
            issues.push(ContentIssue::new(format!("{prefix}.title"), "title is required"));
        } else if title.chars().count() > MAX_TITLE_LEN {
            issues.push(ContentIssue::new(
                format!("{prefix}.title"),
                format!("title cannot exceed {MAX_TITLE_LEN} characters"),
            ));
        }

        match self {
            ContentSection::Hero { image_url, .. } => {
                if let Some(url) = image_url {
                    check_url(&mut issues, format!("{prefix}.image_url"), url);
                }
            }
            ContentSection::Story { body, .. } => {
                check_body(&mut issues, format!("{prefix}.body"), body);
            }
            ContentSection::Travel { body, map_url, .. } => {
                check_body(&mut issues, format!("{prefix}.body"), body);
                if let Some(url) = map_url {
                    check_url(&mut issues, format!("{prefix}.map_url"), url);
                }
            }
            ContentSection::Gallery { image_urls, .. } => {
                for (i, url) in image_urls.iter().enumerate() {
                    check_url(&mut issues, format!("{prefix}.image_urls[{i}]"), url);
                }
            }
            ContentSection::Faq { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if item.question.trim().is_empty() {
                        issues.push(ContentIssue::new(
                            format!("{prefix}.items[{i}].question"),
                            "question is required",
                        ));
                    }
                    if item.answer.trim().is_empty() {
                        issues.push(ContentIssue::new(
                            format!("{prefix}.items[{i}].answer"),
                            "answer is required",
                        ));
                    }
                }
            }
            ContentSection::Schedule { .. }
            | ContentSection::Registry { .. }
            | ContentSection::Rsvp { .. } => {}
        }

        issues
    }
}

fn check_body(issues: &mut Vec<ContentIssue>, field: String, body: &str) {
    if body.len() > MAX_BODY_LEN {
        issues.push(ContentIssue::new(
            field,
            format!("body cannot exceed {MAX_BODY_LEN} bytes"),
        ));
    }
}

fn check_url(issues: &mut Vec<ContentIssue>, field: String, value: &str) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => issues.push(ContentIssue::new(field, "must be an absolute http(s) URL")),
    }
}

/// Validate an ordered list of sections.
pub fn validate_sections(sections: &[ContentSection]) -> Vec<ContentIssue> {
    if sections.len() > MAX_SECTIONS {
        return vec![ContentIssue::new(
            "sections".to_string(),
            format!("a site can have at most {MAX_SECTIONS} sections"),
        )];
    }

    sections
        .iter()
        .enumerate()
        .flat_map(|(index, section)| section.validate(index))
        .collect()
}

/// Visual theme settings for a wedding site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ThemeSettings {
    /// Template identifier
    #[schema(example = "classic")]
    pub template: String,
    /// Primary colour as `#rrggbb`
    #[schema(example = "#7a5c61")]
    pub primary_color: String,
    #[schema(example = "Playfair Display")]
    pub font_family: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            template: "classic".to_string(),
            primary_color: "#7a5c61".to_string(),
            font_family: "Playfair Display".to_string(),
        }
    }
}

impl ThemeSettings {
    pub fn validate(&self) -> Vec<ContentIssue> {
        static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
        let hex = HEX_COLOR.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

        let mut issues = Vec::new();
        if self.template.trim().is_empty() {
            issues.push(ContentIssue::new(
                "theme.template".to_string(),
                "template is required",
            ));
        }
        if !hex.is_match(&self.primary_color) {
            issues.push(ContentIssue::new(
                "theme.primary_color".to_string(),
                "must be a #rrggbb colour",
            ));
        }
        if self.font_family.trim().is_empty() {
            issues.push(ContentIssue::new(
                "theme.font_family".to_string(),
                "font family is required",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sections_round_trip_through_type_tag() {
        let raw = json!([
            {"type": "hero", "title": "Ana & Ben", "subtitle": "June 2026"},
            {"type": "faq", "title": "FAQ", "items": [{"question": "Kids?", "answer": "Yes"}]},
            {"type": "rsvp", "title": "RSVP", "deadline": "2026-05-01"}
        ]);

        let sections: Vec<ContentSection> = serde_json::from_value(raw).unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].kind(), "hero");
        assert!(matches!(
            &sections[2],
            ContentSection::Rsvp { deadline: Some(d), .. } if d.to_string() == "2026-05-01"
        ));
        assert!(validate_sections(&sections).is_empty());
    }

    #[test]
    fn unknown_section_type_is_rejected() {
        let raw = json!([{"type": "countdown", "title": "Soon"}]);
        assert!(serde_json::from_value::<Vec<ContentSection>>(raw).is_err());
    }

    #[test]
    fn validation_reports_indexed_fields() {
        let sections = vec![
            ContentSection::Schedule {
                title: "Schedule".to_string(),
            },
            ContentSection::Gallery {
                title: " ".to_string(),
                image_urls: vec!["ftp://nope".to_string()],
            },
        ];

        let issues = validate_sections(&sections);
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["sections[1].title", "sections[1].image_urls[0]"]);
    }

    #[test]
    fn theme_colour_must_be_hex() {
        let theme = ThemeSettings {
            primary_color: "red".to_string(),
            ..Default::default()
        };
        let issues = theme.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "theme.primary_color");
        assert!(ThemeSettings::default().validate().is_empty());
    }
}
