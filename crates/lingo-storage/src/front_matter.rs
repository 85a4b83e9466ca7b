//! YAML front matter extraction.
//!
//! Only the fields route resolution cares about are surfaced. Values of the
//! wrong type are ignored instead of failing the whole header, so a page with
//! `slug: 42` behaves exactly like a page without a slug.

use serde_yaml::Value;

/// Fields read from a content file header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Explicit URL segment override.
    pub slug: Option<String>,
    /// Page title.
    pub title: Option<String>,
}

impl FrontMatter {
    /// Parse the header of a content file.
    ///
    /// The header is the YAML block between a leading `---` line and the next
    /// `---` (or `...`) line. Content without a header, or with a header that
    /// is not a YAML mapping, yields an empty result.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let Some(yaml) = extract_header(content) else {
            return Self::default();
        };
        if yaml.trim().is_empty() {
            return Self::default();
        }

        let value: Value = match serde_yaml::from_str(yaml) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed front matter");
                return Self::default();
            }
        };

        Self {
            slug: string_field(&value, "slug"),
            title: string_field(&value, "title"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Return the raw YAML between the header fences.
fn extract_header(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(&content[start..offset]);
        }
        offset += line.len();
    }
    None
}
