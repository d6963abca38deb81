//! Tile URL templates such as `https://{s}.tile.example.org/{z}/{x}/{y}{r}.png`

use super::coord::TileCoord;
use crate::{MapError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    X,
    Y,
    Z,
    /// Subdomain
    S,
    /// `@2x` on high-density displays
    R,
}

/// A parsed URL template; every placeholder is known to be fillable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    /// Parses `template`. Placeholder names may be padded with spaces (`{ z }`);
    /// anything other than `x`, `y`, `z`, `s` and `r` is rejected.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let key = rest[open + 1..open + len].trim();
            if !is_placeholder_key(key) {
                // Not a placeholder, keep the brace as text
                push_literal(&mut segments, &rest[..=open]);
                rest = &rest[open + 1..];
                continue;
            }

            push_literal(&mut segments, &rest[..open]);
            segments.push(match key {
                "x" => Segment::X,
                "y" => Segment::Y,
                "z" => Segment::Z,
                "s" => Segment::S,
                "r" => Segment::R,
                other => {
                    return Err(MapError::Template(format!(
                        "No value provided for variable {{{}}} in '{}'",
                        other, template
                    )))
                }
            });
            rest = &rest[open + len + 1..];
        }
        push_literal(&mut segments, rest);

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn uses_subdomains(&self) -> bool {
        self.segments.contains(&Segment::S)
    }

    /// Fills in `coord`, picking a subdomain with `rng`.
    ///
    /// With no subdomains configured `{s}` expands to nothing.
    pub fn expand_with<R: Rng + ?Sized>(
        &self,
        coord: TileCoord,
        subdomains: &[String],
        retina: bool,
        rng: &mut R,
    ) -> String {
        let mut url = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::X => url.push_str(&coord.x.to_string()),
                Segment::Y => url.push_str(&coord.y.to_string()),
                Segment::Z => url.push_str(&coord.z.to_string()),
                Segment::S => {
                    if let Some(subdomain) = subdomains.choose(rng) {
                        url.push_str(subdomain);
                    }
                }
                Segment::R => {
                    if retina {
                        url.push_str("@2x");
                    }
                }
            }
        }
        url
    }

    pub fn expand(&self, coord: TileCoord, subdomains: &[String], retina: bool) -> String {
        self.expand_with(coord, subdomains, retina, &mut rand::thread_rng())
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Word characters, `-` and spaces, as accepted inside braces
fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ')
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_string()));
    }
}
