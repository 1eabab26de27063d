//! Front matter parsing.
//!
//! A content file may open with a delimited metadata block:
//!
//! ```text
//! ---                      +++
//! title: Home Page         title = "Home Page"
//! desc: Welcome            desc = "Welcome"
//! template: default        template = "default"
//! ---                      +++
//!
//! # Welcome                # Welcome
//! ```
//!
//! `---` fences hold YAML, `+++` fences hold TOML. A file without an opening
//! fence, or whose opening fence is never closed, has empty metadata and its
//! whole text is the body. A block that parses to something other than a
//! mapping (a list, a bare scalar) is ignored. Only a block that fails to
//! parse at all is an error.

use crate::types::Metadata;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A parsed content file: metadata plus the remaining Markdown body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub metadata: Metadata,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_fence(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// Split `input` into metadata and body.
pub fn parse(input: &str) -> Result<Document, FrontMatterError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut lines = input.split_inclusive('\n');
    let Some(format) = lines.next().and_then(Format::from_fence) else {
        return Ok(Document {
            metadata: Metadata::new(),
            body: input.to_string(),
        });
    };

    let block_start = input.find('\n').map_or(input.len(), |i| i + 1);
    let mut offset = block_start;
    for line in lines {
        if Format::from_fence(line) == Some(format) {
            let block = &input[block_start..offset];
            let body = &input[offset + line.len()..];
            return Ok(Document {
                metadata: parse_block(format, block)?,
                body: body.trim_start_matches(['\r', '\n']).to_string(),
            });
        }
        offset += line.len();
    }

    Ok(Document {
        metadata: Metadata::new(),
        body: input.to_string(),
    })
}

fn parse_block(format: Format, block: &str) -> Result<Metadata, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: serde_json::Value = match format {
        Format::Yaml => serde_yaml::from_str(block)?,
        Format::Toml => toml::from_str(block)?,
    };
    match value {
        serde_json::Value::Object(metadata) => Ok(metadata),
        _ => Ok(Metadata::new()),
    }
}
