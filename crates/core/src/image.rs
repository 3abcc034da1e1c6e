// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image reference splitting for registry pulls.

use std::fmt;

/// An image name split into the `fromImage` and `tag` pull parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    /// Split `image` at its tag separator.
    ///
    /// The tag is whatever follows the last `:`, unless a `/` appears after
    /// that colon, in which case the colon belongs to a registry port
    /// (`registry:5000/app`) and the tag defaults to `latest`.
    pub fn parse(image: &str) -> Self {
        match image.rfind(':') {
            Some(colon) if !image[colon..].contains('/') => Self {
                repository: image[..colon].to_string(),
                tag: image[colon + 1..].to_string(),
            },
            _ => Self { repository: image.to_string(), tag: "latest".to_string() },
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
