//! Ant-style path patterns.
//!
//! Patterns and paths are compared segment by segment (split on `/`, empty
//! segments dropped):
//! - `**` as a whole segment matches zero or more segments
//! - `*` as a whole segment matches exactly one segment
//! - inside a segment, `*` matches any run of characters and `?` one character
//! - everything else is literal
use std::fmt;

use super::PolicyError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    AnyDepth,
    AnyOne,
    Literal(String),
    Glob(Vec<char>),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw {
            "**" => Self::AnyDepth,
            "*" => Self::AnyOne,
            s if s.contains(['*', '?']) => Self::Glob(s.chars().collect()),
            s => Self::Literal(s.to_owned()),
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::AnyDepth | Self::AnyOne => true,
            Self::Literal(lit) => lit == segment,
            Self::Glob(glob) => glob_match(glob, &segment.chars().collect::<Vec<_>>()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        if !raw.starts_with('/') {
            return Err(PolicyError::InvalidPattern {
                pattern: raw.to_owned(),
                reason: "must start with '/'",
            });
        }

        let mut segments: Vec<Segment> = Vec::new();
        for seg in split_path(raw).map(Segment::parse) {
            // `/**/**` is the same as `/**`
            if seg == Segment::AnyDepth && segments.last() == Some(&Segment::AnyDepth) {
                continue;
            }
            segments.push(seg);
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// `/**`
    pub fn any() -> Self {
        Self {
            raw: "/**".to_owned(),
            segments: vec![Segment::AnyDepth],
        }
    }

    /// True when the pattern matches every possible path.
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::AnyDepth])
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &path)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

// Bottom-up over pattern positions: `next[j]` holds whether the pattern
// suffix after the current segment matches `path[j..]`. O(pattern × path).
fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let n = path.len();
    let mut next: Vec<bool> = (0..=n).map(|j| j == n).collect();
    let mut cur = vec![false; n + 1];

    for seg in pattern.iter().rev() {
        match seg {
            Segment::AnyDepth => {
                let mut any_later = false;
                for j in (0..=n).rev() {
                    any_later |= next[j];
                    cur[j] = any_later;
                }
            }
            seg => {
                cur[n] = false;
                for j in 0..n {
                    cur[j] = next[j + 1] && seg.matches(path[j]);
                }
            }
        }
        std::mem::swap(&mut next, &mut cur);
    }

    next[0]
}

// Backtracking match within a single segment.
fn glob_match(pattern: &[char], value: &[char]) -> bool {
    let (mut p, mut v) = (0usize, 0usize);
    let (mut star, mut resume) = (None, 0usize);

    while v < value.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = v;
            p += 1;
            continue;
        }

        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == value[v]) {
            p += 1;
            v += 1;
            continue;
        }

        if let Some(s) = star {
            p = s + 1;
            resume += 1;
            v = resume;
            continue;
        }

        return false;
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}
