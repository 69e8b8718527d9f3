use std::collections::BTreeSet;
use std::env;
use std::path::Path;

use tracing::{debug, warn};

// keep-sorted start
const KNOWN_ARCHITECTURES: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "arm64", "arm64be", "armbe", "loong64", "mips", "mips64",
    "mips64le", "mips64p32", "mips64p32le", "mipsle", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];
const KNOWN_OPERATING_SYSTEMS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];
const UNIX_OPERATING_SYSTEMS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];
// keep-sorted end

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid build constraint '{line}': {reason}")]
pub struct ConstraintError {
    pub line: String,
    pub reason: &'static str,
}

/// The target a package is loaded for. Files whose name suffix or
/// `//go:build` line excludes this target are not part of the package.
/// `cgo` is never satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    goos: String,
    goarch: String,
    tags: BTreeSet<String>,
}

impl BuildContext {
    #[must_use]
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            tags: BTreeSet::new(),
        }
    }

    /// `GOOS`/`GOARCH` from the environment, defaulting to the host.
    #[must_use]
    pub fn host() -> Self {
        let goos = env::var("GOOS")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| host_goos().to_string());
        let goarch = env::var("GOARCH")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| host_goarch().to_string());
        Self::new(goos, goarch)
    }

    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn goos(&self) -> &str {
        &self.goos
    }

    #[must_use]
    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    #[must_use]
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || self.tags.contains(tag) {
            return true;
        }
        match tag {
            "gc" => true,
            "unix" => UNIX_OPERATING_SYSTEMS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "darwin" => self.goos == "ios",
            "solaris" => self.goos == "illumos",
            _ => is_release_tag(tag),
        }
    }

    /// `_GOOS`, `_GOARCH` and `_GOOS_GOARCH` suffixes, before an optional
    /// `_test`. The part before the first underscore never counts, so
    /// `linux.go` is unconstrained.
    #[must_use]
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.split_once('.').map_or(file_name, |(stem, _)| stem);
        let Some((_, suffixes)) = stem.split_once('_') else {
            return true;
        };
        let mut parts: Vec<&str> = suffixes.split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }
        let known_os = |part: &str| KNOWN_OPERATING_SYSTEMS.contains(&part);
        let known_arch = |part: &str| KNOWN_ARCHITECTURES.contains(&part);
        match parts.as_slice() {
            [.., os, arch] if known_os(os) && known_arch(arch) => {
                self.matches_tag(os) && self.matches_tag(arch)
            }
            [.., last] if known_os(last) || known_arch(last) => self.matches_tag(last),
            _ => true,
        }
    }

    /// Evaluates the constraint lines in the header of `source`. A
    /// `//go:build` line takes precedence over `// +build` lines, which
    /// only count when a blank line separates them from the package clause.
    pub fn matches_header(&self, source: &str) -> Result<bool, ConstraintError> {
        let header = ConstraintHeader::scan(source);
        if let Some(expression) = header.go_build {
            return evaluate_expression(expression, |tag| self.matches_tag(tag));
        }
        Ok(header
            .plus_build
            .iter()
            .all(|line| self.matches_plus_build_line(line)))
    }

    /// Whether the file at `path` belongs to the package under this
    /// context. Malformed constraints exclude the file.
    #[must_use]
    pub fn includes(&self, path: &Path, source: &str) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        if !self.matches_file_name(&file_name) {
            debug!(file = %path.display(), "excluded by file name suffix");
            return false;
        }
        match self.matches_header(source) {
            Ok(true) => true,
            Ok(false) => {
                debug!(file = %path.display(), "excluded by build constraint");
                false
            }
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping file");
                false
            }
        }
    }

    /// Space-separated options are alternatives; comma-separated terms
    /// within an option must all hold.
    fn matches_plus_build_line(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !tag.is_empty() && !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }
}

/// `go1.N`; every release tag is satisfied.
fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|byte| byte.is_ascii_digit()))
}

#[derive(Default)]
struct ConstraintHeader<'a> {
    go_build: Option<&'a str>,
    plus_build: Vec<&'a str>,
}

impl<'a> ConstraintHeader<'a> {
    /// Reads comment and blank lines up to the first other line.
    fn scan(source: &'a str) -> Self {
        let mut header = Self::default();
        let mut pending_plus_build = Vec::new();
        let mut in_block_comment = false;
        for line in source.lines() {
            let trimmed = line.trim();
            if in_block_comment {
                in_block_comment = !trimmed.contains("*/");
                continue;
            }
            if trimmed.is_empty() {
                header.plus_build.append(&mut pending_plus_build);
                continue;
            }
            if trimmed.starts_with("/*") {
                in_block_comment = !trimmed[2..].contains("*/");
                continue;
            }
            let Some(comment) = trimmed.strip_prefix("//") else {
                break;
            };
            if let Some(expression) = directive_argument(comment, "go:build") {
                if header.go_build.is_none() {
                    header.go_build = Some(expression);
                }
            } else if let Some(options) = directive_argument(comment.trim_start(), "+build") {
                pending_plus_build.push(options);
            }
        }
        header
    }
}

fn directive_argument<'a>(comment: &'a str, directive: &str) -> Option<&'a str> {
    let rest = comment.strip_prefix(directive)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ConstraintToken<'a> {
    Tag(&'a str),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn tokenize(expression: &str) -> Result<Vec<ConstraintToken<'_>>, &'static str> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        match byte {
            b' ' | b'\t' => index += 1,
            b'!' => {
                tokens.push(ConstraintToken::Not);
                index += 1;
            }
            b'(' => {
                tokens.push(ConstraintToken::Open);
                index += 1;
            }
            b')' => {
                tokens.push(ConstraintToken::Close);
                index += 1;
            }
            b'&' if bytes.get(index + 1) == Some(&b'&') => {
                tokens.push(ConstraintToken::And);
                index += 2;
            }
            b'|' if bytes.get(index + 1) == Some(&b'|') => {
                tokens.push(ConstraintToken::Or);
                index += 2;
            }
            _ if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' => {
                let start = index;
                while index < bytes.len()
                    && (bytes[index].is_ascii_alphanumeric()
                        || bytes[index] == b'_'
                        || bytes[index] == b'.')
                {
                    index += 1;
                }
                tokens.push(ConstraintToken::Tag(&expression[start..index]));
            }
            _ => return Err("unexpected character"),
        }
    }
    Ok(tokens)
}

fn evaluate_expression(
    expression: &str,
    matches_tag: impl Fn(&str) -> bool,
) -> Result<bool, ConstraintError> {
    let error = |reason| ConstraintError {
        line: format!("//go:build {expression}"),
        reason,
    };
    let tokens = tokenize(expression).map_err(error)?;
    if tokens.is_empty() {
        return Err(error("empty expression"));
    }
    let mut evaluator = ExpressionEvaluator {
        tokens: &tokens,
        position: 0,
        matches_tag: &matches_tag,
    };
    let value = evaluator.or_expression().map_err(error)?;
    if evaluator.position != tokens.len() {
        return Err(error("unexpected token after expression"));
    }
    Ok(value)
}

/// `||` binds loosest, then `&&`, then `!`.
struct ExpressionEvaluator<'t, 'a> {
    tokens: &'t [ConstraintToken<'a>],
    position: usize,
    matches_tag: &'t dyn Fn(&str) -> bool,
}

impl ExpressionEvaluator<'_, '_> {
    fn or_expression(&mut self) -> Result<bool, &'static str> {
        let mut value = self.and_expression()?;
        while self.eat(&ConstraintToken::Or) {
            // Parsed even when the left side already holds.
            let right = self.and_expression()?;
            value = value || right;
        }
        Ok(value)
    }

    fn and_expression(&mut self) -> Result<bool, &'static str> {
        let mut value = self.unary_expression()?;
        while self.eat(&ConstraintToken::And) {
            let right = self.unary_expression()?;
            value = value && right;
        }
        Ok(value)
    }

    fn unary_expression(&mut self) -> Result<bool, &'static str> {
        if self.eat(&ConstraintToken::Not) {
            return Ok(!self.unary_expression()?);
        }
        if self.eat(&ConstraintToken::Open) {
            let value = self.or_expression()?;
            if !self.eat(&ConstraintToken::Close) {
                return Err("missing ')'");
            }
            return Ok(value);
        }
        match self.tokens.get(self.position) {
            Some(ConstraintToken::Tag(tag)) => {
                self.position += 1;
                Ok((self.matches_tag)(tag))
            }
            _ => Err("expected a build tag"),
        }
    }

    fn eat(&mut self, token: &ConstraintToken<'_>) -> bool {
        if self.tokens.get(self.position) == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }
}

fn host_goos() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
}

fn host_goarch() -> &'static str {
    let little_endian = cfg!(target_endian = "little");
    match env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "mips" if little_endian => "mipsle",
        "mips64" if little_endian => "mips64le",
        "powerpc" => "ppc",
        "powerpc64" if little_endian => "ppc64le",
        "powerpc64" => "ppc64",
        "wasm32" => "wasm",
        arch => arch,
    }
}
