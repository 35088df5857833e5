//! Call-stack capture with module filtering
//!
//! Frames whose module equals an ignored prefix, or lives below it in the
//! `::` path hierarchy, are dropped so the backend shows application frames
//! only. The ignored list is shared and re-read on every capture, so changes
//! made at runtime apply to the next event.

use super::event::{StackFrame, Stacktrace};
use parking_lot::RwLock;
use std::sync::Arc;

/// Module path of this crate, ignored by default
pub const CRATE_MODULE: &str = env!("CARGO_CRATE_NAME");

/// Modules the frame source always removes: the language runtime, the test
/// harness and the unwinder itself
const RUNTIME_MODULES: &[&str] = &["std", "core", "alloc", "backtrace", "test"];

/// Whether `module` is `prefix` or a descendant of it
pub fn module_matches(module: &str, prefix: &str) -> bool {
    match module.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

/// Shared, runtime-mutable list of ignored module prefixes
#[derive(Debug, Clone)]
pub struct IgnoredModules {
    prefixes: Arc<RwLock<Vec<String>>>,
}

impl IgnoredModules {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: Arc::new(RwLock::new(prefixes.into_iter().map(Into::into).collect())),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Replace the whole list
    pub fn set<I, S>(&self, prefixes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.prefixes.write() = prefixes.into_iter().map(Into::into).collect();
    }

    pub fn add(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        let mut prefixes = self.prefixes.write();
        if !prefixes.contains(&prefix) {
            prefixes.push(prefix);
        }
    }

    /// Returns whether the prefix was present
    pub fn remove(&self, prefix: &str) -> bool {
        let mut prefixes = self.prefixes.write();
        let before = prefixes.len();
        prefixes.retain(|p| p != prefix);
        prefixes.len() != before
    }

    pub fn clear(&self) {
        self.prefixes.write().clear();
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.prefixes.read().clone()
    }

    pub fn is_ignored(&self, module: &str) -> bool {
        self.prefixes
            .read()
            .iter()
            .any(|prefix| module_matches(module, prefix))
    }

    /// Frames not under any ignored prefix, order kept
    pub fn filter(&self, frames: Vec<StackFrame>) -> Vec<StackFrame> {
        let prefixes = self.prefixes.read();
        frames
            .into_iter()
            .filter(|frame| !prefixes.iter().any(|p| module_matches(&frame.module, p)))
            .collect()
    }
}

impl Default for IgnoredModules {
    fn default() -> Self {
        Self::new([CRATE_MODULE])
    }
}

/// Supplier of raw frames, outermost caller first
pub trait FrameSource: Send + Sync {
    fn frames(&self) -> Vec<StackFrame>;
}

/// Frames of the current thread, resolved with the `backtrace` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceSource;

impl FrameSource for BacktraceSource {
    fn frames(&self) -> Vec<StackFrame> {
        let backtrace = backtrace::Backtrace::new();
        let mut frames = Vec::new();

        for frame in backtrace.frames() {
            for symbol in frame.symbols() {
                let Some(name) = symbol.name() else {
                    continue;
                };
                let (module, function) = split_symbol(&format!("{:#}", name));
                // Native frames carry no module path
                if module.is_empty() || RUNTIME_MODULES.iter().any(|m| module_matches(&module, m)) {
                    continue;
                }
                frames.push(StackFrame {
                    module,
                    function,
                    filename: symbol.filename().map(|p| p.display().to_string()),
                    lineno: symbol.lineno(),
                });
            }
        }

        // Innermost frames belong to this module's own capture code
        let own = frames
            .iter()
            .take_while(|frame| frame.module == module_path!())
            .count();
        frames.drain(..own);

        // A closure whose only job is calling its enclosing function, such
        // as the test harness wrapper, folds into that function's frame
        frames.dedup_by(|outer, inner| {
            outer.module == inner.module && is_closure_of(&outer.function, &inner.function)
        });

        frames.reverse();
        frames
    }
}

/// Fixed frames, for tests and replay
#[derive(Debug, Clone, Default)]
pub struct StaticFrames(pub Vec<StackFrame>);

impl FrameSource for StaticFrames {
    fn frames(&self) -> Vec<StackFrame> {
        self.0.clone()
    }
}

/// Captures the current stack and filters it by the ignored modules
#[derive(Clone)]
pub struct StackCapture {
    ignored: IgnoredModules,
    source: Arc<dyn FrameSource>,
}

impl StackCapture {
    pub fn new(ignored: IgnoredModules) -> Self {
        Self::with_source(ignored, Arc::new(BacktraceSource))
    }

    pub fn with_source(ignored: IgnoredModules, source: Arc<dyn FrameSource>) -> Self {
        Self { ignored, source }
    }

    pub fn ignored_modules(&self) -> &IgnoredModules {
        &self.ignored
    }

    /// Filtered trace, or `None` when no frame survives
    pub fn capture(&self) -> Option<Stacktrace> {
        Stacktrace::from_frames(self.ignored.filter(self.source.frames()))
    }
}

impl std::fmt::Debug for StackCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackCapture")
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

/// Capture the current stack, dropping frames under `ignored`
pub fn capture(ignored: &IgnoredModules) -> Option<Stacktrace> {
    StackCapture::new(ignored.clone()).capture()
}

/// Split a demangled symbol into its module path and function name
///
/// `<T as Trait>::method` is attributed to the module of `T`, or to the
/// trait's module when `T` is not a path (fn pointers, tuples, slices,
/// primitives). Path segments from the first type-like (capitalized)
/// segment onwards, and trailing closure segments, belong to the function
/// name.
pub fn split_symbol(symbol: &str) -> (String, String) {
    let symbol = strip_hash(symbol);

    let path = match symbol.strip_prefix('<') {
        Some(rest) => qualified_path(rest),
        None => symbol.to_string(),
    };

    let segments: Vec<&str> = path.split("::").collect();
    let fn_start = segments
        .iter()
        .rposition(|s| !s.starts_with('{'))
        .unwrap_or(0);
    let type_start = segments
        .iter()
        .position(|s| s.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(fn_start);
    let split = type_start.min(fn_start);

    (segments[..split].join("::"), segments[split..].join("::"))
}

/// Plain path for `T as Trait>::tail`, the leading `<` already consumed
fn qualified_path(rest: &str) -> String {
    let close = matching_angle(rest).unwrap_or(rest.len());
    let inner = &rest[..close];
    let (self_ty, trait_ty) = match split_top_level(inner, " as ") {
        Some((self_ty, trait_ty)) => (self_ty, Some(trait_ty)),
        None => (inner, None),
    };
    let self_ty = self_ty
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");

    let owner = if is_type_path(self_ty) {
        self_ty
    } else {
        trait_ty.unwrap_or("")
    };
    let owner = owner.split('<').next().unwrap_or(owner);
    if owner.is_empty() {
        return String::new();
    }

    let tail = rest.get(close + 1..).unwrap_or("").trim_start_matches("::");
    if tail.is_empty() {
        owner.to_string()
    } else {
        format!("{}::{}", owner, tail)
    }
}

/// Whether `ty` names a type by module path, generics aside
fn is_type_path(ty: &str) -> bool {
    let base = ty.split('<').next().unwrap_or(ty);
    base.contains("::")
        && base
            .split("::")
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// Whether `closure` is a closure defined directly inside `function`
fn is_closure_of(closure: &str, function: &str) -> bool {
    closure
        .strip_prefix(function)
        .and_then(|rest| rest.strip_prefix("::"))
        .map_or(false, |rest| rest.split("::").all(|s| s.starts_with('{')))
}

fn strip_hash(symbol: &str) -> &str {
    match symbol.rsplit_once("::") {
        Some((head, last))
            if last.len() == 17
                && last.starts_with('h')
                && last[1..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => symbol,
    }
}

/// Index of the `>` closing an already-opened `<`; the `>` of `->` is not
/// a bracket
fn matching_angle(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut prev = '\0';
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        prev = c;
    }
    None
}

/// Split around the first `sep` outside any angle brackets
fn split_top_level<'a>(s: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && s[i..].starts_with(sep) {
            return Some((&s[..i], &s[i + sep.len()..]));
        }
        prev = c;
    }
    None
}
