//! Browser targets and module resolution conditions.
//!
//! - `BrowserMatrix`: the browserslist query the syntax transform targets
//! - `ExportConditions`: `package.json` export conditions used during resolution

/// A browserslist-style browser matrix.
///
/// Rolldown's transformer takes engine targets rather than browserslist
/// queries, so each known matrix carries its resolved engine list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserMatrix {
    queries: &'static [&'static str],
    engines: &'static [&'static str],
}

impl BrowserMatrix {
    /// "Last two versions" in the market-share sense: `>0.25%`, excluding Opera Mini.
    ///
    /// Recommended in <https://jamie.build/last-2-versions>.
    pub fn last_two_versions() -> Self {
        Self {
            queries: &[">0.25%", "not op_mini all"],
            // Oldest release of each engine the queries select, resolved with
            // `npx browserslist ">0.25%, not op_mini all"` and pinned here.
            // Firefox 78 is the ESR line. Re-resolve when the queries change.
            engines: &["chrome87", "edge88", "firefox78", "safari14", "ios14", "opera73"],
        }
    }

    /// The browserslist queries this matrix was defined by.
    pub fn queries(&self) -> &'static [&'static str] {
        self.queries
    }

    /// Engine targets understood by the transformer.
    pub fn engines(&self) -> &'static [&'static str] {
        self.engines
    }
}

impl std::fmt::Display for BrowserMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.queries.join(", "))
    }
}

/// Export conditions for module resolution
///
/// Allocation only happens when converting to `Vec<String>` via `to_vec()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportConditions {
    /// Browser-field resolution: `["browser", "import", "module", "default"]`
    Browser,
    /// Platform-neutral resolution: `["import", "module", "default"]`
    Neutral,
}

impl ExportConditions {
    /// Conditions for the `browser` plugin option.
    pub fn for_browser(browser: bool) -> Self {
        if browser { Self::Browser } else { Self::Neutral }
    }

    pub fn as_slice(&self) -> &'static [&'static str] {
        match self {
            Self::Browser => &["browser", "import", "module", "default"],
            Self::Neutral => &["import", "module", "default"],
        }
    }

    /// `package.json` fields consulted for a package's entry, in order.
    pub fn main_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Browser => &["browser", "module", "main"],
            Self::Neutral => &["module", "main"],
        }
    }

    /// Convert to a Vec<String> for Rolldown compatibility
    pub fn to_vec(&self) -> Vec<String> {
        self.as_slice().iter().map(|s| (*s).to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.as_slice().contains(&name)
    }
}

/// Node.js built-in module names.
///
/// With built-ins preferred, these resolve to the platform module even when a
/// same-named package exists in `node_modules`.
const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Whether `specifier` names a Node.js built-in (`fs`, `fs/promises`, `node:path`, ...).
pub fn is_node_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&root)
}
