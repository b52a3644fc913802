// Wed Aug 5 2026 - Alex

use crate::graph::{GraphError, TypeGraph};
use crate::manipulate::{filter_index, Manipulator};
use regex::Regex;

/// Filters root entries by regexes over their source location.
///
/// With include patterns set, only matching sources are kept; otherwise
/// sources matching an exclude pattern are removed. Entries without a
/// source location are always kept.
pub struct SourceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl SourceFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, GraphError> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>, GraphError> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p)
                        .map_err(|e| GraphError::InvalidManipulator(format!("bad pattern '{}': {}", p, e)))
                })
                .collect()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Exclude declarations pulled in from system include directories.
    pub fn exclude_system() -> Self {
        let patterns = system_include_patterns();
        Self {
            include: Vec::new(),
            exclude: patterns
                .iter()
                .map(|p| Regex::new(p).expect("system patterns are valid"))
                .collect(),
        }
    }

    fn keeps(&self, source: Option<&str>) -> bool {
        let Some(source) = source else {
            return true;
        };
        if !self.include.is_empty() {
            return self.include.iter().any(|p| p.is_match(source));
        }
        !self.exclude.iter().any(|p| p.is_match(source))
    }
}

impl Manipulator for SourceFilter {
    fn name(&self) -> &str {
        "source_filter"
    }

    fn apply(&self, graph: &TypeGraph) -> Result<TypeGraph, GraphError> {
        let index = filter_index(graph, |entry| {
            let source = graph
                .resolve(entry.node)
                .ok()
                .and_then(|node| node.source().map(str::to_string));
            self.keeps(source.as_deref())
        });
        let mut out = graph.clone();
        *out.index_mut() = index;
        Ok(out)
    }
}

/// Common Windows and Unix/GCC/Clang system include locations.
pub fn system_include_patterns() -> Vec<&'static str> {
    vec![
        r"builtin",
        r".*\\Program Files\\.*",
        r".*\\Microsoft Visual Studio\\.*",
        r".*\\Windows Kits\\.*",
        r".*\\vcpkg\\installed\\.*?\\include\\.*",
        r".*/Program Files/.*",
        r".*/Microsoft Visual Studio/.*",
        r".*/Windows Kits/.*",
        r".*/vcpkg/installed/.*?/include/.*",
        r"^<builtin>",
        r"^/usr/include/",
        r"^/usr/local/include/",
        r"^/usr/lib/clang/.*/include/",
        r"/clang/include/",
        r"/x86_64-linux-gnu/",
        r"^/opt/",
    ]
}
