//! Compile driver: one CDS source file in, cheat code and debug trace out.
//!
//! Includes are expanded here rather than in the parser: each included file
//! is compiled by a fresh parser instance (its own label map) and its nodes
//! splice in after the including file's nodes. A visited-path set plus a
//! depth cap turns cyclic or runaway include chains into errors instead of
//! unbounded recursion.

use crate::catalog::Catalog;
use crate::log::Logger;
use crate::parser::{CompileError, Parser};
use crate::syntax::{render_cheat_code, render_debug_trace, SyntaxNode};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const MAX_INCLUDE_DEPTH: usize = 16;

/// One CDS source text plus the path used to resolve relative includes.
#[derive(Debug, Clone)]
pub struct CdsSource {
    pub path: PathBuf,
    pub text: String,
}

impl CdsSource {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        Ok(Self { path, text })
    }
}

/// Result of one compile invocation. Nodes are in emission order, include
/// contents already spliced in.
#[derive(Debug)]
pub struct Compilation {
    pub nodes: Vec<SyntaxNode>,
    pub errors: Vec<CompileError>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The cheat-code artifact: `XXXXXXXX YYYYYYYY` lines.
    pub fn cheat_code(&self) -> String {
        render_cheat_code(&self.nodes)
    }

    /// The per-node debug trace.
    pub fn debug_trace(&self) -> Vec<String> {
        render_debug_trace(&self.nodes)
    }
}

/// Compile one source, expanding includes.
pub fn compile(catalog: &Catalog, logger: &mut dyn Logger, source: &CdsSource) -> Compilation {
    let mut visited = HashSet::new();
    visited.insert(canonical(&source.path));
    let mut errors = Vec::new();
    let nodes = compile_into(catalog, logger, source, &mut visited, 0, &mut errors);
    Compilation { nodes, errors }
}

fn compile_into(
    catalog: &Catalog,
    logger: &mut dyn Logger,
    source: &CdsSource,
    visited: &mut HashSet<PathBuf>,
    depth: usize,
    errors: &mut Vec<CompileError>,
) -> Vec<SyntaxNode> {
    let base = source
        .path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .to_path_buf();

    let mut nodes = {
        let mut parser = Parser::new(catalog, logger);
        let nodes = parser.parse(&source.text, &base);
        errors.extend(parser.take_errors());
        nodes
    };

    let includes: Vec<(usize, PathBuf)> = nodes
        .iter()
        .filter_map(|node| match node {
            SyntaxNode::Include {
                line_number, path, ..
            } => Some((*line_number, path.clone())),
            _ => None,
        })
        .collect();

    for (line, path) in includes {
        if depth + 1 > MAX_INCLUDE_DEPTH || !visited.insert(canonical(&path)) {
            logger.error(&format!("Include cycle detected at {}", path.display()));
            errors.push(CompileError::IncludeCycle { path });
            continue;
        }
        match CdsSource::from_file(&path) {
            Ok(included) => {
                let spliced = compile_into(catalog, logger, &included, visited, depth + 1, errors);
                nodes.extend(spliced);
            }
            Err(_) => {
                logger.error(&format!("Included file not found: {}", path.display()));
                errors.push(CompileError::IncludeNotFound { line, path });
            }
        }
    }
    nodes
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
