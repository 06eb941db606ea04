// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::ExecuteError;
use std::path::Path;

/// Leading keywords that mark a statement as DDL.
pub const DDL_KEYWORDS: [&str; 5] = ["CREATE", "ALTER", "DROP", "TRUNCATE", "RENAME"];

/// Commit policy tag of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Schema change; committed immediately after it runs.
    Definition,
    /// Query or data change; never committed by the executor.
    Manipulation,
}

impl StatementKind {
    /// Classify by the first whitespace-delimited token, ignoring case.
    pub fn classify(text: &str) -> Self {
        let first = text.split_whitespace().next().unwrap_or_default();
        if DDL_KEYWORDS
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(first))
        {
            StatementKind::Definition
        } else {
            StatementKind::Manipulation
        }
    }

    pub fn commits_immediately(self) -> bool {
        matches!(self, StatementKind::Definition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    kind: StatementKind,
}

impl Statement {
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let kind = StatementKind::classify(&text);
        Self { text, kind }
    }

    /// The fragment as it appeared between separators.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The fragment with its `;` terminator restored.
    pub fn terminated(&self) -> String {
        format!("{};", self.text)
    }
}

/// Ordered statements of one query file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFile {
    statements: Vec<Statement>,
}

impl QueryFile {
    /// Split on `;`, dropping fragments that are empty or only whitespace.
    pub fn parse(content: &str) -> Self {
        let statements = content
            .split(';')
            .filter(|fragment| !fragment.trim().is_empty())
            .map(Statement::new)
            .collect();
        Self { statements }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ExecuteError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ExecuteError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
