//! Query trees.
//!
//! Query text is parsed by a [`QueryParser`] into a generic [`ParsedQuery`]
//! with raw leaves. [`QueryNode::from_parsed`] turns that into the tree the
//! index evaluates, running every leaf through the same [`Preprocessor`] the
//! documents went through.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::tokenizer::Preprocessor;

/// How a child clause takes part in its parent operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    /// Clause must match (AND).
    Must,
    /// Clause may match (OR).
    Should,
    /// Clause must not match (NOT).
    MustNot,
}

/// Operator tree produced by an external query-syntax parser. Leaves hold the
/// raw, unprocessed text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedQuery {
    Term(String),
    Boolean(Vec<(Occur, ParsedQuery)>),
    /// A construct the engine has no evaluation for (phrase, wildcard, range...).
    Unsupported(String),
}

/// Turns query text into a [`ParsedQuery`].
pub trait QueryParser {
    fn parse(&self, text: &str) -> Result<ParsedQuery>;
}

/// Children of an operator node grouped by occurrence kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorNode {
    pub must: Vec<QueryNode>,
    pub should: Vec<QueryNode>,
    pub must_not: Vec<QueryNode>,
}

impl OperatorNode {
    pub fn children(&self, occur: Occur) -> &[QueryNode] {
        match occur {
            Occur::Must => &self.must,
            Occur::Should => &self.should,
            Occur::MustNot => &self.must_not,
        }
    }

    pub fn add_child(&mut self, occur: Occur, child: QueryNode) {
        match occur {
            Occur::Must => self.must.push(child),
            Occur::Should => self.should.push(child),
            Occur::MustNot => self.must_not.push(child),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }
}

/// A processed query: a term leaf or an operator with grouped children.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Term(String),
    Operator(OperatorNode),
}

impl QueryNode {
    pub fn term(text: impl Into<String>) -> Self {
        QueryNode::Term(text.into())
    }

    /// Flat SHOULD node over already processed terms, the shape used for
    /// ranked queries.
    pub fn ranked<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut op = OperatorNode::default();
        for t in terms {
            op.add_child(Occur::Should, QueryNode::Term(t.into()));
        }
        QueryNode::Operator(op)
    }

    /// All term leaves, depth first; MUST, then SHOULD, then MUST_NOT groups.
    pub fn terms(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms(&self, out: &mut Vec<String>) {
        match self {
            QueryNode::Term(text) => out.push(text.clone()),
            QueryNode::Operator(op) => {
                for occur in [Occur::Must, Occur::Should, Occur::MustNot] {
                    for child in op.children(occur) {
                        child.collect_terms(out);
                    }
                }
            }
        }
    }

    /// Builds a query tree from parser output, replacing each leaf with its
    /// processed form.
    ///
    /// Leaves the preprocessor discards (stop-words) are dropped, as are
    /// operators left without children. Any unsupported node fails the whole
    /// conversion.
    pub fn from_parsed(parsed: &ParsedQuery, preprocessor: &dyn Preprocessor) -> Result<QueryNode> {
        Ok(Self::convert(parsed, preprocessor)?
            .unwrap_or_else(|| QueryNode::Operator(OperatorNode::default())))
    }

    fn convert(parsed: &ParsedQuery, preprocessor: &dyn Preprocessor) -> Result<Option<QueryNode>> {
        match parsed {
            ParsedQuery::Term(raw) => Ok(preprocessor.process_term(raw).map(QueryNode::Term)),
            ParsedQuery::Boolean(clauses) => {
                let mut op = OperatorNode::default();
                for (occur, clause) in clauses {
                    if let Some(child) = Self::convert(clause, preprocessor)? {
                        op.add_child(*occur, child);
                    }
                }
                Ok(if op.is_empty() { None } else { Some(QueryNode::Operator(op)) })
            }
            ParsedQuery::Unsupported(kind) => Err(SearchError::UnsupportedQuery(kind.clone())),
        }
    }
}
