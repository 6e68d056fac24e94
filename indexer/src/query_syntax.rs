//! Text syntax for boolean queries.
//!
//! `car AND insurance`, `car OR worst`, `car worst` (implicit OR), `NOT car`,
//! `+car -worst`, parenthesised groups, and `&&` / `||` / `!` as operator
//! aliases. Phrases (`"..."`) and wildcard or fuzzy terms parse but are
//! reported as unsupported, so the engine can reject them as a whole.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use quarry_core::{Occur, ParsedQuery, QueryParser, SearchError};

#[derive(Parser)]
#[grammar = "query.pest"]
struct QueryGrammar;

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanSyntax;

impl QueryParser for BooleanSyntax {
    fn parse(&self, text: &str) -> quarry_core::Result<ParsedQuery> {
        let mut pairs = QueryGrammar::parse(Rule::query, text)
            .map_err(|e| SearchError::InvalidQuery(e.to_string()))?;
        let Some(query) = pairs.next() else {
            return Ok(ParsedQuery::Boolean(Vec::new()));
        };
        let root = query.into_inner().find(|p| p.as_rule() == Rule::disjunction);
        Ok(match root {
            Some(disjunction) => parse_disjunction(disjunction),
            None => ParsedQuery::Boolean(Vec::new()),
        })
    }
}

/// A clause with the occurrence it asked for explicitly (`NOT`, `+`, `-`).
/// `None` takes the default of the enclosing operator.
type Clause = (Option<Occur>, ParsedQuery);

fn parse_disjunction(pair: Pair<Rule>) -> ParsedQuery {
    let mut clauses: Vec<Clause> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::conjunction)
        .map(parse_conjunction)
        .collect();
    if let [(None, _)] = clauses.as_slice() {
        return clauses.remove(0).1;
    }
    ParsedQuery::Boolean(clauses.into_iter().map(|(occur, node)| (occur.unwrap_or(Occur::Should), node)).collect())
}

fn parse_conjunction(pair: Pair<Rule>) -> Clause {
    let mut clauses: Vec<Clause> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::clause)
        .map(parse_clause)
        .collect();
    if clauses.len() == 1 {
        return clauses.remove(0);
    }
    let node = ParsedQuery::Boolean(clauses.into_iter().map(|(occur, node)| (occur.unwrap_or(Occur::Must), node)).collect());
    (None, node)
}

fn parse_clause(pair: Pair<Rule>) -> Clause {
    let mut negations = 0;
    let mut required = false;
    let mut node = ParsedQuery::Boolean(Vec::new());
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::not_op => negations += 1,
            Rule::modifier if inner.as_str() == "-" => negations += 1,
            Rule::modifier => required = true,
            Rule::group => {
                node = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::disjunction)
                    .map_or(ParsedQuery::Boolean(Vec::new()), parse_disjunction);
            }
            Rule::phrase => node = ParsedQuery::Unsupported("phrase".into()),
            Rule::term => node = parse_term(inner.as_str()),
            _ => {}
        }
    }
    let occur = if negations % 2 == 1 {
        Some(Occur::MustNot)
    } else if required {
        Some(Occur::Must)
    } else {
        None
    };
    (occur, node)
}

fn parse_term(text: &str) -> ParsedQuery {
    if text.contains(['*', '?']) {
        ParsedQuery::Unsupported("wildcard".into())
    } else if text.contains('~') {
        ParsedQuery::Unsupported("fuzzy".into())
    } else {
        ParsedQuery::Term(text.to_string())
    }
}
