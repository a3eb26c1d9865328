//! Parameterised SQL rendering of predicate trees
//!
//! Placeholders use the `{name:Type}` form understood by ClickHouse. Values
//! never appear in the SQL text.

use crate::assembler::ExecutorRequest;
use crate::config::QueryConfig;
use keyscope_core::{FilterOperator, ScalarValue};
use keyscope_filters::{like_pattern, Predicate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlParam {
    pub name: String,
    pub value: ScalarValue,
}

/// Boolean SQL expression plus its bound parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlFragment {
    fn always() -> Self {
        Self {
            sql: "1".to_string(),
            params: Vec::new(),
        }
    }
}

/// Render `predicate`, mapping logical fields to columns with `column`
pub fn render_sql<F>(predicate: &Predicate, column: F) -> SqlFragment
where
    F: Fn(&str) -> String,
{
    let mut renderer = Renderer {
        column,
        params: Vec::new(),
    };
    let sql = renderer.render(predicate);
    SqlFragment {
        sql,
        params: renderer.params,
    }
}

/// WHERE clause for an executor request, using each field's executor column
pub fn render_executor_where(request: &ExecutorRequest) -> SqlFragment {
    let domain = request.domain;
    match request.predicate() {
        Some(predicate) => render_sql(&predicate, |field| {
            domain
                .field(field)
                .map(|spec| spec.column.to_string())
                .unwrap_or_else(|| field.to_string())
        }),
        None => SqlFragment::always(),
    }
}

/// WHERE clause for a key resolver predicate, using the configured columns
pub fn render_resolver_where(predicate: Option<&Predicate>, config: &QueryConfig) -> SqlFragment {
    match predicate {
        Some(predicate) => {
            render_sql(predicate, |field| config.resolver_column(field).to_string())
        }
        None => SqlFragment::always(),
    }
}

struct Renderer<F> {
    column: F,
    params: Vec<SqlParam>,
}

impl<F> Renderer<F>
where
    F: Fn(&str) -> String,
{
    fn bind(&mut self, value: ScalarValue) -> String {
        let name = format!("p{}", self.params.len());
        let ty = match value {
            ScalarValue::Integer(_) => "Int64",
            ScalarValue::Text(_) => "String",
        };
        let placeholder = format!("{{{}:{}}}", name, ty);
        self.params.push(SqlParam { name, value });
        placeholder
    }

    fn render(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::InSet { values, .. } if values.is_empty() => "0".to_string(),
            Predicate::InSet { field, values } => {
                let column = (self.column)(field);
                let placeholders: Vec<String> =
                    values.iter().map(|v| self.bind(v.clone())).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            Predicate::Match {
                field,
                operator,
                value,
            } => {
                let column = (self.column)(field);
                match operator {
                    FilterOperator::Is => {
                        let p = self.bind(ScalarValue::text(value.as_str()));
                        format!("{} = {}", column, p)
                    }
                    _ => {
                        let p = self.bind(ScalarValue::Text(like_pattern(*operator, value)));
                        format!("{} LIKE {}", column, p)
                    }
                }
            }
            Predicate::Any { predicates } => self.join(predicates, " OR ", "0"),
            Predicate::All { predicates } => self.join(predicates, " AND ", "1"),
        }
    }

    fn join(&mut self, predicates: &[Predicate], sep: &str, empty: &str) -> String {
        if predicates.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = predicates.iter().map(|p| self.render(p)).collect();
        format!("({})", parts.join(sep))
    }
}
