use super::Statement;
use crate::arg::{Arg, ArgList};
use crate::error::{DbError, DbResult};

#[derive(Clone, Copy)]
enum State {
    Sql,
    Expr { start: usize },
}

/// Replace every `{expr}` with `?`, evaluating `expr` in order of appearance.
///
/// At the top level `{{` and `}}` produce a literal brace; inside an
/// expression they append a literal brace to the expression text. An
/// evaluator error is returned unchanged.
///
/// # Errors
///
/// [`DbError::MalformedTemplate`] for an unterminated expression, a lone `}`
/// outside an expression, or a lone `{` inside one. Offsets count characters.
pub fn scan_expressions<F>(sql: &str, mut eval: F) -> DbResult<Statement>
where
    F: FnMut(&str) -> DbResult<Arg>,
{
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut args = ArgList::new();
    let mut expr = String::new();
    let mut state = State::Sql;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            State::Sql => match (c, next) {
                ('{', Some('{')) | ('}', Some('}')) => {
                    out.push(c);
                    i += 2;
                    continue;
                }
                ('{', _) => {
                    out.push('?');
                    expr.clear();
                    state = State::Expr { start: i };
                }
                ('}', _) => {
                    return Err(DbError::malformed(i, "lone '}' outside an expression, write '}}'"));
                }
                _ => out.push(c),
            },
            State::Expr { .. } => match (c, next) {
                ('{', Some('{')) | ('}', Some('}')) => {
                    expr.push(c);
                    i += 2;
                    continue;
                }
                ('}', _) => {
                    args.push(eval(&expr)?);
                    state = State::Sql;
                }
                ('{', _) => {
                    return Err(DbError::malformed(i, "nested '{' inside an expression, write '{{'"));
                }
                _ => expr.push(c),
            },
        }
        i += 1;
    }

    if let State::Expr { start } = state {
        return Err(DbError::malformed(start, format!("unterminated expression '{expr}'")));
    }

    Ok(Statement { sql: out, args })
}
