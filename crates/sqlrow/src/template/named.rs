use super::Statement;
use crate::arg::{Arg, ArgList};
use crate::params::NamedArgs;

/// Characters that terminate a `:name`.
pub const NAME_SYMBOLS: &str = "~!@#$%^&*()-+=[]{}|;:'\",.<>/? \r\n\t";

fn is_symbol(c: char) -> bool {
    NAME_SYMBOLS.contains(c)
}

/// Replace every `:name` with `?` and collect the named arguments in order.
///
/// A name missing from `args` binds `NULL`. `::` is copied through, so a
/// cast such as `x::int` is left alone and `:id::int` becomes `?::int`.
pub fn scan_named(sql: &str, args: &NamedArgs) -> Statement {
    let lookup = |name: &str| args.get(name).cloned().unwrap_or_else(Arg::null);

    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut bound = ArgList::new();
    let mut name: Option<String> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let cast = c == ':' && chars.get(i + 1) == Some(&':');

        match name.as_mut() {
            None if cast => {
                out.push_str("::");
                i += 1;
            }
            None if c == ':' => {
                out.push('?');
                name = Some(String::new());
            }
            None => out.push(c),
            Some(current) if cast => {
                bound.push(lookup(current.as_str()));
                name = None;
                out.push_str("::");
                i += 1;
            }
            Some(current) if c == ':' => {
                // `:a:b` binds `a` and starts `b`
                bound.push(lookup(current.as_str()));
                current.clear();
                out.push('?');
            }
            Some(current) if is_symbol(c) => {
                bound.push(lookup(current.as_str()));
                name = None;
                out.push(c);
            }
            Some(current) => current.push(c),
        }
        i += 1;
    }

    if let Some(current) = name {
        bound.push(lookup(current.as_str()));
    }

    Statement {
        sql: out,
        args: bound,
    }
}
