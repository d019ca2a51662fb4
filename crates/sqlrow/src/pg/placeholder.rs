enum Piece<'a> {
    Text(&'a str),
    Bind,
}

/// Split `sql` at every bind `?` outside quotes and comments.
///
/// Single-quoted literals (with `''` escapes), double-quoted identifiers,
/// `--` line comments and `/* */` block comments are kept as text.
fn scan(sql: &str, mut visit: impl FnMut(Piece<'_>)) {
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut run_start = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // doubled quote is an escape
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'?' => {
                visit(Piece::Text(&sql[run_start..i]));
                visit(Piece::Bind);
                i += 1;
                run_start = i;
            }
            _ => i += 1,
        }
    }
    if run_start < sql.len() {
        visit(Piece::Text(&sql[run_start..]));
    }
}

/// Rewrite canonical `?` placeholders as `$1, $2, ...`.
pub fn render_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    scan(sql, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Bind => {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        }
    });
    out
}

/// Number of bind `?` outside quotes and comments.
pub fn count_placeholders(sql: &str) -> usize {
    let mut n = 0;
    scan(sql, |piece| {
        if let Piece::Bind = piece {
            n += 1;
        }
    });
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_placeholders_left_to_right() {
        assert_eq!(
            render_placeholders("SELECT * FROM t WHERE a = ? AND b IN (?, ?)"),
            "SELECT * FROM t WHERE a = $1 AND b IN ($2, $3)"
        );
    }

    #[test]
    fn skips_quotes_and_comments() {
        let sql = "SELECT '?', \"odd?\", 'it''s ?' -- why?\n, ? /* maybe? */ , ?";
        assert_eq!(
            render_placeholders(sql),
            "SELECT '?', \"odd?\", 'it''s ?' -- why?\n, $1 /* maybe? */ , $2"
        );
        assert_eq!(count_placeholders(sql), 2);
    }

    #[test]
    fn unterminated_quote_swallows_rest() {
        assert_eq!(render_placeholders("SELECT 'abc ?"), "SELECT 'abc ?");
        assert_eq!(count_placeholders("SELECT 'abc ?"), 0);
    }

    #[test]
    fn casts_survive_rendering() {
        assert_eq!(render_placeholders("SELECT ?::int"), "SELECT $1::int");
    }
}
