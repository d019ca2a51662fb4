use sqlrow::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Render,
    Build,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Render(RenderArgs),
    Build(BuildArgs),
}

#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub sql: String,
    pub args: Option<String>,
    /// Also print the SQL with `$n` placeholders.
    pub numbered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Insert,
    Update,
    Delete,
    Merge,
}

#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub kind: BuildKind,
    pub table: String,
    pub row: String,
    pub dialect: Dialect,
    pub columns: Option<String>,
    pub pk: Option<String>,
    pub unique: Vec<String>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "render" => parse_render(it.map(|s| s.as_str())),
        "build" => parse_build(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Value of `--name <v>` or `--name=<v>`, if `token` is that option.
fn option_value<'a>(
    token: &'a str,
    name: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == name {
        let Some(v) = it.next() else {
            anyhow::bail!("{name} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut sql: Option<String> = None;
    let mut args: Option<String> = None;
    let mut numbered = false;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Render));
        }
        if let Some(v) = option_value(token, "--sql", &mut it)? {
            sql = Some(v.to_string());
        } else if let Some(v) = option_value(token, "--args", &mut it)? {
            args = Some(v.to_string());
        } else if token == "--numbered" {
            numbered = true;
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(sql) = sql else {
        anyhow::bail!("missing --sql");
    };
    Ok(Command::Render(RenderArgs {
        sql,
        args,
        numbered,
    }))
}

fn parse_build<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut kind: Option<BuildKind> = None;
    let mut table: Option<String> = None;
    let mut row: Option<String> = None;
    let mut dialect = Dialect::default();
    let mut columns: Option<String> = None;
    let mut pk: Option<String> = None;
    let mut unique: Vec<String> = Vec::new();

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Build));
        }
        if kind.is_none() && !token.starts_with('-') {
            kind = Some(match token {
                "insert" => BuildKind::Insert,
                "update" => BuildKind::Update,
                "delete" => BuildKind::Delete,
                "merge" => BuildKind::Merge,
                other => anyhow::bail!("unknown statement kind: {other}"),
            });
        } else if let Some(v) = option_value(token, "--table", &mut it)? {
            table = Some(v.to_string());
        } else if let Some(v) = option_value(token, "--row", &mut it)? {
            row = Some(v.to_string());
        } else if let Some(v) = option_value(token, "--dialect", &mut it)? {
            dialect = Dialect::parse(v)
                .ok_or_else(|| anyhow::anyhow!("unknown dialect: {v} (expected oracle|postgres)"))?;
        } else if let Some(v) = option_value(token, "--columns", &mut it)? {
            columns = Some(v.to_string());
        } else if let Some(v) = option_value(token, "--pk", &mut it)? {
            pk = Some(v.to_string());
        } else if let Some(v) = option_value(token, "--unique", &mut it)? {
            unique = split_csv(v);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(kind) = kind else {
        anyhow::bail!("missing statement kind: expected insert|update|delete|merge");
    };
    let Some(table) = table else {
        anyhow::bail!("missing --table");
    };
    let Some(row) = row else {
        anyhow::bail!("missing --row");
    };
    if kind == BuildKind::Merge && unique.is_empty() {
        anyhow::bail!("merge requires --unique");
    }

    Ok(Command::Build(BuildArgs {
        kind,
        table,
        row,
        dialect,
        columns,
        pk,
        unique,
    }))
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlrow - render SQL templates and build row statements

USAGE:
  sqlrow <COMMAND> [OPTIONS]

COMMANDS:
  render        Normalize a template into canonical SQL and arguments
  build         Build an insert/update/delete/merge statement for one row

Run `sqlrow <command> --help` for more."
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  sqlrow render --sql <SQL> [OPTIONS]

OPTIONS:
  --sql <SQL>           Template with ?, :name or {{expr}} markers
  --args <JSON>         Array (positional) or object (named / expression scope)
  --numbered            Also print the SQL with $1, $2, ... placeholders
  -h, --help            Print help"
            );
        }
        HelpTopic::Build => {
            println!(
                "\
USAGE:
  sqlrow build <insert|update|delete|merge> --table <T> --row <JSON> [OPTIONS]

OPTIONS:
  --dialect <NAME>      oracle | postgres (default: postgres)
  --columns <CSV>       Columns to write, optionally typed: a,b:INT,c:DATE
  --pk <COLUMN>         Primary key column (default: id); with merge, kept out of the update
  --unique <CSV>        Match columns for merge
  -h, --help            Print help"
            );
        }
    }
}
