//! Reads `Catalog::script` output back into a fresh catalog through the
//! registry API. Understands exactly the statement forms the catalog
//! writes.

#![allow(dead_code)]

use anyhow::{Context, bail, ensure};

use helium_catalog::catalog::column::ColumnDef;
use helium_catalog::catalog::constraint::ConstraintType;
use helium_catalog::catalog::kind::ObjectKind;
use helium_catalog::catalog::quote::unquote_identifier;
use helium_catalog::catalog::setting::SettingValue;
use helium_catalog::catalog::trigger::{TriggerEvent, TriggerTiming};
use helium_catalog::types::datatype::DataType;

use super::harness::TestCatalog;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Word(String),
    Str(String),
    Num(i64),
    Punct(char),
}

fn tokenize(sql: &str) -> anyhow::Result<Vec<Token>> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => i += 1,
            '"' | '\'' => {
                let start = i;
                i += 1;
                loop {
                    ensure!(i < chars.len(), "unterminated {c} in {sql}");
                    if chars[i] == c {
                        if chars.get(i + 1) == Some(&c) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
                let raw: String = chars[start..i].iter().collect();
                if c == '"' {
                    let name = unquote_identifier(&raw).with_context(|| format!("bad identifier {raw}"))?;
                    tokens.push(Token::Ident(name));
                } else {
                    tokens.push(Token::Str(raw[1..raw.len() - 1].replace("''", "'")));
                }
            }
            '(' | ')' | ',' | '.' => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
            c if c == '-' || c.is_ascii_digit() => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(text.parse()?));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => bail!("unexpected {other:?} in {sql}"),
        }
    }
    Ok(tokens)
}

struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    fn next(&mut self) -> anyhow::Result<Token> {
        let token = self.tokens.get(self.pos).cloned().context("unexpected end of statement")?;
        self.pos += 1;
        Ok(token)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Word(w)) if w == word) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn words(&mut self, words: &str) -> anyhow::Result<()> {
        for word in words.split(' ') {
            ensure!(self.eat_word(word), "expected {word}, found {:?}", self.peek());
        }
        Ok(())
    }

    fn word(&mut self) -> anyhow::Result<String> {
        match self.next()? {
            Token::Word(w) => Ok(w),
            other => bail!("expected a keyword, found {other:?}"),
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn punct(&mut self, c: char) -> anyhow::Result<()> {
        ensure!(self.eat_punct(c), "expected {c:?}, found {:?}", self.peek());
        Ok(())
    }

    fn ident(&mut self) -> anyhow::Result<String> {
        match self.next()? {
            Token::Ident(name) => Ok(name),
            other => bail!("expected an identifier, found {other:?}"),
        }
    }

    fn num(&mut self) -> anyhow::Result<i64> {
        match self.next()? {
            Token::Num(n) => Ok(n),
            other => bail!("expected a number, found {other:?}"),
        }
    }

    fn text(&mut self) -> anyhow::Result<String> {
        match self.next()? {
            Token::Str(s) => Ok(s),
            other => bail!("expected a string, found {other:?}"),
        }
    }

    /// `"SCHEMA"."NAME"`
    fn qualified(&mut self) -> anyhow::Result<(String, String)> {
        let schema = self.ident()?;
        self.punct('.')?;
        Ok((schema, self.ident()?))
    }

    fn ident_list(&mut self) -> anyhow::Result<Vec<String>> {
        self.punct('(')?;
        let mut names = vec![self.ident()?];
        while self.eat_punct(',') {
            names.push(self.ident()?);
        }
        self.punct(')')?;
        Ok(names)
    }

    fn data_type(&mut self) -> anyhow::Result<DataType> {
        Ok(match self.word()?.as_str() {
            "INT" => DataType::Int32,
            "BIGINT" => DataType::Int64,
            "REAL" => DataType::Float32,
            "DOUBLE" => DataType::Float64,
            "BOOLEAN" => DataType::Boolean,
            "VARCHAR" => {
                let mut max_len = None;
                if self.eat_punct('(') {
                    max_len = Some(u32::try_from(self.num()?)?);
                    self.punct(')')?;
                }
                DataType::Varchar { max_len }
            }
            "DATE" => DataType::Date,
            "TIMESTAMP" => DataType::Timestamp,
            "BLOB" => DataType::Blob,
            other => bail!("unknown type {other}"),
        })
    }
}

/// Runs every statement of `script` against a new catalog.
pub fn replay(script: &[String]) -> anyhow::Result<TestCatalog> {
    let mut db = TestCatalog::new();
    for statement in script {
        apply(&mut db, statement).with_context(|| format!("replaying {statement}"))?;
    }
    Ok(db)
}

fn apply(db: &mut TestCatalog, statement: &str) -> anyhow::Result<()> {
    let mut cur = Cursor {
        tokens: tokenize(statement)?,
        pos: 0,
    };
    let catalog = &mut db.catalog;
    let session = &mut db.session;

    match cur.word()?.as_str() {
        "SET" => {
            let name = cur.word()?;
            let value = match cur.next()? {
                Token::Num(n) => SettingValue::Int(n),
                Token::Str(s) => SettingValue::Text(s),
                other => bail!("bad setting value {other:?}"),
            };
            catalog.set_setting(&name, value)?;
        }
        "COMMENT" => {
            cur.words("ON")?;
            let keyword = cur.word()?;
            let kind = ObjectKind::ALL
                .into_iter()
                .find(|k| k.keyword() == keyword)
                .with_context(|| format!("unknown kind {keyword}"))?;
            let (schema, name) = if kind.is_schema_bound() {
                let (schema, name) = cur.qualified()?;
                (Some(schema), name)
            } else {
                (None, cur.ident()?)
            };
            cur.words("IS")?;
            let text = cur.text()?;
            catalog.set_comment(session, kind, schema.as_deref(), &name, Some(text))?;
        }
        "ALTER" => {
            cur.words("TABLE")?;
            let (schema, table) = cur.qualified()?;
            cur.words("ADD CONSTRAINT")?;
            let (_, name) = cur.qualified()?;
            let constraint = if cur.eat_word("PRIMARY") {
                cur.words("KEY")?;
                ConstraintType::PrimaryKey {
                    columns: cur.ident_list()?,
                }
            } else {
                cur.words("UNIQUE")?;
                ConstraintType::Unique {
                    columns: cur.ident_list()?,
                }
            };
            // the named index is found again as the covering index
            if cur.eat_word("INDEX") {
                cur.qualified()?;
            }
            catalog.add_constraint(session, &schema, &table, &name, constraint)?;
        }
        "CREATE" => match cur.word()?.as_str() {
            "USER" => {
                cur.words("IF NOT EXISTS")?;
                let name = cur.ident()?;
                cur.words("PASSWORD")?;
                cur.text()?;
                let admin = cur.eat_word("ADMIN");
                if !catalog.exists(ObjectKind::User, None, &name) {
                    catalog.create_user(&name, admin)?;
                }
            }
            "ROLE" => {
                cur.words("IF NOT EXISTS")?;
                let name = cur.ident()?;
                if !catalog.exists(ObjectKind::Role, None, &name) {
                    catalog.create_role(&name)?;
                }
            }
            "SCHEMA" => {
                cur.words("IF NOT EXISTS")?;
                let name = cur.ident()?;
                cur.words("AUTHORIZATION")?;
                let owner = cur.ident()?;
                if !catalog.exists(ObjectKind::Schema, None, &name) {
                    catalog.create_schema(&name, &owner)?;
                }
            }
            "CACHED" => {
                cur.words("TABLE")?;
                let (schema, name) = cur.qualified()?;
                cur.punct('(')?;
                let mut columns = Vec::new();
                loop {
                    let mut column = ColumnDef::new(cur.ident()?, cur.data_type()?);
                    if cur.eat_word("GENERATED") {
                        cur.words("BY DEFAULT AS IDENTITY")?;
                        column = column.identity();
                    }
                    if cur.eat_word("NOT") {
                        cur.words("NULL")?;
                        column = column.not_null();
                    }
                    columns.push(column);
                    if !cur.eat_punct(',') {
                        break;
                    }
                }
                cur.punct(')')?;
                catalog.create_table(session, &schema, &name, columns, false)?;
            }
            kind @ ("INDEX" | "UNIQUE") => {
                let unique = kind == "UNIQUE";
                if unique {
                    cur.words("INDEX")?;
                }
                let (schema, name) = cur.qualified()?;
                cur.words("ON")?;
                let (_, table) = cur.qualified()?;
                let columns = cur.ident_list()?;
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                catalog.create_index(session, &schema, &table, &name, &columns, unique)?;
            }
            "SEQUENCE" => {
                let (schema, name) = cur.qualified()?;
                cur.words("START WITH")?;
                let start = cur.num()?;
                cur.words("INCREMENT BY")?;
                let increment = cur.num()?;
                catalog.create_sequence(session, &schema, &name, start, increment)?;
            }
            "FORCE" => {
                cur.words("TRIGGER")?;
                let (schema, name) = cur.qualified()?;
                let timing = match cur.word()?.as_str() {
                    "BEFORE" => TriggerTiming::Before,
                    "AFTER" => TriggerTiming::After,
                    other => bail!("unknown timing {other}"),
                };
                let mut events = Vec::new();
                loop {
                    events.push(match cur.word()?.as_str() {
                        "INSERT" => TriggerEvent::Insert,
                        "UPDATE" => TriggerEvent::Update,
                        "DELETE" => TriggerEvent::Delete,
                        other => bail!("unknown event {other}"),
                    });
                    if !cur.eat_punct(',') {
                        break;
                    }
                }
                cur.words("ON")?;
                let (_, table) = cur.qualified()?;
                cur.words("FOR EACH ROW CALL")?;
                let handler = cur.ident()?;
                catalog.create_trigger(&schema, &table, &name, timing, events, &handler)?;
            }
            other => bail!("unsupported CREATE {other}"),
        },
        other => bail!("unsupported statement {other}"),
    }
    ensure!(cur.peek().is_none(), "trailing tokens in {statement}");
    Ok(())
}
