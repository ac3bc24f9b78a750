use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SQL type families understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Bit,
    Bool,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    Binary,
    VarBinary,
    TinyText,
    Text,
    MediumText,
    LongText,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,
    Enum,
    Set,
    Json,
}

impl ColumnKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "tinyint" => Self::TinyInt,
            "smallint" => Self::SmallInt,
            "mediumint" => Self::MediumInt,
            "int" | "integer" => Self::Int,
            "bigint" => Self::BigInt,
            "bit" => Self::Bit,
            "bool" | "boolean" => Self::Bool,
            "float" => Self::Float,
            "double" | "real" => Self::Double,
            "decimal" | "numeric" => Self::Decimal,
            "char" => Self::Char,
            "varchar" => Self::VarChar,
            "binary" => Self::Binary,
            "varbinary" => Self::VarBinary,
            "tinytext" => Self::TinyText,
            "text" => Self::Text,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "tinyblob" => Self::TinyBlob,
            "blob" => Self::Blob,
            "mediumblob" => Self::MediumBlob,
            "longblob" => Self::LongBlob,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "year" => Self::Year,
            "enum" => Self::Enum,
            "set" => Self::Set,
            "json" => Self::Json,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a stored value compares equal to its own literal on the server. JSON
    /// columns are re-serialized and fixed-width binary values are zero-padded, so an
    /// equality anchor on either would match nothing remotely.
    pub fn can_anchor(&self) -> bool {
        !matches!(self, Self::Json | Self::Binary)
    }
}

impl Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Bit => "BIT",
            Self::Bool => "BOOL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::TinyText => "TINYTEXT",
            Self::Text => "TEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::TinyBlob => "TINYBLOB",
            Self::Blob => "BLOB",
            Self::MediumBlob => "MEDIUMBLOB",
            Self::LongBlob => "LONGBLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Year => "YEAR",
            Self::Enum => "ENUM",
            Self::Set => "SET",
            Self::Json => "JSON",
        };
        write!(f, "{name}")
    }
}

/// A column of the target table, parsed from its declared type.
///
/// `width` and `scale` are the `M` and `D` of `TYPE(M,D)`; zero when not declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Position in the table, which is also the index of its shadow container.
    pub ordinal: usize,
    pub kind: ColumnKind,
    pub width: u32,
    pub scale: u32,
    pub unsigned: bool,
    pub primary_key: bool,
    pub default: Option<String>,
    /// Member list of `ENUM`/`SET` columns.
    pub members: Vec<String>,
}

const DEFAULT_DECIMAL_WIDTH: u32 = 10;

impl Column {
    /// Parse a declaration such as `int(11) unsigned`, `decimal(10,2)` or `enum('a','b')`.
    pub fn parse(ordinal: usize, name: &str, ty: &str) -> Result<Self> {
        let unknown = || Error::UnknownColumnType {
            column: name.to_string(),
            ty: ty.to_string(),
        };

        // Lower-casing keeps byte offsets, so `ty` can be sliced with offsets found in `lower`.
        let ty = ty.trim();
        let lower = ty.to_ascii_lowercase();
        let (base, params, flags) = match lower.find('(') {
            Some(open) => {
                let close = lower.rfind(')').filter(|&c| c > open).ok_or_else(unknown)?;
                (
                    lower[..open].trim(),
                    Some(&ty[open + 1..close]),
                    &lower[close + 1..],
                )
            }
            None => {
                let (base, flags) = lower
                    .split_once(char::is_whitespace)
                    .unwrap_or((lower.as_str(), ""));
                (base, None, flags)
            }
        };

        let mut unsigned = false;
        for flag in flags.split_whitespace() {
            match flag {
                "unsigned" | "zerofill" => unsigned = true,
                "signed" => {}
                _ => return Err(unknown()),
            }
        }

        let kind = ColumnKind::from_type_name(base).ok_or_else(unknown)?;

        let mut column = Column {
            name: name.to_string(),
            ordinal,
            kind,
            width: 0,
            scale: 0,
            unsigned,
            primary_key: false,
            default: None,
            members: vec![],
        };

        match (kind, params) {
            (ColumnKind::Enum | ColumnKind::Set, Some(list)) => {
                column.members = parse_members(list).ok_or_else(unknown)?;
                if column.members.is_empty() {
                    return Err(unknown());
                }
            }
            (ColumnKind::Enum | ColumnKind::Set, None) => return Err(unknown()),
            (_, Some(list)) => {
                let mut nums = list.split(',').map(|n| n.trim().parse::<u32>());
                if let Some(m) = nums.next() {
                    column.width = m.map_err(|_| unknown())?;
                }
                if let Some(d) = nums.next() {
                    column.scale = d.map_err(|_| unknown())?;
                }
                if nums.next().is_some() || column.scale > column.width {
                    return Err(unknown());
                }
            }
            (ColumnKind::Decimal, None) => column.width = DEFAULT_DECIMAL_WIDTH,
            (_, None) => {}
        }

        Ok(column)
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` {}", self.name, self.kind)?;
        if !self.members.is_empty() {
            let members = self
                .members
                .iter()
                .map(|m| format!("'{}'", m.replace('\'', "''")))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "({members})")?;
        } else if self.scale > 0 {
            write!(f, "({},{})", self.width, self.scale)?;
        } else if self.width > 0 {
            write!(f, "({})", self.width)?;
        }
        if self.unsigned {
            write!(f, " UNSIGNED")?;
        }
        if self.primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        Ok(())
    }
}

/// Parse a quoted member list: `'a','it''s'`.
fn parse_members(list: &str) -> Option<Vec<String>> {
    let mut members = Vec::new();
    let mut chars = list.trim().chars().peekable();
    loop {
        if chars.next()? != '\'' {
            return None;
        }
        let mut member = String::new();
        loop {
            match chars.next()? {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    member.push('\'');
                }
                '\'' => break,
                c => member.push(c),
            }
        }
        members.push(member);
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => return Some(members),
            Some(',') => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some(_) => return None,
        }
    }
}
