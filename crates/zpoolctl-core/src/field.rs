//! The fields a pool is managed through.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use zpoolctl_schema::{Category, PoolProperty};

/// One managed attribute of a pool: a vdev group category or a pool property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Disk,
    Mirror,
    Raidz,
    Log,
    Spare,
    Cache,
    Ashift,
    Autoexpand,
    Failmode,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Disk,
        Field::Mirror,
        Field::Raidz,
        Field::Log,
        Field::Spare,
        Field::Cache,
        Field::Ashift,
        Field::Autoexpand,
        Field::Failmode,
    ];

    pub fn as_str(self) -> &'static str {
        match self.category() {
            Some(c) => c.as_str(),
            None => self.property().map_or("", PoolProperty::as_str),
        }
    }

    pub fn category(self) -> Option<Category> {
        match self {
            Field::Disk => Some(Category::Disk),
            Field::Mirror => Some(Category::Mirror),
            Field::Raidz => Some(Category::Raidz),
            Field::Log => Some(Category::Log),
            Field::Spare => Some(Category::Spare),
            Field::Cache => Some(Category::Cache),
            Field::Ashift | Field::Autoexpand | Field::Failmode => None,
        }
    }

    pub fn property(self) -> Option<PoolProperty> {
        match self {
            Field::Ashift => Some(PoolProperty::Ashift),
            Field::Autoexpand => Some(PoolProperty::Autoexpand),
            Field::Failmode => Some(PoolProperty::Failmode),
            _ => None,
        }
    }

    /// Vdev membership is fixed at creation; only properties can be set.
    pub fn is_mutable(self) -> bool {
        self.property().is_some()
    }
}

impl From<Category> for Field {
    fn from(c: Category) -> Self {
        match c {
            Category::Disk => Field::Disk,
            Category::Mirror => Field::Mirror,
            Category::Raidz => Field::Raidz,
            Category::Log => Field::Log,
            Category::Spare => Field::Spare,
            Category::Cache => Field::Cache,
        }
    }
}

impl From<PoolProperty> for Field {
    fn from(p: PoolProperty) -> Self {
        match p {
            PoolProperty::Ashift => Field::Ashift,
            PoolProperty::Autoexpand => Field::Autoexpand,
            PoolProperty::Failmode => Field::Failmode,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown field '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Value of a [`Field`] as read from, or written to, a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Absent,
    Groups(Vec<String>),
    Scalar(String),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn from_groups(groups: Option<&[String]>) -> Self {
        groups.map_or(FieldValue::Absent, |g| FieldValue::Groups(g.to_vec()))
    }

    pub fn from_scalar(value: Option<&str>) -> Self {
        value.map_or(FieldValue::Absent, |v| FieldValue::Scalar(v.to_owned()))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => f.write_str("absent"),
            FieldValue::Scalar(v) => f.write_str(v),
            FieldValue::Groups(groups) => {
                f.write_str("[")?;
                for (i, g) in groups.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{g}\"")?;
                }
                f.write_str("]")
            }
        }
    }
}
