//! Target variable selection.

use crate::error::{NetCdfError, NetCdfResult};

/// How a data source picks the variable to extract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VariableSelection {
    /// A variable named by the caller.
    Named(String),
    /// The last variable declared in the file that is not a coordinate.
    #[default]
    LastDeclared,
}

impl VariableSelection {
    /// `Named` when `name` is given, otherwise the default strategy.
    pub fn from_option(name: Option<&str>) -> Self {
        match name {
            Some(name) => Self::Named(name.to_string()),
            None => Self::LastDeclared,
        }
    }

    /// Pick a variable from `declared`, listed in declaration order.
    pub fn select<'a, S: AsRef<str>>(
        &self,
        declared: &'a [S],
        coordinates: &[&str],
    ) -> NetCdfResult<&'a str> {
        match self {
            Self::Named(name) => declared
                .iter()
                .map(|s| AsRef::<str>::as_ref(s))
                .find(|candidate| *candidate == name.as_str())
                .ok_or_else(|| NetCdfError::missing(format!("variable '{}'", name))),
            Self::LastDeclared => declared
                .iter()
                .map(|s| AsRef::<str>::as_ref(s))
                .rev()
                .find(|candidate| !coordinates.contains(candidate))
                .ok_or_else(|| NetCdfError::missing("a non-coordinate data variable")),
        }
    }
}
