// Entity Models
//
// Rows of the four tables the reports read. Status and entry-type columns are
// parsed into category enums when a row is read. Filters bind the named
// variants, so a misspelled filter label cannot compile; labels written by
// other tools land in `Other` and still list and group.

// Must stay above the `mod` declarations below.
/// Declares a category enum whose canonical form is the literal label stored
/// in the database. Labels outside the named variants are kept in `Other`.
macro_rules! category_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Any other stored label, verbatim.
            Other(String),
        }

        impl $name {
            /// The variants with a fixed label.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $label, )+
                    $name::Other(label) => label,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(label: &str) -> Self {
                match label {
                    $( $label => $name::$variant, )+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value.as_str().map($name::from)
            }
        }
    };
}

pub mod bill;
pub mod client;
pub mod ledger;

pub use bill::{Payable, PayableStatus, Receivable, ReceivableStatus};
pub use client::Client;
pub use ledger::{EntryType, LedgerEntry};
