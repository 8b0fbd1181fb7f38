//! Macros to reduce boilerplate in the codebase

/// Macro to generate Display and FromStr implementations for string-valued enums
///
/// The string form is the wire form: it is what appears in query strings and
/// JSON bodies. Parsing is exact apart from ASCII case.
///
/// # Usage
///
/// ```rust,ignore
/// use crate::error::DocketError;
///
/// enum_display_fromstr!(
///     MyEnum,
///     DocketError::InvalidMyEnum,
///     {
///         Variant1 => "variant1",
///         Variant2 => "variant_2",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_variant:path,
        { $($variant:ident => $str:expr),+ $(,)? }
    ) => {
        impl $enum_name {
            /// Wire representation of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($enum_name::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::DocketError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(x if x.eq_ignore_ascii_case($str) => Ok($enum_name::$variant),)+
                    _ => Err($error_variant(s.to_string())),
                }
            }
        }
    };
}
