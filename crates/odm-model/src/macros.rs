/// Declares a closed ODM value set.
///
/// Generates the enum itself (serde-renamed to the wire value), `as_str`,
/// `Display`, an exact-match `FromStr` that fails with [`InvalidValue`], and
/// the [`ValueSet`] impl.
///
/// [`InvalidValue`]: crate::InvalidValue
/// [`ValueSet`]: crate::ValueSet
macro_rules! odm_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant, )+
        }

        impl $name {
            /// Returns the value exactly as it appears on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $value, )+
                }
            }
        }

        impl $crate::ValueSet for $name {
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$( $name::$variant ),+]
            }

            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::InvalidValue;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $( $value => Ok($name::$variant), )+
                    _ => Err($crate::InvalidValue::new($field, s)),
                }
            }
        }
    };
}
