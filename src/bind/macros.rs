/// Implements [`Bindable`](crate::bind::Bindable) and
/// [`IndexKey`](crate::convert::IndexKey) for types that implement
/// [`Scalar`](crate::bind::Scalar).
///
/// ```ignore
/// impl cfgbind::Scalar for Port { ... }
/// cfgbind::scalar!(Port);
/// ```
#[macro_export]
macro_rules! scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::bind::Bindable for $ty {
            fn assign(
                &mut self,
                raw: ::std::option::Option<&str>,
                _cx: &$crate::convert::ConvertContext<'_>,
            ) -> ::std::result::Result<(), $crate::error::BoxError> {
                if let ::std::option::Option::Some(raw) = raw {
                    *self = <$ty as $crate::bind::Scalar>::parse_text(raw)?;
                }
                ::std::result::Result::Ok(())
            }

            fn view(&self) -> $crate::bind::View<'_> {
                $crate::bind::View::Text(<$ty as $crate::bind::Scalar>::render_text(self))
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::convert::IndexKey for $ty {
            fn from_index(
                index: &$crate::key::Index,
                _cx: &$crate::convert::ConvertContext<'_>,
            ) -> ::std::result::Result<Self, $crate::error::BoxError> {
                <$ty as $crate::bind::Scalar>::parse_text(index.text())
            }

            fn render_index(&self) -> ::std::string::String {
                <$ty as $crate::bind::Scalar>::render_text(self).into_owned()
            }
        }
    )+};
}

/// Makes an enum, or a bitflags-style type, bindable by variant name.
///
/// ```ignore
/// config_enum! { Color { Red = ["crimson"], Green, Blue } }
/// config_enum! { flags Perms { READ = ["r"], WRITE = ["w"] } }
/// ```
///
/// Plain enums must be `Copy + PartialEq`. Flags types additionally need
/// inherent `empty()` and `contains()` plus `BitOr`, which is what
/// `bitflags!` generates.
#[macro_export]
macro_rules! config_enum {
    (flags $ty:ident { $($variant:ident $(= [$($alias:literal),* $(,)?])?),* $(,)? }) => {
        impl $crate::convert::ConfigEnum for $ty {
            const VARIANTS: &'static [$crate::convert::Variant<Self>] = &[
                $($crate::convert::Variant {
                    name: stringify!($variant),
                    aliases: &[$($($alias),*)?],
                    value: $ty::$variant,
                },)*
            ];

            const FLAGS: bool = true;

            fn union(self, other: Self) -> Self {
                self | other
            }

            fn contains(self, other: Self) -> bool {
                $ty::contains(&self, other)
            }

            fn empty() -> ::std::option::Option<Self> {
                ::std::option::Option::Some($ty::empty())
            }
        }

        $crate::config_enum!(@scalar $ty);
    };
    (@scalar $ty:ident) => {
        impl $crate::bind::Scalar for $ty {
            fn parse_text(raw: &str) -> ::std::result::Result<Self, $crate::error::BoxError> {
                ::std::result::Result::Ok($crate::convert::parse_enum::<Self>(raw)?)
            }

            fn render_text(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Owned($crate::convert::render_enum(*self))
            }
        }

        $crate::scalar!($ty);
    };
    ($ty:ident { $($variant:ident $(= [$($alias:literal),* $(,)?])?),* $(,)? }) => {
        impl $crate::convert::ConfigEnum for $ty {
            const VARIANTS: &'static [$crate::convert::Variant<Self>] = &[
                $($crate::convert::Variant {
                    name: stringify!($variant),
                    aliases: &[$($($alias),*)?],
                    value: $ty::$variant,
                },)*
            ];
        }

        $crate::config_enum!(@scalar $ty);
    };
}

/// Registers a struct's members for binding and encoding.
///
/// ```ignore
/// configurable! {
///     Person {
///         name,
///         best_friend: { rename("Best friend"), aliases("bff") },
///         password: { ignore_get },
///         created: { converter("unix-time") },
///     }
/// }
/// ```
///
/// `Type: indexer { .. }` also routes indexed keys on the object itself
/// (`person[home].x`) to the type's [`Indexer`](crate::bind::Indexer) impl.
/// A leaf assigned to the struct names a type registered in the
/// [`TypeRegistry`](crate::convert::TypeRegistry).
#[macro_export]
macro_rules! configurable {
    ($ty:ident : indexer { $($body:tt)* }) => {
        $crate::configurable!(@impl $ty [indexer] { $($body)* });
    };
    ($ty:ident { $($body:tt)* }) => {
        $crate::configurable!(@impl $ty [] { $($body)* });
    };
    (@impl $ty:ident [$($marker:ident)?] {
        $($field:ident $(: { $($attr:tt)* })?),* $(,)?
    }) => {
        impl $crate::bind::Configurable for $ty {
            fn type_name(&self) -> &'static str {
                ::std::any::type_name::<Self>()
            }

            fn members(&self) -> &'static [$crate::bind::Member] {
                const MEMBERS: &[$crate::bind::Member] = &[$(
                    $crate::configurable!(
                        @member $crate::bind::Member::new(stringify!($field)); $($($attr)*)?
                    ),
                )*];
                MEMBERS
            }

            fn member_mut(
                &mut self,
                field: &str,
            ) -> ::std::option::Option<&mut dyn $crate::bind::Bindable> {
                $(if field == stringify!($field) {
                    return ::std::option::Option::Some(&mut self.$field);
                })*
                ::std::option::Option::None
            }

            fn member(&self, field: &str) -> ::std::option::Option<&dyn $crate::bind::Bindable> {
                $(if field == stringify!($field) {
                    return ::std::option::Option::Some(&self.$field);
                })*
                ::std::option::Option::None
            }

            $($crate::configurable!(@$marker);)?

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::bind::Bindable for $ty {
            fn assign(
                &mut self,
                raw: ::std::option::Option<&str>,
                cx: &$crate::convert::ConvertContext<'_>,
            ) -> ::std::result::Result<(), $crate::error::BoxError> {
                if let ::std::option::Option::Some(raw) = raw {
                    *self = $crate::convert::instantiate::<Self>(raw, cx)?;
                }
                ::std::result::Result::Ok(())
            }

            fn node(&mut self) -> $crate::bind::Node<'_> {
                $crate::bind::Node::Object(self)
            }

            fn view(&self) -> $crate::bind::View<'_> {
                $crate::bind::View::Object(self)
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
    (@indexer) => {
        fn indexer(&mut self) -> ::std::option::Option<&mut dyn $crate::bind::Indexer> {
            ::std::option::Option::Some(self)
        }

        fn indexer_ref(&self) -> ::std::option::Option<&dyn $crate::bind::Indexer> {
            ::std::option::Option::Some(self)
        }
    };
    (@member $member:expr;) => {
        $member
    };
    (@member $member:expr; aliases($($alias:literal),* $(,)?) $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.with_aliases(&[$($alias),*]); $($($rest)*)?)
    };
    (@member $member:expr; rename($name:literal) $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.renamed($name); $($($rest)*)?)
    };
    (@member $member:expr; converter($name:literal) $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.with_converter($name); $($($rest)*)?)
    };
    (@member $member:expr; ignore $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.ignore(); $($($rest)*)?)
    };
    (@member $member:expr; ignore_get $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.ignore_get(); $($($rest)*)?)
    };
    (@member $member:expr; ignore_set $(, $($rest:tt)*)?) => {
        $crate::configurable!(@member $member.ignore_set(); $($($rest)*)?)
    };
}
