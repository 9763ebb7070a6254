#[macro_export]
macro_rules! uuid_wrapper {
    ($name:ident) => {
        #[derive(
            Copy, Clone,
            Debug, derive_more::Display,
            PartialEq, Eq, Hash,
            derive_more::Constructor, derive_more::From, derive_more::FromStr,
            serde::Serialize, serde::Deserialize,
            sqlx::Type
        )]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

#[macro_export]
macro_rules! error {
    ($name:ident) => {
        #[derive(Debug, derive_more::Error, derive_more::Display)]
        pub struct $name(#[error(not(source))] String);

        impl $name {
            pub fn message(msg: impl ToString) -> Self {
                Self(msg.to_string())
            }
        }
    };
}

#[macro_export]
macro_rules! pub_use_modules {
    ($($module:ident),*) => {
        $(
            mod $module;
            pub use $module::*;
        )*
    };
}
