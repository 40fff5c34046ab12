//! `define_port_error!` generates the error enums returned by driven ports.
//!
//! Each variant gets a `thiserror` message and a snake-case constructor whose
//! fields accept anything convertible into the declared type, so adapters can
//! write `UserPersistenceError::query(err.to_string())` or
//! `ImageStoreError::io("disk full")`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum StorageError {
            Connection { message: String } => "storage unavailable: {message}",
            Quota { limit: u64 } => "quota of {limit} bytes exceeded",
            Rejected { field: String, limit: u64 } => "{field} exceeds {limit}",
            Closed => "storage closed",
        }
    }

    #[rstest]
    fn string_fields_accept_str() {
        assert_eq!(
            StorageError::connection("refused").to_string(),
            "storage unavailable: refused"
        );
    }

    #[rstest]
    fn other_fields_keep_their_type() {
        assert_eq!(
            StorageError::quota(5_u64 * 1024).to_string(),
            "quota of 5120 bytes exceeded"
        );
    }

    #[rstest]
    fn mixed_and_unit_variants_build() {
        assert_eq!(
            StorageError::rejected("image", 10_u64),
            StorageError::Rejected {
                field: "image".to_owned(),
                limit: 10
            }
        );
        assert_eq!(StorageError::closed().to_string(), "storage closed");
    }
}
