//! `define_port_error!` generates driven-port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything `Into` the declared type.

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
    define_port_error! {
        pub enum ProbePortError {
            Offline => "store offline",
            Rejected { message: String } => "rejected: {message}",
            Throttled { message: String, retry_after: u32 } => "{message} (retry in {retry_after}s)",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(ProbePortError::offline(), ProbePortError::Offline);
        assert_eq!(ProbePortError::offline().to_string(), "store offline");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = ProbePortError::rejected("duplicate key");
        assert_eq!(err.to_string(), "rejected: duplicate key");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = ProbePortError::throttled("busy", 5_u32);
        assert_eq!(err.to_string(), "busy (retry in 5s)");
    }
}
