//! Helper macro for port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor
//! whose fields accept anything convertible into the declared type.

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
    //! Regression coverage for this module.
    use crate::domain::AppointmentId;

    define_port_error! {
        pub enum BookingPortError {
            Unreachable { message: String } => "unreachable: {message}",
            Overlap { appointment_id: AppointmentId } => "overlaps {appointment_id}",
            Retry { message: String, attempts: u32 } => "retry {message} ({attempts})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = BookingPortError::unreachable("pool closed");
        assert_eq!(err.to_string(), "unreachable: pool closed");
    }

    #[test]
    fn constructors_preserve_domain_types() {
        let id = AppointmentId::random();
        let err = BookingPortError::overlap(id);
        assert_eq!(err.to_string(), format!("overlaps {id}"));
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = BookingPortError::retry("insert", 3_u32);
        assert_eq!(err.to_string(), "retry insert (3)");
    }
}
