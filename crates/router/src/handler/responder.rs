//! Conversion of handler return values into the response string.
//!
//! The dispatcher only deals in strings: whatever a callable handler returns is coerced
//! into its display form through [`Responder`].

use crate::error::{HandlerError, HandlerResult};
use std::borrow::Cow;

/// A trait for types that can be turned into a response string.
pub trait Responder {
    fn respond(self) -> HandlerResult;
}

/// Both arms must be usable: `Ok` is coerced, `Err` becomes the handler error.
impl<T, E> Responder for Result<T, E>
where
    T: Responder,
    E: Into<HandlerError>,
{
    fn respond(self) -> HandlerResult {
        match self {
            Ok(t) => t.respond(),
            Err(e) => Err(e.into()),
        }
    }
}

/// `None` is an empty response.
impl<T: Responder> Responder for Option<T> {
    fn respond(self) -> HandlerResult {
        match self {
            Some(t) => t.respond(),
            None => Ok(String::new()),
        }
    }
}

impl<T: Responder> Responder for Box<T> {
    fn respond(self) -> HandlerResult {
        (*self).respond()
    }
}

impl Responder for () {
    fn respond(self) -> HandlerResult {
        Ok(String::new())
    }
}

impl Responder for String {
    fn respond(self) -> HandlerResult {
        Ok(self)
    }
}

impl Responder for &'static str {
    fn respond(self) -> HandlerResult {
        Ok(self.to_owned())
    }
}

impl Responder for Cow<'static, str> {
    fn respond(self) -> HandlerResult {
        Ok(self.into_owned())
    }
}

macro_rules! impl_responder_for_display {
    ($($ty:ty)*) => {
        $(
        impl Responder for $ty {
            fn respond(self) -> HandlerResult {
                Ok(self.to_string())
            }
        }
        )*
    };
}

impl_responder_for_display! { u8 u16 u32 u64 usize i8 i16 i32 i64 isize f32 f64 bool char }
