//! Positional conversion of extracted path parameters into handler arguments.
//!
//! Parameters are handed to callable handlers in extraction order: the first argument
//! receives the first placeholder value, the second argument the second, and so on.
//! Surplus values are ignored. An argument of type [`PathParams`] receives every
//! parameter without consuming a position.

use crate::PathParams;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing path parameter at position {position}")]
    Missing { position: usize },

    #[error("invalid path parameter `{value}` at position {position}: {reason}")]
    Invalid { position: usize, value: String, reason: String },
}

/// Walks the extracted parameters in order.
#[derive(Debug)]
pub struct ParamCursor<'p> {
    params: &'p PathParams,
    position: usize,
}

impl<'p> ParamCursor<'p> {
    pub fn new(params: &'p PathParams) -> Self {
        Self { params, position: 0 }
    }

    pub fn params(&self) -> &'p PathParams {
        self.params
    }

    /// Returns the position and value of the next parameter, advancing the cursor.
    pub fn next_value(&mut self) -> (usize, Option<&'p str>) {
        let position = self.position;
        self.position += 1;
        (position, self.params.at(position))
    }
}

/// A single handler argument built from the parameter cursor.
pub trait FromParam: Sized {
    fn from_param(cursor: &mut ParamCursor<'_>) -> Result<Self, ParamError>;
}

/// The whole argument list of a handler.
pub trait FromParams: Sized {
    fn from_params(params: &PathParams) -> Result<Self, ParamError>;
}

impl FromParam for String {
    fn from_param(cursor: &mut ParamCursor<'_>) -> Result<Self, ParamError> {
        match cursor.next_value() {
            (_, Some(value)) => Ok(value.to_owned()),
            (position, None) => Err(ParamError::Missing { position }),
        }
    }
}

impl<T: FromParam> FromParam for Option<T> {
    fn from_param(cursor: &mut ParamCursor<'_>) -> Result<Self, ParamError> {
        match T::from_param(cursor) {
            Ok(value) => Ok(Some(value)),
            Err(ParamError::Missing { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl FromParam for PathParams {
    fn from_param(cursor: &mut ParamCursor<'_>) -> Result<Self, ParamError> {
        Ok(cursor.params().clone())
    }
}

macro_rules! impl_from_param_for_parse {
    ($($ty:ty)*) => {
        $(
        impl FromParam for $ty {
            fn from_param(cursor: &mut ParamCursor<'_>) -> Result<Self, ParamError> {
                match cursor.next_value() {
                    (position, Some(value)) => value.parse::<$ty>().map_err(|e| ParamError::Invalid {
                        position,
                        value: value.to_owned(),
                        reason: e.to_string(),
                    }),
                    (position, None) => Err(ParamError::Missing { position }),
                }
            }
        }
        )*
    };
}

impl_from_param_for_parse! { u8 u16 u32 u64 usize i8 i16 i32 i64 isize bool }

impl FromParams for () {
    fn from_params(_params: &PathParams) -> Result<Self, ParamError> {
        Ok(())
    }
}

macro_rules! impl_from_params_for_tuple {
    ($($param:ident)*) => {
        impl<$($param,)*> FromParams for ($($param,)*)
        where
            $($param: FromParam,)*
        {
            fn from_params(params: &PathParams) -> Result<Self, ParamError> {
                let mut cursor = ParamCursor::new(params);
                Ok(($($param::from_param(&mut cursor)?,)*))
            }
        }
    };
}

impl_from_params_for_tuple! { A }
impl_from_params_for_tuple! { A B }
impl_from_params_for_tuple! { A B C }
impl_from_params_for_tuple! { A B C D }
impl_from_params_for_tuple! { A B C D E }
impl_from_params_for_tuple! { A B C D E F }
impl_from_params_for_tuple! { A B C D E F G }
impl_from_params_for_tuple! { A B C D E F G H }
