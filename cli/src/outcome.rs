//! Mapping from handler results to process exit codes.
//!
//! | handler returns | exit code |
//! |---|---|
//! | `()`, `None` | 0 |
//! | `bool` | 0 if `true`, else 1 |
//! | any integer | that integer |
//! | finite float | truncated to an integer |
//! | `Err(_)`, panic | 1 |
//! | anything else | 1, logged as an unexpected type |

use serde_json::Value;

/// What a handler run produced.
#[derive(Debug)]
pub enum Outcome {
    Success,
    Failure,
    /// Explicit exit code, passed through verbatim.
    Code(i64),
    /// A value with no exit-code meaning; carries a type description.
    Unexpected(String),
    /// The handler failed.
    Error(anyhow::Error),
}

impl Outcome {
    pub fn exit_code(&self) -> i64 {
        match self {
            Self::Success => 0,
            Self::Code(code) => *code,
            Self::Failure | Self::Unexpected(_) | Self::Error(_) => 1,
        }
    }
}

/// Conversion of a handler's return value into an [`Outcome`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Success
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self { Outcome::Success } else { Outcome::Failure }
    }
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl IntoOutcome for $ty {
                fn into_outcome(self) -> Outcome {
                    Outcome::Code(i64::from(self))
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int {
    ($($ty:ty),*) => {
        $(
            impl IntoOutcome for $ty {
                fn into_outcome(self) -> Outcome {
                    match i64::try_from(self) {
                        Ok(code) => Outcome::Code(code),
                        Err(_) => Outcome::Unexpected(format!("{} {self}", stringify!($ty))),
                    }
                }
            }
        )*
    };
}

wide_int!(u64, usize, isize);

impl IntoOutcome for f64 {
    fn into_outcome(self) -> Outcome {
        if self.is_finite() && self.abs() < i64::MAX as f64 {
            Outcome::Code(self.trunc() as i64)
        } else {
            Outcome::Unexpected(format!("f64 {self}"))
        }
    }
}

impl IntoOutcome for f32 {
    fn into_outcome(self) -> Outcome {
        f64::from(self).into_outcome()
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome {
        Outcome::Unexpected(format!("string {self:?}"))
    }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome {
        Outcome::Unexpected(format!("string {self:?}"))
    }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Outcome {
        match self {
            Value::Null => Outcome::Success,
            Value::Bool(b) => b.into_outcome(),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(code), _) => Outcome::Code(code),
                (None, Some(f)) => f.into_outcome(),
                (None, None) => Outcome::Unexpected(format!("number {n}")),
            },
            other => Outcome::Unexpected(format!("JSON value {other}")),
        }
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Outcome {
        match self {
            Some(value) => value.into_outcome(),
            None => Outcome::Success,
        }
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(err) => Outcome::Error(err.into()),
        }
    }
}
