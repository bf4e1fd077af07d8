//! The immutable allowlist: types copied and compared as plain values.

use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::cloner::GraphCloner;
use crate::comparer::GraphComparer;
use crate::error::IsomerError;
use crate::isomer::Isomer;
use crate::kind::Kind;

macro_rules! impl_immutable {
    ($($ty:ty => $blank:expr),* $(,)?) => {
        $(
            impl Isomer for $ty {
                fn kind() -> Kind {
                    Kind::Immutable
                }

                fn blank() -> Result<Self, IsomerError> {
                    Ok($blank)
                }

                fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                    Ok(cloner.share(self))
                }

                fn eq_with(&self, other: &Self, _comparer: &mut GraphComparer) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_immutable! {
    bool => false,
    char => '\0',
    u8 => 0,
    u16 => 0,
    u32 => 0,
    u64 => 0,
    u128 => 0,
    usize => 0,
    i8 => 0,
    i16 => 0,
    i32 => 0,
    i64 => 0,
    i128 => 0,
    isize => 0,
    () => (),
    String => String::new(),
    &'static str => "",
    Box<str> => Box::from(""),
    Rc<str> => Rc::from(""),
    Arc<str> => Arc::from(""),
    Cow<'static, str> => Cow::Borrowed(""),
    Duration => Duration::ZERO,
    SystemTime => SystemTime::UNIX_EPOCH,
}

// NaN is equal to NaN here, or a graph holding one would not equal its own copy.
macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Isomer for $ty {
                fn kind() -> Kind {
                    Kind::Immutable
                }

                fn blank() -> Result<Self, IsomerError> {
                    Ok(0.0)
                }

                fn clone_with(&self, _cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                    Ok(*self)
                }

                fn eq_with(&self, other: &Self, _comparer: &mut GraphComparer) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }
            }
        )*
    };
}

impl_float!(f32, f64);

#[cfg(feature = "uuid")]
impl_immutable! {
    uuid::Uuid => uuid::Uuid::nil(),
}

#[cfg(feature = "chrono")]
impl_immutable! {
    chrono::DateTime<chrono::Utc> => Default::default(),
    chrono::DateTime<chrono::FixedOffset> => Default::default(),
    chrono::NaiveDate => Default::default(),
    chrono::NaiveTime => Default::default(),
    chrono::NaiveDateTime => Default::default(),
    chrono::TimeDelta => chrono::TimeDelta::zero(),
}

// A URL has no empty value, so it cannot be allocated blank.
#[cfg(feature = "url")]
impl Isomer for url::Url {
    fn kind() -> Kind {
        Kind::Immutable
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        Ok(cloner.share(self))
    }

    fn eq_with(&self, other: &Self, _comparer: &mut GraphComparer) -> bool {
        self == other
    }
}
