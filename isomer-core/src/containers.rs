use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use indexmap::{IndexMap, IndexSet};

use crate::array::Array;
use crate::cloner::GraphCloner;
use crate::comparer::GraphComparer;
use crate::error::IsomerError;
use crate::isomer::Isomer;
use crate::kind::Kind;

impl<T: Isomer> Isomer for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(None)
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        self.as_ref().map(|inner| cloner.clone_value(inner)).transpose()
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => comparer.equal(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Isomer, E: Isomer> Isomer for Result<T, E> {
    fn kind() -> Kind {
        Kind::Value
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(Ok(T::blank()?))
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        Ok(match self {
            Ok(v) => Ok(cloner.clone_value(v)?),
            Err(e) => Err(cloner.clone_value(e)?),
        })
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        match (self, other) {
            (Ok(a), Ok(b)) => comparer.equal(a, b),
            (Err(a), Err(b)) => comparer.equal(a, b),
            _ => false,
        }
    }
}

impl<T: Isomer> Isomer for Box<T> {
    fn kind() -> Kind {
        Kind::Value
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(Box::new(T::blank()?))
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        Ok(Box::new(cloner.clone_value(&**self)?))
    }

    fn assign_from(&mut self, source: &Self, cloner: &mut GraphCloner) -> Result<(), IsomerError> {
        (**self).assign_from(source, cloner)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal(&**self, &**other)
    }
}

// Sequences

impl<T: Isomer> Isomer for Vec<T> {
    fn kind() -> Kind {
        Kind::Array
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(Vec::new())
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        cloner.clone_elements(self)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_elements(self.iter(), other.iter())
    }
}

impl<T: Isomer> Isomer for VecDeque<T> {
    fn kind() -> Kind {
        Kind::Array
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(VecDeque::new())
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        cloner.clone_elements(self)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_elements(self.iter(), other.iter())
    }
}

impl<T: Isomer> Isomer for Box<[T]> {
    fn kind() -> Kind {
        Kind::Array
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(Vec::new().into_boxed_slice())
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        cloner.clone_elements(self.iter())
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_elements(self.iter(), other.iter())
    }
}

fn into_fixed<T, const N: usize>(items: Vec<T>) -> Result<[T; N], IsomerError> {
    let actual = items.len();
    items
        .try_into()
        .map_err(|_| IsomerError::Shape { expected: N, actual })
}

impl<T: Isomer, const N: usize> Isomer for [T; N] {
    fn kind() -> Kind {
        Kind::Array
    }

    fn blank() -> Result<Self, IsomerError> {
        let items = (0..N).map(|_| T::blank()).collect::<Result<Vec<_>, _>>()?;
        into_fixed(items)
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        into_fixed(cloner.clone_elements(self)?)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_elements(self.iter(), other.iter())
    }
}

impl<T: Isomer> Isomer for Array<T> {
    fn kind() -> Kind {
        Kind::Array
    }

    fn blank() -> Result<Self, IsomerError> {
        Ok(Array::vector(Vec::new()))
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        cloner.clone_array(self)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_arrays(self, other)
    }
}

// Maps and sets. Keys are cloned but matched with their own `Eq`.

macro_rules! impl_map {
    ($map:ident, [$($bound:tt)*] $(, $hasher:ident)?) => {
        impl<K, V $(, $hasher)?> Isomer for $map<K, V $(, $hasher)?>
        where
            K: Isomer + $($bound)*,
            V: Isomer,
            $($hasher: BuildHasher + Default + 'static,)?
        {
            fn kind() -> Kind {
                Kind::Value
            }

            fn blank() -> Result<Self, IsomerError> {
                Ok(Self::default())
            }

            fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                self.iter()
                    .map(|(k, v)| Ok::<_, IsomerError>((cloner.clone_value(k)?, cloner.clone_value(v)?)))
                    .collect()
            }

            fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
                self.len() == other.len()
                    && self
                        .iter()
                        .all(|(k, v)| other.get(k).is_some_and(|w| comparer.equal(v, w)))
            }
        }
    };
}

impl_map!(HashMap, [Eq + Hash], S);
impl_map!(IndexMap, [Eq + Hash], S);
impl_map!(BTreeMap, [Ord]);

macro_rules! impl_set {
    ($set:ident, [$($bound:tt)*] $(, $hasher:ident)?) => {
        impl<T $(, $hasher)?> Isomer for $set<T $(, $hasher)?>
        where
            T: Isomer + $($bound)*,
            $($hasher: BuildHasher + Default + 'static,)?
        {
            fn kind() -> Kind {
                Kind::Value
            }

            fn blank() -> Result<Self, IsomerError> {
                Ok(Self::default())
            }

            fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                cloner.clone_elements(self.iter())
            }

            fn eq_with(&self, other: &Self, _comparer: &mut GraphComparer) -> bool {
                self.len() == other.len() && self.iter().all(|item| other.contains(item))
            }
        }
    };
}

impl_set!(HashSet, [Eq + Hash], S);
impl_set!(IndexSet, [Eq + Hash], S);
impl_set!(BTreeSet, [Ord]);

macro_rules! impl_tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Isomer),+> Isomer for ($($name,)+) {
            fn kind() -> Kind {
                Kind::Value
            }

            fn blank() -> Result<Self, IsomerError> {
                Ok(($($name::blank()?,)+))
            }

            fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                Ok(($(cloner.clone_value(&self.$idx)?,)+))
            }

            fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
                $(comparer.equal(&self.$idx, &other.$idx))&&+
            }
        }
    };
}

impl_tuple!(A 0);
impl_tuple!(A 0, B 1);
impl_tuple!(A 0, B 1, C 2);
impl_tuple!(A 0, B 1, C 2, D 3);
impl_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
