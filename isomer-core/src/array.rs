use crate::error::IsomerError;

/// One axis of an [`Array`]: its length and the index of its first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub length: usize,
    pub lower_bound: isize,
}

impl Dimension {
    pub fn new(length: usize, lower_bound: isize) -> Self {
        Dimension {
            length,
            lower_bound,
        }
    }

    pub fn zero_based(length: usize) -> Self {
        Dimension::new(length, 0)
    }

    /// Position of `index` along this axis, if in bounds.
    fn offset(&self, index: isize) -> Option<usize> {
        let offset = usize::try_from(index.checked_sub(self.lower_bound)?).ok()?;
        (offset < self.length).then_some(offset)
    }

    /// One past the last index, if representable.
    fn end(&self) -> Option<isize> {
        self.lower_bound.checked_add_unsigned(self.length)
    }
}

/// Number of elements a shape holds, rejecting shapes that cannot be indexed.
fn element_count(dims: &[Dimension]) -> Result<usize, IsomerError> {
    if dims.is_empty() {
        return Err(IsomerError::Rank);
    }
    dims.iter()
        .try_fold(1usize, |count, dim| {
            dim.end()?;
            count.checked_mul(dim.length)
        })
        .ok_or(IsomerError::Overflow)
}

/// A rectangular array of any rank whose axes may start at any index.
///
/// Elements are stored in row-major order: the last axis varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    dims: Vec<Dimension>,
    items: Vec<T>,
}

impl<T> Array<T> {
    /// Creates an array from its shape and row-major elements.
    pub fn new(dims: Vec<Dimension>, items: Vec<T>) -> Result<Self, IsomerError> {
        let expected = element_count(&dims)?;
        if items.len() != expected {
            return Err(IsomerError::Shape {
                expected,
                actual: items.len(),
            });
        }
        Ok(Array { dims, items })
    }

    /// A rank-1, zero-based array.
    pub fn vector(items: Vec<T>) -> Self {
        Array {
            dims: vec![Dimension::zero_based(items.len())],
            items,
        }
    }

    /// Builds an array by calling `f` with every multi-index in row-major order.
    pub fn try_from_fn<E>(
        dims: Vec<Dimension>,
        mut f: impl FnMut(&[isize]) -> Result<T, E>,
    ) -> Result<Self, E>
    where
        E: From<IsomerError>,
    {
        element_count(&dims)?;
        let indices = Indices::new(&dims);
        let items = indices.map(|index| f(&index)).collect::<Result<Vec<_>, E>>()?;
        Ok(Array::new(dims, items)?)
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    /// Length of axis `dim`, or `None` past the rank.
    pub fn length(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).map(|d| d.length)
    }

    /// First index of axis `dim`, or `None` past the rank.
    pub fn lower_bound(&self, dim: usize) -> Option<isize> {
        self.dims.get(dim).map(|d| d.lower_bound)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: &[isize]) -> Option<&T> {
        self.items.get(self.position(index)?)
    }

    pub fn get_mut(&mut self, index: &[isize]) -> Option<&mut T> {
        let position = self.position(index)?;
        self.items.get_mut(position)
    }

    /// Every valid multi-index, in storage order.
    pub fn indices(&self) -> Indices {
        Indices::new(&self.dims)
    }

    /// Elements in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn position(&self, index: &[isize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        self.dims
            .iter()
            .zip(index)
            .try_fold(0usize, |acc, (dim, &i)| Some(acc * dim.length + dim.offset(i)?))
    }
}

/// Iterator over the multi-indices of an array shape, last axis fastest.
#[derive(Debug, Clone)]
pub struct Indices {
    dims: Vec<Dimension>,
    next: Option<Vec<isize>>,
}

impl Indices {
    fn new(dims: &[Dimension]) -> Self {
        let next = if dims.is_empty() || dims.iter().any(|d| d.length == 0) {
            None
        } else {
            Some(dims.iter().map(|d| d.lower_bound).collect())
        };
        Indices {
            dims: dims.to_vec(),
            next,
        }
    }
}

impl Iterator for Indices {
    type Item = Vec<isize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut following = current.clone();
        for axis in (0..self.dims.len()).rev() {
            following[axis] += 1;
            if Some(following[axis]) < self.dims[axis].end() {
                self.next = Some(following);
                break;
            }
            following[axis] = self.dims[axis].lower_bound;
        }

        Some(current)
    }
}
