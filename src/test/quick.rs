use quickcheck::{Arbitrary, Gen};

/// The kinds of "things" a quicktest can do to a tree.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<T> {
    /// Insert the value at the root.
    Insert(T),
    /// Delete one node holding the value, if any.
    Delete(T),
}

impl<T> Arbitrary for Op<T>
where
    T: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation.
    fn arbitrary(g: &mut Gen) -> Self {
        match *g.choose(&[0, 1]).unwrap() {
            0 => Op::Insert(T::arbitrary(g)),
            1 => Op::Delete(T::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}
