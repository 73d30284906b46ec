use num_traits::{PrimInt, Unsigned};

/// Integer mean of `values`, truncated toward zero.
///
/// Returns `None` if there are no values or the sum overflows.
pub fn mean<T, I>(values: I) -> Option<T>
where
    T: PrimInt + Unsigned,
    I: IntoIterator<Item = T>,
{
    let (sum, count) = values
        .into_iter()
        .try_fold((T::zero(), T::zero()), |(sum, count), value| {
            Some((sum.checked_add(&value)?, count.checked_add(&T::one())?))
        })?;
    sum.checked_div(&count)
}

/// Weighted integer mean of `(value, weight)` pairs, truncated toward zero.
///
/// Returns `None` if the total weight is zero (including no pairs at all)
/// or any intermediate product or sum overflows.
pub fn weighted_mean<T, I>(pairs: I) -> Option<T>
where
    T: PrimInt + Unsigned,
    I: IntoIterator<Item = (T, T)>,
{
    let (sum, total) = pairs
        .into_iter()
        .try_fold((T::zero(), T::zero()), |(sum, total), (value, weight)| {
            let product = value.checked_mul(&weight)?;
            Some((sum.checked_add(&product)?, total.checked_add(&weight)?))
        })?;
    sum.checked_div(&total)
}
