use std::cmp::Ordering;

type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// A chain of comparators, applied in order until one of them decides.
///
/// ```
/// use contigmap::order::OrderedBy;
/// let mut words = vec!["bb", "a", "ab", "c"];
/// OrderedBy::new()
///     .then(|a: &&str, b: &&str| a.len().cmp(&b.len()))
///     .then(|a: &&str, b: &&str| a.cmp(b))
///     .sort(&mut words);
/// assert_eq!(words, vec!["a", "c", "ab", "bb"]);
/// ```
pub struct OrderedBy<'a, T> {
    comparators: Vec<Comparator<'a, T>>,
}

impl<'a, T> OrderedBy<'a, T> {
    pub fn new() -> Self {
        Self {
            comparators: Vec::new(),
        }
    }

    /// Append a comparator, consulted only when all earlier ones report equality.
    pub fn then<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'a,
    {
        self.comparators.push(Box::new(comparator));
        self
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.comparators
            .iter()
            .map(|comparator| comparator(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> Default for OrderedBy<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[test]
    fn test_later_keys_break_ties() {
        let mut pairs = vec![(2, 'b'), (1, 'z'), (2, 'a'), (1, 'y')];
        OrderedBy::new()
            .then(|a: &(i32, char), b: &(i32, char)| b.0.cmp(&a.0))
            .then(|a: &(i32, char), b: &(i32, char)| a.1.cmp(&b.1))
            .sort(&mut pairs);
        assert_eq!(pairs, vec![(2, 'a'), (2, 'b'), (1, 'y'), (1, 'z')]);
    }

    #[test]
    fn test_later_keys_are_lazy() {
        let calls = AtomicUsize::new(0);
        let chain = OrderedBy::new()
            .then(|a: &i32, b: &i32| a.cmp(b))
            .then(|_: &i32, _: &i32| {
                calls.fetch_add(1, AtomicOrdering::Relaxed);
                Ordering::Equal
            });
        assert_eq!(chain.compare(&1, &2), Ordering::Less);
        assert_eq!(calls.load(AtomicOrdering::Relaxed), 0);
        assert_eq!(chain.compare(&2, &2), Ordering::Equal);
        assert_eq!(calls.load(AtomicOrdering::Relaxed), 1);
    }

    #[test]
    fn test_empty_chain_keeps_order() {
        let mut values = vec![3, 1, 2];
        OrderedBy::new().sort(&mut values);
        assert_eq!(values, vec![3, 1, 2]);
    }
}
